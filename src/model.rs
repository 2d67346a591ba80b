use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Entity the association points at; may be the owning entity itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Supertype-like links.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub associations: Vec<Association>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            parents: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_association(mut self, id: impl Into<String>, target: impl Into<String>) -> Self {
        self.associations.push(Association {
            id: id.into(),
            name: None,
            target: Some(target.into()),
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Entities of one data model, with the sizes the host measured for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Rendered size per node id. Nodes without an entry have not been
    /// measured yet and are left out of layout.
    #[serde(default)]
    pub sizes: BTreeMap<String, Size>,
}

impl DataModel {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entity(id).is_some()
    }
}

/// Where measured node sizes come from.
pub trait NodeSizes {
    fn size_of(&self, id: &str) -> Option<Size>;
}

impl NodeSizes for BTreeMap<String, Size> {
    fn size_of(&self, id: &str) -> Option<Size> {
        self.get(id)
            .copied()
            .filter(|size| size.width.is_finite() && size.height.is_finite())
    }
}

impl NodeSizes for DataModel {
    fn size_of(&self, id: &str) -> Option<Size> {
        self.sizes.size_of(id)
    }
}

/// Parse a model document (JSON, or JSON5 as a fallback).
pub fn parse_model(input: &str) -> anyhow::Result<DataModel> {
    crate::config::parse_relaxed_json(input)
}
