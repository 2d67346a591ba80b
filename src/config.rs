use crate::sketch::LineType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rank direction handed to the layered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDir {
    #[default]
    Tb,
    Bt,
    Lr,
    Rl,
}

impl RankDir {
    pub fn as_str(self) -> &'static str {
        match self {
            RankDir::Tb => "tb",
            RankDir::Bt => "bt",
            RankDir::Lr => "lr",
            RankDir::Rl => "rl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Ul,
    Ur,
    Dl,
    Dr,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Ul => "ul",
            Align::Ur => "ur",
            Align::Dl => "dl",
            Align::Dr => "dr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ranker {
    #[default]
    NetworkSimplex,
    TightTree,
    LongestPath,
}

impl Ranker {
    pub fn as_str(self) -> &'static str {
        match self {
            Ranker::NetworkSimplex => "network-simplex",
            Ranker::TightTree => "tight-tree",
            Ranker::LongestPath => "longest-path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acyclicer {
    Greedy,
}

impl Acyclicer {
    pub fn as_str(self) -> &'static str {
        match self {
            Acyclicer::Greedy => "greedy",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub rankdir: RankDir,
    pub align: Option<Align>,
    pub ranker: Ranker,
    pub acyclicer: Option<Acyclicer>,
    pub nodesep: f32,
    pub edgesep: f32,
    pub ranksep: f32,
    pub marginx: f32,
    pub marginy: f32,
    pub min_len: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rankdir: RankDir::Tb,
            align: None,
            ranker: Ranker::NetworkSimplex,
            acyclicer: None,
            nodesep: 50.0,
            edgesep: 20.0,
            ranksep: 50.0,
            marginx: 20.0,
            marginy: 20.0,
            min_len: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SketchConfig {
    pub anchor_padding: f32,
    pub direction_padding: f32,
    pub tip_width: f32,
    pub tip_length: f32,
    pub label_offset: f32,
    /// Stub length for routes that have to leave a box before turning back.
    pub jog: f32,
    pub line_type: LineType,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            anchor_padding: crate::anchor::ANCHOR_PADDING,
            direction_padding: crate::direction::DIRECTION_PADDING,
            tip_width: 16.0,
            tip_length: 16.0,
            label_offset: 8.0,
            jog: 20.0,
            line_type: LineType::Rectilinear,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub growth_margin: f32,
    pub initial_width: f32,
    pub initial_height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            growth_margin: 40.0,
            initial_width: 800.0,
            initial_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub layout: LayoutConfig,
    pub sketch: SketchConfig,
    pub canvas: CanvasConfig,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let config = parse_relaxed_json(&contents)?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Strict JSON first, then JSON5 (comments, trailing commas, bare keys).
pub(crate) fn parse_relaxed_json<T: DeserializeOwned>(contents: &str) -> anyhow::Result<T> {
    match serde_json::from_str::<T>(contents) {
        Ok(value) => Ok(value),
        Err(json_err) => json5::from_str::<T>(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid JSON document: {json_err} (json5: {json5_err})")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_constants() {
        let config = Config::default();
        assert_eq!(config.sketch.anchor_padding, 40.0);
        assert_eq!(config.sketch.direction_padding, 10.0);
        assert_eq!(config.canvas.growth_margin, 40.0);
        assert_eq!(config.layout.rankdir, RankDir::Tb);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            parse_relaxed_json(r#"{"layout": {"rankdir": "lr", "ranker": "longest-path"}}"#).unwrap();
        assert_eq!(config.layout.rankdir, RankDir::Lr);
        assert_eq!(config.layout.ranker, Ranker::LongestPath);
        assert_eq!(config.layout.nodesep, 50.0);
        assert_eq!(config.sketch.jog, 20.0);
    }

    #[test]
    fn json5_is_accepted() {
        let config: Config = parse_relaxed_json(
            "{\n  // wider gaps\n  sketch: { anchorPadding: 24, lineType: 'linear' },\n}",
        )
        .unwrap();
        assert_eq!(config.sketch.anchor_padding, 24.0);
        assert_eq!(config.sketch.line_type, LineType::Linear);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_relaxed_json::<Config>("rankdir = lr").is_err());
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.canvas.initial_width, 800.0);
    }
}
