pub mod anchor;
pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod direction;
pub mod dump;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod sketch;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use diagram::{AssociationEdge, Diagram};
pub use dump::DiagramDump;
pub use error::SketchError;
pub use geometry::{BoundingBox, Point};
pub use layout::{DataModelLayout, LayoutResult};
pub use model::{DataModel, parse_model};
pub use pipeline::{CanvasSnapshot, build_canvas};
