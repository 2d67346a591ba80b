use thiserror::Error;

use crate::sketch::LineType;

/// Programmer or configuration mistakes. These abort the shape computation
/// for one edge; invalid geometry is reported as `None` instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SketchError {
    #[error("{element} is only supported on rectilinear lines, got a {line} line")]
    UnsupportedLine {
        line: LineType,
        element: &'static str,
    },
    #[error("unknown tip type `{0}` (expected parent, direction or association)")]
    UnknownTipType(String),
    #[error("unknown line type `{0}` (expected linear or rectilinear)")]
    UnknownLineType(String),
    #[error("unknown direction `{0}` (expected north, south, east or west)")]
    UnknownDirection(String),
    #[error("no node with id `{0}` on the diagram")]
    UnknownNode(String),
    #[error("no edge with id `{0}` on the diagram")]
    UnknownEdge(String),
}
