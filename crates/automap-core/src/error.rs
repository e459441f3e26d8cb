use crate::point::PointIssue;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Layer JSON error ({layer}): {message}")]
    LayerJson { layer: String, message: String },

    #[error("Layer data is not a JSON array ({layer})")]
    LayerNotArray { layer: String },

    #[error("Invalid point #{index} in layer {layer}: {reason}")]
    InvalidPoint {
        layer: String,
        index: usize,
        reason: PointIssue,
    },

    #[error("Invalid page manifest: {message}")]
    Manifest { message: String },
}
