use thiserror::Error;

/// Rejection of a local color edit. The store is left untouched whenever one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaintError {
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("invalid color '{0}', expected '#rrggbb'")]
    InvalidHexColor(String),
}

/// Failure to load or parse an asset description. Not retried automatically;
/// the session recovers by re-selecting an asset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load asset '{path}': {message}")]
pub struct AssetLoadError {
    pub path: String,
    pub message: String,
}

impl AssetLoadError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
