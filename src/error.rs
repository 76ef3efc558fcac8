//! View-level errors.

use graph_view::{ConfigError, ProjectionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// `render` was called before any model snapshot arrived
    #[error("No model is displayed")]
    NoModel,
}

impl ViewError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(err) => err.code(),
            Self::Projection(err) => err.code(),
            Self::NoModel => "NO_MODEL",
        }
    }

    /// Whether the view can keep going (a later snapshot may fix it)
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
