//! Engine error types.

use thiserror::Error;

use crate::memo::MemoError;

/// Failure reported by (or about) a plugin.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PluginError {
    /// The plugin itself failed
    #[error("Plugin failed: {0}")]
    Failed(String),

    /// A decoration provider produced something other than a JSON object
    #[error("Decoration data must be an object, got {0}")]
    NotAnObject(String),

    /// A decoration provider dropped its sender without answering
    #[error("Decoration data was abandoned before it resolved")]
    Abandoned,
}

impl PluginError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "PLUGIN_FAILED",
            Self::NotAnObject(_) => "PLUGIN_NOT_AN_OBJECT",
            Self::Abandoned => "PLUGIN_ABANDONED",
        }
    }
}

/// A projection pass that could not complete.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Memo(#[from] MemoError),

    #[error("Plugin error while projecting {element}: {source}")]
    Plugin {
        element: String,
        #[source]
        source: PluginError,
    },
}

impl ProjectionError {
    pub fn plugin(element: impl Into<String>, source: PluginError) -> Self {
        Self::Plugin {
            element: element.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Memo(err) => err.code(),
            Self::Plugin { source, .. } => source.code(),
        }
    }
}
