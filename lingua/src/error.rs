use lingua_core::{ConfigError, MarkupError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinguaError {
    #[error("language '{0}' is not found")]
    LanguageNotFound(String),
    #[error("file '{0}' not found")]
    SourceNotFound(String),
    #[error("failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed markup in '{file}': {source}")]
    Markup {
        file: String,
        #[source]
        source: MarkupError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no load handler registered for '{0}'")]
    NoHandler(String),
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}
