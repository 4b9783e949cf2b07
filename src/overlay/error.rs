use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the environment overlay.
///
/// Plain reads with a fallback ([`var_or`](super::Overlay::var_or)),
/// local writes and reloads never fail; only required reads, OS-backed
/// writes and env-file loading produce one of these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnvError {
    #[error("environment variable `{0}` is not set")]
    NotFound(String),

    #[error("cannot access env file '{path}': {source}")]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse env file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("invalid environment variable name `{0}`")]
    InvalidKey(String),

    #[error("invalid value for environment variable `{0}`")]
    InvalidValue(String),
}

impl EnvError {
    /// True when the error means an env file simply does not exist, as
    /// opposed to existing with unreadable or malformed contents. Callers
    /// loading the default file often treat this case as benign.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            EnvError::FileAccess { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
