use thiserror::Error;

use crate::overlay::EnvError;
use crate::project::ProjectError;

/// Top-level error type for the env-overlay library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("environment error: {0}")]
    Env(#[from] EnvError),

    #[error("project discovery error: {0}")]
    Project(#[from] ProjectError),
}
