//! Process-wide environment overlay: OS seeding, env-file merging, and
//! scoped temporary substitution.

mod engine;
mod error;
mod map;
mod shared;

pub use engine::{Overlay, OverlayOptions, APP_ENV, CARGO_BIN, CARGO_HOME, DEFAULT_ENV_FILE};
pub use error::EnvError;
pub use map::VarMap;
pub use shared::{
    cargo_bin, cargo_home, environ, export, load, load_default, reload, set, shared, temp, var,
    var_or, vars,
};
