//! A process-wide, overridable view of environment variables.
//!
//! * Read variables with fallback defaults.
//! * Override values locally without touching the OS environment.
//! * Swap the whole environment out for the duration of a closure, which is
//!   handy for deterministic tests.
//! * Merge `.env` files over the process environment, earliest file first,
//!   with OS-set values always winning.
//!
//! The crate-root functions operate on one shared overlay that is seeded
//! from the OS environment (plus `./.env`, if present) on first use:
//!
//! ```
//! let database_url = env_overlay::var_or("DATABASE_URL", "postgres://localhost/dev");
//!
//! env_overlay::temp(|| {
//!     env_overlay::set("DATABASE_URL", "postgres://localhost/test");
//!     assert_eq!(
//!         env_overlay::var_or("DATABASE_URL", ""),
//!         "postgres://localhost/test",
//!     );
//! });
//! ```
//!
//! An [`Overlay`] can also be constructed directly when the shared instance
//! is not wanted, e.g. to inject one from a composition root.

pub mod overlay;
pub mod project;
mod error;

pub use error::Error;
pub use overlay::{
    cargo_bin, cargo_home, environ, export, load, load_default, reload, set, shared, temp, var,
    var_or, vars, EnvError, Overlay, OverlayOptions, VarMap,
};
pub use project::{current_package, workspace_root, ProjectError};
