//! The process-wide overlay instance and its free-function surface.
//!
//! One [`Overlay`] is created lazily on first use and defines what "the"
//! environment means for the process. Every function here is a one-line
//! delegation to it; callers that want an injectable instance instead
//! construct their own [`Overlay`] and skip this module entirely.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use super::engine::{Overlay, CARGO_BIN, CARGO_HOME};
use super::error::EnvError;

static SHARED: Lazy<Overlay> = Lazy::new(Overlay::new);

/// Returns the process-wide overlay instance.
pub fn shared() -> &'static Overlay {
    &SHARED
}

/// Get a value from the environment, failing with [`EnvError::NotFound`]
/// when it is not set.
pub fn var(key: &str) -> Result<String, EnvError> {
    SHARED.var(key)
}

/// Get a value from the environment, or `default` when it is not set.
///
/// ```
/// let port = env_overlay::var_or("PORT", "3000");
/// println!("listening on {port}");
/// ```
pub fn var_or(key: &str, default: impl Into<String>) -> String {
    SHARED.var_or(key, default)
}

/// Set a value locally. This is not permanent and never touches the OS
/// environment; only code reading through the overlay sees it.
pub fn set(key: impl Into<String>, value: impl Into<String>) {
    SHARED.set(key, value)
}

/// Set a value in the OS environment as well as the overlay. Fails without
/// writing anything when the key or value is not representable.
pub fn export(key: impl Into<String>, value: impl Into<String>) -> Result<(), EnvError> {
    SHARED.export(key, value)
}

/// A detached copy of every key/value currently visible.
pub fn vars() -> HashMap<String, String> {
    SHARED.vars()
}

/// The current view as `KEY=VALUE` strings, order unspecified.
pub fn environ() -> Vec<String> {
    SHARED.environ()
}

/// Run `body` against a private copy of the environment, discarding its
/// writes afterwards. Useful for tests.
///
/// ```
/// env_overlay::temp(|| {
///     env_overlay::set("WORKER_COUNT", "64");
///     assert_eq!(env_overlay::var_or("WORKER_COUNT", "1"), "64");
/// });
/// ```
pub fn temp<R>(body: impl FnOnce() -> R) -> R {
    SHARED.temp(body)
}

/// Reseed the overlay from the OS environment. Useful after an external
/// manager has rewritten it.
pub fn reload() {
    SHARED.reload()
}

/// Merge env files over the OS environment, earliest file first; an empty
/// sequence merges the default `./.env`. See [`Overlay::load`].
pub fn load<I, P>(files: I) -> Result<(), EnvError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    SHARED.load(files)
}

/// Merge the default `./.env` file. See [`Overlay::load_default`].
pub fn load_default() -> Result<(), EnvError> {
    SHARED.load_default()
}

/// The `CARGO_HOME` directory, or the empty string when it is unset and
/// bootstrap could not complete it.
pub fn cargo_home() -> String {
    SHARED.var_or(CARGO_HOME, "")
}

/// The `cargo` executable to invoke, `"cargo"` unless `CARGO_BIN` overrides
/// it.
pub fn cargo_bin() -> String {
    SHARED.var_or(CARGO_BIN, "cargo")
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_set_is_scoped_to_the_overlay() {
        temp(|| {
            assert!(var("_SHARED_FOO").is_err());
            set("_SHARED_FOO", "foo");
            assert_eq!(var_or("_SHARED_FOO", "bar"), "foo");
            assert!(std::env::var("_SHARED_FOO").is_err());
        });
        assert!(var("_SHARED_FOO").is_err());
    }

    #[test]
    #[serial]
    fn test_export_reaches_the_os() {
        temp(|| {
            export("_SHARED_EXPORTED", "BAR").unwrap();
            assert_eq!(std::env::var("_SHARED_EXPORTED").unwrap(), "BAR");
            assert_eq!(var("_SHARED_EXPORTED").unwrap(), "BAR");
        });
        // The OS write outlives the scope; only the overlay entry is rolled
        // back.
        assert_eq!(std::env::var("_SHARED_EXPORTED").unwrap(), "BAR");
        std::env::remove_var("_SHARED_EXPORTED");
    }

    #[test]
    #[serial]
    fn test_vars_and_environ_agree() {
        temp(|| {
            set("_SHARED_PAIR", "9");
            let vars = vars();
            assert_eq!(vars.get("_SHARED_PAIR").map(String::as_str), Some("9"));
            assert!(environ().contains(&"_SHARED_PAIR=9".to_string()));
        });
    }

    #[test]
    #[serial]
    fn test_cargo_bin_defaults_to_cargo() {
        temp(|| {
            set(super::CARGO_BIN, "cross");
            assert_eq!(cargo_bin(), "cross");
        });
        if var(super::CARGO_BIN).is_err() {
            assert_eq!(cargo_bin(), "cargo");
        }
    }

    #[test]
    #[serial]
    fn test_cargo_home_is_completed_or_empty() {
        // Bootstrap either found CARGO_HOME, completed it from the home
        // directory, or had neither available.
        if std::env::var(super::CARGO_HOME).is_ok() || dirs::home_dir().is_some() {
            assert!(!cargo_home().is_empty());
        } else {
            assert_eq!(cargo_home(), "");
        }
    }

    #[test]
    #[serial]
    fn test_shared_returns_the_same_instance() {
        temp(|| {
            set("_SHARED_SAME", "1");
            assert_eq!(shared().var_or("_SHARED_SAME", ""), "1");
        });
    }
}
