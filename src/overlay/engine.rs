use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fmt, fs};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use super::error::EnvError;
use super::map::VarMap;

/// Well-known key naming the application run mode (`test`, `production`, ...).
pub const APP_ENV: &str = "APP_ENV";

/// Path-configuration variable completed during bootstrap when the OS leaves
/// it unset.
pub const CARGO_HOME: &str = "CARGO_HOME";

/// Variable naming the `cargo` executable to invoke.
pub const CARGO_BIN: &str = "CARGO_BIN";

/// Default env file merged when [`Overlay::load`] is called with no paths.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Construction-time options for an [`Overlay`].
///
/// `test_mode` marks the process as running under a test harness. It is an
/// explicit input supplied by the caller; the overlay never inspects the
/// harness itself. When set, bootstrap injects `APP_ENV=test` unless the OS
/// environment already defines [`APP_ENV`].
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    pub test_mode: bool,
}

/// A process-wide view of the environment that can be overridden locally
/// and swapped out temporarily.
///
/// The overlay seeds itself from a snapshot of the OS environment and serves
/// all reads from that in-memory copy. Writes through [`set`](Self::set)
/// stay local; only [`export`](Self::export) touches the OS. Env files are
/// merged over the snapshot with [`load`](Self::load), earliest file first,
/// and [`temp`](Self::temp) substitutes the whole view for the duration of
/// a closure.
///
/// Most programs use the shared instance through the crate-root functions
/// rather than constructing their own; constructing one directly is useful
/// for tests and for composition roots that want the instance injectable.
pub struct Overlay {
    current: ArcSwap<VarMap>,
    options: OverlayOptions,
}

impl Overlay {
    /// Creates an overlay with default options, merging `./.env` if present
    /// and seeding from the OS environment.
    pub fn new() -> Self {
        Self::with_options(OverlayOptions::default())
    }

    /// Creates an overlay with explicit options.
    pub fn with_options(options: OverlayOptions) -> Self {
        let overlay = Self {
            current: ArcSwap::from_pointee(VarMap::new()),
            options,
        };
        match overlay.load_default() {
            Ok(()) => {}
            Err(err) if err.is_missing_file() => {
                debug!("no {DEFAULT_ENV_FILE} file to merge");
                overlay.reload();
            }
            Err(err) => {
                warn!("skipping default env file: {err}");
                overlay.reload();
            }
        }
        overlay
    }

    /// Returns the value for `key`, failing with [`EnvError::NotFound`] when
    /// the current view does not define it.
    pub fn var(&self, key: &str) -> Result<String, EnvError> {
        self.current
            .load()
            .get(key)
            .ok_or_else(|| EnvError::NotFound(key.to_string()))
    }

    /// Returns the value for `key`, or `default` if the current view does
    /// not define it.
    pub fn var_or(&self, key: &str, default: impl Into<String>) -> String {
        self.current.load().get_or(key, default)
    }

    /// Upserts `key` in the current view only. The OS environment is never
    /// touched; the override is ephemeral and disappears on the next
    /// [`reload`](Self::reload).
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.current.load().store(key, value);
    }

    /// Writes `key` to the OS environment first and then, on success, to
    /// the current view, in that fixed order.
    ///
    /// Keys that are empty or contain `=` or NUL, and values containing NUL,
    /// are rejected before anything is written.
    pub fn export(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EnvError> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(EnvError::InvalidKey(key));
        }
        if value.contains('\0') {
            return Err(EnvError::InvalidValue(key));
        }
        env::set_var(&key, &value);
        self.current.load().store(key, value);
        Ok(())
    }

    /// Returns a detached copy of every entry in the current view.
    pub fn vars(&self) -> HashMap<String, String> {
        self.current.load().to_map()
    }

    /// Returns the current view as `KEY=VALUE` strings, order unspecified.
    pub fn environ(&self) -> Vec<String> {
        let mut entries = Vec::new();
        self.current.load().range(|key, value| {
            entries.push(format!("{key}={value}"));
            true
        });
        entries
    }

    /// Discards the current view and reseeds it from the OS environment.
    ///
    /// Seeding takes a snapshot: OS changes made after this call are not
    /// visible until the next reload. Never fails; an empty OS environment
    /// just yields an empty view.
    pub fn reload(&self) {
        let seeded = self.seed();
        debug!("reseeded environment overlay with {} entries", seeded.len());
        self.current.store(Arc::new(seeded));
    }

    /// Runs `body` against a private copy of the current view, restoring the
    /// previous view when it returns, even by unwinding.
    ///
    /// Writes made inside the closure are discarded on exit; a [`vars`]
    /// snapshot taken before equals one taken after. Scopes nest: each level
    /// restores the view it replaced. Do not call [`load`](Self::load) or
    /// [`reload`](Self::reload) inside `body`: both replace the private copy
    /// with a freshly seeded map, silently ending the scope's isolation
    /// before the restore runs.
    ///
    /// [`vars`]: Self::vars
    pub fn temp<R>(&self, body: impl FnOnce() -> R) -> R {
        let _restore = TempGuard::enter(self);
        body()
    }

    /// Merges env files over the OS environment, earliest file first, then
    /// reseeds the view after each merge.
    ///
    /// With no paths this behaves like [`load_default`](Self::load_default).
    /// Otherwise files are processed strictly in the order given: each is
    /// stat'ed, parsed and merged additively (keys already set in the OS,
    /// whether by an earlier file in this call or beforehand, are
    /// preserved). The first inaccessible or malformed file stops the call
    /// and its error is returned; earlier files stay merged, the failing
    /// file and everything after it are skipped.
    ///
    /// Calling this inside a [`temp`](Self::temp) scope discards the scope's
    /// private copy; see `temp`.
    pub fn load<I, P>(&self, files: I) -> Result<(), EnvError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut files = files.into_iter().peekable();
        if files.peek().is_none() {
            return self.load_default();
        }
        for file in files {
            let path = file.as_ref();
            fs::metadata(path).map_err(|source| EnvError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
            dotenvy::from_path(path).map_err(|err| file_error(path.to_path_buf(), err))?;
            self.reload();
            debug!("merged env file {}", path.display());
        }
        Ok(())
    }

    /// Merges the well-known `./.env` file and reseeds the view on success.
    ///
    /// The parser's failure is returned verbatim; a missing file surfaces as
    /// a file-access error that [`EnvError::is_missing_file`] identifies,
    /// and leaves the view untouched.
    pub fn load_default(&self) -> Result<(), EnvError> {
        dotenvy::from_path(Path::new(DEFAULT_ENV_FILE))
            .map_err(|err| file_error(PathBuf::from(DEFAULT_ENV_FILE), err))?;
        self.reload();
        debug!("merged default env file {DEFAULT_ENV_FILE}");
        Ok(())
    }

    /// Builds a fresh map from a snapshot of the OS environment, applying
    /// the test-mode injection and the best-effort `CARGO_HOME` completion.
    fn seed(&self) -> VarMap {
        let map = VarMap::new();
        for (key, value) in env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => map.store(key, value),
                (Err(raw), _) | (_, Err(raw)) => {
                    warn!("skipping non-unicode environment entry {:?}", raw);
                }
            }
        }
        if self.options.test_mode && map.get(APP_ENV).is_none() {
            map.store(APP_ENV, "test");
        }
        if map.get(CARGO_HOME).is_none() {
            // Lookup failure is swallowed; the variable just stays unset.
            if let Some(home) = dirs::home_dir() {
                let cargo_home = home.join(".cargo");
                env::set_var(CARGO_HOME, &cargo_home);
                map.store(CARGO_HOME, cargo_home.to_string_lossy());
            }
        }
        map
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("entries", &self.current.load().len())
            .field("options", &self.options)
            .finish()
    }
}

/// Swaps a private copy in on entry and restores the saved view on drop,
/// the unwinding path included.
struct TempGuard<'a> {
    overlay: &'a Overlay,
    saved: Arc<VarMap>,
}

impl<'a> TempGuard<'a> {
    fn enter(overlay: &'a Overlay) -> Self {
        let saved = overlay.current.load_full();
        overlay.current.store(Arc::new(VarMap::clone(&saved)));
        Self { overlay, saved }
    }
}

impl Drop for TempGuard<'_> {
    fn drop(&mut self) {
        self.overlay.current.store(Arc::clone(&self.saved));
    }
}

fn file_error(path: PathBuf, err: dotenvy::Error) -> EnvError {
    match err {
        dotenvy::Error::Io(source) => EnvError::FileAccess { path, source },
        other => EnvError::Parse {
            path,
            source: other,
        },
    }
}
