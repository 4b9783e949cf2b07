//! Package and workspace identity discovery from Cargo manifests.
//!
//! Walks up from the working directory looking at `Cargo.toml` files. This
//! is a read-only lookup independent of the environment overlay; it exists
//! so callers can label logs, caches and diagnostics with the enclosing
//! package without parsing manifests themselves.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Manifest file name looked for in each ancestor directory.
pub const MANIFEST_FILE: &str = "Cargo.toml";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectError {
    #[error("could not determine the working directory: {0}")]
    WorkingDir(std::io::Error),

    #[error("no Cargo.toml found above '{0}'")]
    ManifestNotFound(PathBuf),

    #[error("failed to read manifest '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("manifest '{0}' does not name a package")]
    UnnamedPackage(PathBuf),
}

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Option<Package>,
    workspace: Option<toml::Table>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
}

/// Returns the name of the nearest enclosing package.
///
/// Ancestors of the working directory are searched for a `Cargo.toml` with a
/// `[package]` section; the first one found wins, so a member crate shadows
/// its workspace root. An ancestry containing only virtual workspace
/// manifests yields [`ProjectError::UnnamedPackage`].
pub fn current_package() -> Result<String, ProjectError> {
    let cwd = working_dir()?;
    package_from(&cwd)
}

/// Returns the directory of the nearest enclosing workspace root, i.e. the
/// closest ancestor whose manifest carries a `[workspace]` table.
pub fn workspace_root() -> Result<PathBuf, ProjectError> {
    let cwd = working_dir()?;
    workspace_from(&cwd)
}

fn working_dir() -> Result<PathBuf, ProjectError> {
    std::env::current_dir().map_err(ProjectError::WorkingDir)
}

fn package_from(start: &Path) -> Result<String, ProjectError> {
    let mut virtual_root = None;
    for dir in start.ancestors() {
        let candidate = dir.join(MANIFEST_FILE);
        if !candidate.is_file() {
            continue;
        }
        match read_manifest(&candidate)?.package {
            Some(package) => return Ok(package.name),
            None => {
                virtual_root.get_or_insert(candidate);
            }
        }
    }
    match virtual_root {
        Some(path) => Err(ProjectError::UnnamedPackage(path)),
        None => Err(ProjectError::ManifestNotFound(start.to_path_buf())),
    }
}

fn workspace_from(start: &Path) -> Result<PathBuf, ProjectError> {
    for dir in start.ancestors() {
        let candidate = dir.join(MANIFEST_FILE);
        if !candidate.is_file() {
            continue;
        }
        if read_manifest(&candidate)?.workspace.is_some() {
            return Ok(dir.to_path_buf());
        }
    }
    Err(ProjectError::ManifestNotFound(start.to_path_buf()))
}

fn read_manifest(path: &Path) -> Result<Manifest, ProjectError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ProjectError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ProjectError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    fn write_manifest(dir: &Path, contents: &str) {
        fs::write(dir.join(MANIFEST_FILE), contents).unwrap();
    }

    #[test]
    fn test_finds_package_in_ancestor() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "[package]\nname = \"demo-pkg\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
        );
        let nested = root.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(package_from(&nested).unwrap(), "demo-pkg");
    }

    #[test]
    fn test_nearest_package_shadows_outer() {
        let root = TempDir::new().unwrap();
        write_manifest(root.path(), "[package]\nname = \"outer\"\nversion = \"0.1.0\"\n");
        let inner = root.path().join("inner");
        fs::create_dir_all(&inner).unwrap();
        write_manifest(&inner, "[package]\nname = \"inner\"\nversion = \"0.1.0\"\n");

        assert_eq!(package_from(&inner).unwrap(), "inner");
        assert_eq!(package_from(root.path()).unwrap(), "outer");
    }

    #[test]
    fn test_virtual_workspace_has_no_package_name() {
        let root = TempDir::new().unwrap();
        write_manifest(root.path(), "[workspace]\nmembers = []\n");

        match package_from(root.path()) {
            Err(ProjectError::UnnamedPackage(path)) => {
                assert_eq!(path, root.path().join(MANIFEST_FILE));
            }
            other => panic!("expected UnnamedPackage, got {other:?}"),
        }
    }

    #[test]
    fn test_workspace_root_is_nearest_workspace_table() {
        let root = TempDir::new().unwrap();
        write_manifest(
            root.path(),
            "[workspace]\nmembers = [\"member\"]\n",
        );
        let member = root.path().join("member");
        fs::create_dir_all(&member).unwrap();
        write_manifest(&member, "[package]\nname = \"member\"\nversion = \"0.1.0\"\n");

        assert_eq!(workspace_from(&member).unwrap(), root.path());
    }

    #[test]
    fn test_missing_manifest_everywhere() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            package_from(dir.path()),
            Err(ProjectError::ManifestNotFound(_))
        ));
        assert!(matches!(
            workspace_from(dir.path()),
            Err(ProjectError::ManifestNotFound(_))
        ));
    }

    #[test]
    fn test_parse_error_carries_the_path() {
        let root = TempDir::new().unwrap();
        write_manifest(root.path(), "not == valid toml");

        match package_from(root.path()) {
            Err(ProjectError::ParseError { path, .. }) => {
                assert_eq!(path, root.path().join(MANIFEST_FILE));
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_current_package_is_this_crate() {
        // Cargo runs tests with the package root as the working directory.
        assert_eq!(current_package().unwrap(), env!("CARGO_PKG_NAME"));
    }
}
