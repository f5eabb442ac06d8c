use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ROOT_ENV_VAR: &str = "TIDEWALK_ROOT";

/// Project root plus the directories the game reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub maps_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl AppPaths {
    pub fn under(root: PathBuf) -> Self {
        Self {
            assets_dir: root.join("assets"),
            maps_dir: root.join("maps"),
            config_dir: root.join("config"),
            root,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("TIDEWALK_ROOT points at {path}, which has no Cargo.toml next to crates/ or assets/")]
    InvalidEnvRoot { path: PathBuf },
    #[error("no project root above {start_dir}; set TIDEWALK_ROOT to the directory holding Cargo.toml")]
    RootNotFound { start_dir: PathBuf },
}

/// Uses `TIDEWALK_ROOT` when set, otherwise the nearest ancestor of the
/// executable that looks like the project root.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = match env::var_os(ROOT_ENV_VAR) {
        Some(raw) => {
            let path = canonical(Path::new(&raw));
            if !is_project_root(&path) {
                return Err(StartupError::InvalidEnvRoot { path });
            }
            path
        }
        None => root_above_executable()?,
    };
    Ok(AppPaths::under(root))
}

fn root_above_executable() -> Result<PathBuf, StartupError> {
    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let start = exe
        .parent()
        .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
    find_root_above(start).ok_or_else(|| StartupError::RootNotFound {
        start_dir: canonical(start),
    })
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_project_root(candidate))
        .map(canonical)
}

fn is_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn root_needs_manifest_and_content_dir() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        assert!(!is_project_root(temp.path()));

        fs::create_dir(temp.path().join("assets")).expect("assets");
        assert!(is_project_root(temp.path()));
    }

    #[test]
    fn root_is_found_from_nested_directory() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        let nested = temp.path().join("crates").join("target").join("debug");
        fs::create_dir_all(&nested).expect("nested");

        let found = find_root_above(&nested).expect("root");
        assert_eq!(found, canonical(temp.path()));
        let paths = AppPaths::under(found.clone());
        assert_eq!(paths.maps_dir, found.join("maps"));
        assert_eq!(paths.config_dir, found.join("config"));
    }
}
