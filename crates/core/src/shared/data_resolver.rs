use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::{
    DATA_DIR_NAME, FACE_CASCADE_NAME, LEFT_EYE_CASCADE_NAME, RIGHT_EYE_CASCADE_NAME,
};

#[derive(Error, Debug)]
pub enum DataResolveError {
    #[error("could not determine executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),
    #[error("{name} not found in any of: {searched}")]
    NotFound { name: String, searched: String },
}

/// Locations of the three pretrained cascade definitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadePaths {
    pub face: PathBuf,
    pub left_eye: PathBuf,
    pub right_eye: PathBuf,
}

/// Resolve all cascade files, see [`search_dirs`] for the lookup order.
pub fn resolve_cascades(override_dir: Option<&Path>) -> Result<CascadePaths, DataResolveError> {
    let dirs = search_dirs(override_dir)?;
    Ok(CascadePaths {
        face: resolve_in(FACE_CASCADE_NAME, &dirs)?,
        left_eye: resolve_in(LEFT_EYE_CASCADE_NAME, &dirs)?,
        right_eye: resolve_in(RIGHT_EYE_CASCADE_NAME, &dirs)?,
    })
}

/// Directories searched for data files, in priority order.
///
/// An explicit `override_dir` is searched alone. Otherwise:
/// 1. `data/` next to the running executable
/// 2. `data/` in the executable directory's parent (build trees, `bin/` installs)
/// 3. The per-user data directory (`$XDG_DATA_HOME/faceoff/data` on Linux)
pub fn search_dirs(override_dir: Option<&Path>) -> Result<Vec<PathBuf>, DataResolveError> {
    if let Some(dir) = override_dir {
        return Ok(vec![dir.to_path_buf()]);
    }
    let exe = env::current_exe().map_err(DataResolveError::ExecutablePath)?;
    Ok(candidate_dirs(exe.parent(), dirs::data_dir()))
}

fn candidate_dirs(exe_dir: Option<&Path>, user_data_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = exe_dir {
        candidates.push(dir.join(DATA_DIR_NAME));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join(DATA_DIR_NAME));
        }
    }
    if let Some(dir) = user_data_dir {
        candidates.push(dir.join("faceoff").join(DATA_DIR_NAME));
    }
    candidates
}

/// Returns the first `dir/name` that exists.
pub fn resolve_in(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, DataResolveError> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| DataResolveError::NotFound {
            name: name.to_string(),
            searched: dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
