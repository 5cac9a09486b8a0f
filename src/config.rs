//! Data file locations
//!
//! cty.dat and grid.dat ship with the application. A copy placed in the
//! user's data directory takes precedence so the files can be updated
//! without reinstalling.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CTY_FILE_NAME: &str = "cty.dat";
pub const GRID_FILE_NAME: &str = "grid.dat";

/// Where load and reload read their input from
pub trait DataPaths: Send + Sync {
    fn cty_path(&self) -> PathBuf;
    fn grid_path(&self) -> PathBuf;
}

/// Bundled data directory with an optional user override directory
#[derive(Debug, Clone, Deserialize)]
pub struct DataDirs {
    pub bundled_dir: PathBuf,
    #[serde(default)]
    pub user_dir: Option<PathBuf>,
}

impl DataDirs {
    pub fn new(bundled_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundled_dir: bundled_dir.into(),
            user_dir: None,
        }
    }

    pub fn with_user_dir(mut self, user_dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(user_dir.into());
        self
    }

    /// User copy if it exists, bundled copy otherwise
    fn resolve(&self, file_name: &str) -> PathBuf {
        if let Some(user_dir) = &self.user_dir {
            let user_copy = user_dir.join(file_name);
            if user_copy.exists() {
                return user_copy;
            }
        }
        self.bundled_dir.join(file_name)
    }
}

impl DataPaths for DataDirs {
    fn cty_path(&self) -> PathBuf {
        self.resolve(CTY_FILE_NAME)
    }

    fn grid_path(&self) -> PathBuf {
        self.resolve(GRID_FILE_NAME)
    }
}

/// Fixed paths, for callers that resolve locations themselves
#[derive(Debug, Clone)]
pub struct FixedPaths {
    pub cty: PathBuf,
    pub grid: PathBuf,
}

impl FixedPaths {
    pub fn new(cty: impl AsRef<Path>, grid: impl AsRef<Path>) -> Self {
        Self {
            cty: cty.as_ref().to_path_buf(),
            grid: grid.as_ref().to_path_buf(),
        }
    }
}

impl DataPaths for FixedPaths {
    fn cty_path(&self) -> PathBuf {
        self.cty.clone()
    }

    fn grid_path(&self) -> PathBuf {
        self.grid.clone()
    }
}
