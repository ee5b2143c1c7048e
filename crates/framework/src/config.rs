use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Per-user locations for Trainer Desk data.
#[derive(Clone, Debug)]
pub struct DataDirs {
    data_dir: PathBuf,
}

impl DataDirs {
    /// Finds the platform data directory for the application.
    pub fn locate() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "trainer_desk")
            .ok_or(Error::new("failed to get data directory"))?;
        Ok(Self::at(dirs.data_dir()))
    }

    /// Uses an explicit root instead of the platform directory.
    pub fn at(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The default database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("data/trainers.db")
    }

    /// The default log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("logs/desk.log")
    }
}
