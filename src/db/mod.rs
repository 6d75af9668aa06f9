use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data::Schedule;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreErr {
    #[error("State directory could not be created: {0}")]
    FailedCreation(std::io::Error),
    #[error("Cannot open file '{0}': {1}")]
    CannotOpen(PathBuf, std::io::Error),
    #[error("Invalid state file {0}: {1}")]
    InvalidStateFile(PathBuf, serde_json::Error),
    #[error("Failed to write {0}: {1}")]
    FailedToWrite(PathBuf, std::io::Error),
    #[error("Failed to serialize state into {0}: {1}")]
    FailedToSerialize(PathBuf, serde_json::Error),
    #[error("Failed to remove backup {0}: {1}")]
    FailedToRemoveBackup(PathBuf, std::io::Error),
}

type StoreResult<T> = Result<T, StoreErr>;

const DEFAULT_FILE_NAME: &str = "state.json";

/// The schedule on disk, with a hidden sibling backup used during saves.
///
/// A save writes the backup, then the main file, then removes the backup.
/// Whenever the process dies, one of the two files holds a complete copy,
/// and a backup that is still present is the newer one.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    backup: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> StateStore {
        let path = path.into();
        let mut backup_name = OsString::from(".");
        backup_name.push(path.file_name().unwrap_or_else(|| OsStr::new(DEFAULT_FILE_NAME)));
        let backup = path.with_file_name(backup_name);
        StateStore { path, backup }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    pub fn save(&self, schedule: &Schedule) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                log::info!("Creating state directory {}", dir.display());
                std::fs::create_dir_all(dir).map_err(StoreErr::FailedCreation)?;
            }
        }

        write_file(&self.backup, schedule)?;
        write_file(&self.path, schedule)?;
        std::fs::remove_file(&self.backup)
            .map_err(|e| StoreErr::FailedToRemoveBackup(self.backup.clone(), e))?;

        log::info!("Saved schedule to {}", self.path.display());
        Ok(())
    }

    /// Loads the newest complete copy, or an empty schedule if there is none.
    pub fn load(&self) -> Schedule {
        let mut found_any = false;
        for (label, file) in [("backup", &self.backup), ("main", &self.path)] {
            if !file.exists() {
                continue;
            }
            found_any = true;
            match read_file(file) {
                Ok(schedule) => {
                    log::debug!("Loaded schedule from {} file {}", label, file.display());
                    return schedule;
                }
                Err(e) => log::warn!("Skipping {} state file: {}", label, e),
            }
        }

        if found_any {
            log::warn!(
                "All state files at {} are corrupted, starting empty",
                self.path.display()
            );
        } else {
            log::info!("No state at {}, starting empty", self.path.display());
        }
        Schedule::default()
    }
}

fn write_file(path: &Path, schedule: &Schedule) -> StoreResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(|e| StoreErr::CannotOpen(path.to_path_buf(), e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, schedule)
        .map_err(|e| StoreErr::FailedToSerialize(path.to_path_buf(), e))?;
    writer
        .flush()
        .map_err(|e| StoreErr::FailedToWrite(path.to_path_buf(), e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| StoreErr::FailedToWrite(path.to_path_buf(), e))
}

fn read_file(path: &Path) -> StoreResult<Schedule> {
    let file = File::open(path).map_err(|e| StoreErr::CannotOpen(path.to_path_buf(), e))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| StoreErr::InvalidStateFile(path.to_path_buf(), e))
}

#[cfg(test)]
mod test;
