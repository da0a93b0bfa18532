use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notifier_core::{ArticleId, SeenSet};
use notifier_logging::{notifier_error, notifier_info, notifier_warn};
use serde_json::Value;

use crate::{AtomicFileWriter, PersistError};

const QUARANTINE_SUFFIX: &str = ".corrupt";

/// Durable record of announced article ids: a JSON array of strings.
#[derive(Debug, Clone)]
pub struct SeenSetStore {
    path: PathBuf,
}

impl SeenSetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored ids. Never fails: a missing file is an empty set, and an
    /// unreadable or malformed file is logged and treated as empty. A malformed
    /// file is moved aside first so the next save cannot overwrite it.
    pub fn load(&self) -> SeenSet {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                notifier_info!("No seen-set at {:?}; starting empty", self.path);
                return SeenSet::new();
            }
            Err(err) => {
                notifier_error!("Failed to read seen-set from {:?}: {}", self.path, err);
                return SeenSet::new();
            }
        };

        let entries: Vec<Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(err) => {
                notifier_error!(
                    "Seen-set at {:?} is malformed ({}); starting empty, already announced articles may be repeated",
                    self.path,
                    err
                );
                self.quarantine();
                return SeenSet::new();
            }
        };

        entries
            .iter()
            .map(|entry| ArticleId::from_json(Some(entry)))
            .collect()
    }

    /// Overwrites the stored snapshot with `seen`.
    pub fn save(&self, seen: &SeenSet) -> Result<(), PersistError> {
        let content = serde_json::to_string(&seen.sorted_ids())?;
        let filename = self
            .path
            .file_name()
            .ok_or_else(|| PersistError::TargetDir(format!("{:?} has no file name", self.path)))?
            .to_string_lossy()
            .into_owned();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        AtomicFileWriter::new(dir).write(&filename, &content)?;
        Ok(())
    }

    fn quarantine(&self) {
        let mut target = OsString::from(self.path.as_os_str());
        target.push(QUARANTINE_SUFFIX);
        let target = PathBuf::from(target);
        match fs::rename(&self.path, &target) {
            Ok(()) => notifier_warn!("Moved malformed seen-set to {:?}", target),
            Err(err) => notifier_warn!("Could not move malformed seen-set aside: {}", err),
        }
    }
}
