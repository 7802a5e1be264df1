//! Snapshot and history persistence. The snapshot file holds exactly one
//! generation: the previous run's items, loaded read-only for diffing and
//! then overwritten. The history file is an append-only CSV audit trail.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::models::{Item, Snapshot};

const DATA_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SnapshotStore {
    snapshot_path: PathBuf,
    history_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            snapshot_path: PathBuf::from(&config.snapshot_file),
            history_path: PathBuf::from(&config.history_file),
        }
    }

    /// Load the previous run's snapshot. Missing or unreadable state is
    /// logged and reported as "no prior", never as an error: on a first
    /// run there is simply nothing to diff against.
    pub fn load_prior(&self) -> Option<Snapshot> {
        let bytes = match fs::read(&self.snapshot_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no prior snapshot at {}", self.snapshot_path.display());
                return None;
            }
            Err(e) => {
                warn!(
                    "unable to read prior snapshot {}: {e}",
                    self.snapshot_path.display()
                );
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => {
                debug!("loaded prior snapshot from {}", self.snapshot_path.display());
                Some(snapshot)
            }
            Err(e) => {
                warn!(
                    "corrupt prior snapshot {}, treating as absent: {e}",
                    self.snapshot_path.display()
                );
                None
            }
        }
    }

    /// Persist the new snapshot as the prior for the next run. Failure
    /// here is the run's one hard error: losing the snapshot breaks every
    /// future diff.
    pub fn save_prior(&self, snapshot: &Snapshot) -> crate::Result<()> {
        ensure_parent_dir(&self.snapshot_path)?;
        let file = File::create(&self.snapshot_path)?;
        serde_json::to_writer_pretty(file, snapshot)?;
        debug!("saved snapshot to {}", self.snapshot_path.display());
        Ok(())
    }

    /// Append this run's items for one search to the history file.
    /// Best-effort: failures are logged with the label and swallowed.
    pub fn append_history(&self, label: &str, items: &[Item]) {
        if let Err(e) = self.try_append_history(items) {
            warn!("[{label}] error appending history {}: {e}", self.history_path.display());
        } else {
            debug!("[{label}] {} appended", self.history_path.display());
        }
    }

    fn try_append_history(&self, items: &[Item]) -> crate::Result<()> {
        ensure_parent_dir(&self.history_path)?;
        let new_file = !self.history_path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if new_file {
            writer.write_record(["", "time", "item", "price", "stock", "link"])?;
        }
        for (index, item) in items.iter().enumerate() {
            writer.write_record([
                index.to_string(),
                item.timestamp.format(DATA_DATE_FORMAT).to_string(),
                item.title.clone(),
                item.price.to_string(),
                item.in_stock.to_string(),
                item.link.clone(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
