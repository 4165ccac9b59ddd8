//! # JSONL Telemetry Logger
//!
//! Appends one JSON object per line and rotates files once they hold
//! `max_records_per_file` records, keeping the newest `max_files_to_keep`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::record::LinkQualityRecord;
use crate::config::TelemetryConfig;
use crate::error::Result;

const FILE_PREFIX: &str = "lq_";
const FILE_EXTENSION: &str = "jsonl";

/// Rotating JSONL writer
#[derive(Debug)]
pub struct TelemetryLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    sequence: u64,
}

impl TelemetryLogger {
    /// Create the log directory and a logger writing into it
    ///
    /// No file is created until the first record is written.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        Self::with_limits(&config.log_dir, config.max_records_per_file, config.max_files_to_keep)
    }

    /// Logger over `dir` with explicit rotation limits
    pub fn with_limits<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Telemetry logging to {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            sequence: 0,
        })
    }

    /// Append one record, rotating first if the current file is full
    pub fn log(&mut self, record: &LinkQualityRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    /// File currently being written, if any
    pub fn current_file(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        // Names repeat across restarts within one second; never reuse a file
        let (path, file) = loop {
            let name = format!(
                "{}{}_{:04}.{}",
                FILE_PREFIX,
                Utc::now().format("%Y%m%d_%H%M%S"),
                self.sequence,
                FILE_EXTENSION
            );
            self.sequence += 1;

            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Telemetry file {} already exists, skipping", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        };
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names sort chronologically
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for old in files.into_iter().take(excess) {
            match fs::remove_file(&old) {
                Ok(()) => debug!("Removed old telemetry file {}", old.display()),
                Err(e) => warn!("Failed to remove {}: {}", old.display(), e),
            }
        }

        Ok(())
    }
}

/// Telemetry files in `dir`
pub fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(FILE_PREFIX))
            .unwrap_or(false)
            && path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);

        if is_log {
            files.push(path);
        }
    }

    Ok(files)
}
