//! File-based data source.
//!
//! Polls a saved render response (the JSON the backend returns for a
//! `leastSquaresIntercept` query).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use trendwatch_adapters::parse_render_response;
use trendwatch_types::ResultBatch;

use super::DataSource;

/// A data source that reads render responses from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<ResultBatch> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                return None;
            }
        };

        match parse_render_response(&content) {
            Ok(batch) => {
                debug!("Read {} series from {}", batch.len(), self.path.display());
                self.last_error = None;
                Some(batch)
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", self.path.display(), e);
                self.last_error = Some(e.to_string());
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<ResultBatch> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, don't update
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(batch) = self.read_file() {
                self.last_modified = current_modified;
                return Some(batch);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
