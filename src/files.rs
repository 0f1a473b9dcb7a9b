use crate::error::CalculationError;
use glob::{MatchOptions, Pattern};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSION: &str = "json";

/// Lists the input files of one directory, without descending into subdirectories.
#[derive(Debug, Clone)]
pub struct FileSelector {
    extension: String,
}

impl Default for FileSelector {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl FileSelector {
    /// `extension` is matched case-insensitively; a leading dot is ignored.
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn select<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<PathBuf>, CalculationError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(CalculationError::NotADirectory(directory.to_path_buf()));
        }
        let read_error = |source| CalculationError::DirectoryRead {
            directory: directory.to_path_buf(),
            source,
        };

        // Only entry names are matched; the directory path itself is never treated as a pattern.
        let pattern = Pattern::new(&format!("*.{}", Pattern::escape(&self.extension)))
            .map_err(|e| read_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        info!(
            "Searching for files matching {} in: {}",
            pattern.as_str(),
            directory.display()
        );

        let mut files = Vec::new();
        for entry in fs::read_dir(directory).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let path = entry.path();
            if !pattern.matches_with(&entry.file_name().to_string_lossy(), options) {
                continue;
            }
            if path.is_file() {
                files.push(path);
            } else {
                debug!("Skipping non-file entry: {}", path.display());
            }
        }

        if files.is_empty() {
            warn!("No files matching {} found in: {}", pattern.as_str(), directory.display());
            return Err(CalculationError::NoInputFiles {
                directory: directory.to_path_buf(),
                extension: self.extension.clone(),
            });
        }

        files.sort();
        info!("Found {} files to process.", files.len());
        Ok(files)
    }
}
