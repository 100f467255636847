//! Output file layout.
//!
//! One directory per category under the run's root, one or more files per
//! generator as declared in its descriptor. Paths are stable given
//! (source id, category); only the scratch/durable mode moves the root.

use crate::config::types::OutputConfig;
use crate::run::OutputMode;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(config: &OutputConfig, mode: OutputMode) -> Self {
        let root = match mode {
            OutputMode::Scratch => config.scratch_dir.clone(),
            OutputMode::Durable => config.durable_dir.clone(),
        };
        Self { root }
    }

    /// Test/alternate constructor with an explicit root.
    pub fn with_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one run's shared artifacts; lives beside the
    /// category directories so a run is self-contained on disk.
    pub fn artifact_dir(&self) -> PathBuf {
        self.root.join(".artifacts")
    }

    pub fn file_path(&self, category: &str, file_name: &str) -> PathBuf {
        self.root.join(category).join(file_name)
    }

    /// Writes one output file atomically: lines go to a temp file in the
    /// category directory, which is renamed into place once complete.
    pub fn write_lines<I, S>(
        &self,
        category: &str,
        file_name: &str,
        lines: I,
    ) -> Result<(PathBuf, usize), OutputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let final_path = self.file_path(category, file_name);
        let dir = final_path.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| OutputError::Io {
            path: dir.clone(),
            source,
        })?;

        let tmp_path = final_path.with_extension("tmp");
        let mut count = 0usize;
        {
            let file = fs::File::create(&tmp_path).map_err(|source| OutputError::Io {
                path: tmp_path.clone(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            for line in lines {
                writer
                    .write_all(line.as_ref().as_bytes())
                    .and_then(|_| writer.write_all(b"\n"))
                    .map_err(|source| OutputError::Io {
                        path: tmp_path.clone(),
                        source,
                    })?;
                count += 1;
            }
            writer.flush().map_err(|source| OutputError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        }
        fs::rename(&tmp_path, &final_path).map_err(|source| OutputError::Io {
            path: final_path.clone(),
            source,
        })?;

        debug!(path = %final_path.display(), lines = count, "Output file written");
        Ok((final_path, count))
    }
}
