// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped report output.
//!
//! A [`ReportSink`] is where a runner's reporter output goes for the
//! duration of one run: the terminal, or a report file. A file sink replaces
//! any previous artifact at its path, and is flushed and closed when the sink
//! is dropped, whatever the run's outcome.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct ReportSink {
    target: Target,
}

enum Target {
    Stdout,
    File { path: PathBuf, writer: BufWriter<File> },
}

impl ReportSink {
    /// Output to the terminal.
    pub fn stdout() -> Self {
        Self {
            target: Target::Stdout,
        }
    }

    /// Output to `path`, replacing any existing file.
    pub fn file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| Error::io(path, e))?;
        }
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!("capturing report output in {}", path.display());
        Ok(Self {
            target: Target::File {
                path: path.to_path_buf(),
                writer: BufWriter::new(file),
            },
        })
    }

    /// Write one chunk of reporter output.
    ///
    /// Terminal output holds the stdout lock for the whole chunk, so chunks
    /// from concurrent runs never interleave.
    pub fn write_chunk(&mut self, bytes: &[u8]) -> Result<()> {
        match &mut self.target {
            Target::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)
                    .and_then(|()| out.flush())
                    .map_err(|e| Error::io("<stdout>", e))
            }
            Target::File { path, writer } => {
                writer.write_all(bytes).map_err(|e| Error::io(path.as_path(), e))
            }
        }
    }

    /// Flush and close, returning the captured file's path.
    pub fn finish(mut self) -> Result<Option<PathBuf>> {
        match &mut self.target {
            Target::Stdout => Ok(None),
            Target::File { path, writer } => {
                writer.flush().map_err(|e| Error::io(path.as_path(), e))?;
                Ok(Some(path.clone()))
            }
        }
    }
}

impl Drop for ReportSink {
    fn drop(&mut self) {
        if let Target::File { path, writer } = &mut self.target {
            if let Err(e) = writer.flush() {
                tracing::warn!("failed to flush {}: {}", path.display(), e);
            }
            tracing::debug!("released report output {}", path.display());
        }
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
