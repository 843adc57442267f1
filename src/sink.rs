use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::SinkError;
use crate::record::CaseRecord;

/// How `data_autuacao` is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateStyle {
    /// As printed on the page, `dd/mm/yyyy`.
    #[default]
    AsExtracted,
    /// `YYYY-MM-DD` when the extracted value is a valid date.
    Iso8601,
}

/// Append-only JSON Lines output, one record per line.
///
/// The file is opened once and never truncated. `write` takes `&self` and
/// serializes callers on an internal lock, so each line goes out whole even
/// when records arrive from several threads.
pub struct JsonLinesSink {
    path: PathBuf,
    dates: DateStyle,
    inner: Mutex<Inner>,
}

struct Inner {
    file: File,
    written: usize,
}

impl JsonLinesSink {
    pub fn open(path: impl AsRef<Path>, dates: DateStyle) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "Appending records");

        Ok(JsonLinesSink {
            path,
            dates,
            inner: Mutex::new(Inner { file, written: 0 }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, record: &CaseRecord) -> Result<(), SinkError> {
        let mut line = self.encode(record)?;
        line.push('\n');

        // A panic elsewhere cannot leave half a line behind, so a poisoned lock is still usable.
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .file
            .write_all(line.as_bytes())
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        inner.written += 1;
        debug!(numero = %record.process_number, "Record appended");
        Ok(())
    }

    /// Flush to disk and release the file. Returns the lines written by this handle.
    pub fn close(self) -> Result<usize, SinkError> {
        let inner = self.inner.into_inner().unwrap_or_else(|e| e.into_inner());
        inner.file.sync_all().map_err(|source| SinkError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(inner.written)
    }

    fn encode(&self, record: &CaseRecord) -> Result<String, SinkError> {
        match self.dates {
            DateStyle::AsExtracted => Ok(serde_json::to_string(record)?),
            DateStyle::Iso8601 => {
                let mut record = record.clone();
                if let Some(date) = record.filing_date_iso() {
                    record.filing_date = date.format("%Y-%m-%d").to_string();
                }
                Ok(serde_json::to_string(&record)?)
            }
        }
    }
}
