//! CSV trade log writer.
//!
//! Append mode, so an interrupted session never truncates earlier
//! data; the header is only written when the file starts empty.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use skew_core::FilledOrder;
use tracing::{info, warn};

use crate::error::LedgerResult;

const HEADER: &str = "time,symbol,side,executedQty,price";

/// Buffered CSV writer for filled-order records.
pub struct TradeLogWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    records_written: usize,
}

impl TradeLogWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
            records_written: 0,
        }
    }

    fn open(&mut self) -> LedgerResult<&mut BufWriter<File>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let starts_empty = file.metadata()?.len() == 0;

            info!(path = %self.path.display(), "opening trade log (append mode)");
            let mut writer = BufWriter::new(file);
            if starts_empty {
                writeln!(writer, "{HEADER}")?;
            }
            self.writer = Some(writer);
        }
        Ok(self.writer.as_mut().expect("writer just opened"))
    }

    /// Write records and flush to disk.
    pub fn write_all(&mut self, records: &[FilledOrder]) -> LedgerResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let writer = self.open()?;
        for record in records {
            writeln!(
                writer,
                "{},{},{},{},{}",
                record.time.to_rfc3339(),
                record.symbol,
                record.side,
                record.executed_qty,
                record.price
            )?;
        }
        writer.flush()?;
        self.records_written += records.len();

        info!(
            records = records.len(),
            total = self.records_written,
            path = %self.path.display(),
            "trade log flushed"
        );
        Ok(())
    }

    /// Flush and drop the file handle.
    pub fn close(&mut self) -> LedgerResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for TradeLogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(?e, "failed to flush trade log on drop");
        }
    }
}
