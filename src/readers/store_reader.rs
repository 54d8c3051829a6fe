use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::ObservationTable;
use crate::readers::feed_reader::RowLayout;

/// Reads a site store written by [`crate::writers::StoreWriter`].
///
/// A strict reader fails on the first unreadable row. A lenient reader skips
/// unreadable rows with a warning and is meant for read-only consumers.
pub struct StoreReader {
    skip_unreadable_rows: bool,
}

impl StoreReader {
    pub fn new() -> Self {
        Self {
            skip_unreadable_rows: false,
        }
    }

    pub fn lenient() -> Self {
        Self {
            skip_unreadable_rows: true,
        }
    }

    /// Load the store at `path`, or `None` if the site has never been ingested
    pub fn read(&self, path: &Path) -> Result<Option<ObservationTable>> {
        if !path.exists() {
            debug!(path = %path.display(), "No store yet");
            return Ok(None);
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let layout = RowLayout::from_header(reader.headers()?)?;
        let mut table = ObservationTable::new(layout.columns.clone());
        let mut dropped = 0usize;

        for record in reader.records() {
            let record = record?;
            match layout.parse_stored_record(&record) {
                Some(row) => table.push(row)?,
                None if self.skip_unreadable_rows => dropped += 1,
                None => {
                    let line = record.position().map_or(0, |p| p.line());
                    return Err(ProcessingError::InvalidFormat(format!(
                        "Unreadable row at {}:{}",
                        path.display(),
                        line
                    )));
                }
            }
        }

        if dropped > 0 {
            warn!(
                path = %path.display(),
                dropped,
                "Skipped unreadable rows in store"
            );
        }

        Ok(Some(table))
    }
}

impl Default for StoreReader {
    fn default() -> Self {
        Self::new()
    }
}
