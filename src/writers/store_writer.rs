use csv::Writer;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::ObservationTable;
use crate::utils::constants::{TIMESTAMP_COLUMN, TIMESTAMP_FORMAT};
use crate::writers::atomic::write_atomic;

/// Persists a site store as CSV: `TIMESTAMP` followed by the raw logger
/// columns. Missing values are written as empty cells.
pub struct StoreWriter;

impl StoreWriter {
    pub fn new() -> Self {
        Self
    }

    /// Replace the store at `path` with `table` in one atomic rename
    pub fn write(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        write_atomic(path, |out| {
            let mut writer = Writer::from_writer(out);

            let mut header = Vec::with_capacity(table.columns().len() + 1);
            header.push(TIMESTAMP_COLUMN.to_string());
            header.extend(table.columns().iter().cloned());
            writer.write_record(&header)?;

            for row in table.rows() {
                let mut record = Vec::with_capacity(row.values.len() + 1);
                record.push(row.timestamp.format(TIMESTAMP_FORMAT).to_string());
                record.extend(
                    row.values
                        .iter()
                        .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
                );
                writer.write_record(&record)?;
            }

            writer.flush()?;
            Ok(())
        })?;

        debug!(path = %path.display(), rows = table.len(), "Wrote store");
        Ok(())
    }
}

impl Default for StoreWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableRow;
    use crate::readers::StoreReader;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_store() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("Farm.csv");
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let table = ObservationTable::with_rows(
            vec!["RECORD".to_string(), "AvgAT".to_string()],
            vec![TableRow::complete(ts, vec![1021.0, 24.55])],
        )?;

        StoreWriter::new().write(&table, &path)?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(
            text,
            "TIMESTAMP,RECORD,AvgAT\n2024-05-01 12:00:00,1021,24.55\n"
        );
        assert_eq!(StoreReader::new().read(&path)?, Some(table));
        Ok(())
    }

    #[test]
    fn test_missing_values_written_as_empty_cells() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("Gardens.csv");
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let table = ObservationTable::with_rows(
            vec!["AvgWS".to_string(), "AWS".to_string()],
            vec![TableRow::new(ts, vec![None, Some(4.5)])],
        )?;

        StoreWriter::new().write(&table, &path)?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text, "TIMESTAMP,AvgWS,AWS\n2024-05-01 12:00:00,,4.5\n");
        assert_eq!(StoreReader::new().read(&path)?, Some(table));
        Ok(())
    }
}
