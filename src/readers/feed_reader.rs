use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{ObservationTable, TableRow};
use crate::utils::constants::{TIMESTAMP_COLUMN, TIMESTAMP_FORMAT};

/// Row counts from parsing one batch of logger output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub data_rows: usize,
    pub parsed_rows: usize,
    pub dropped_rows: usize,
}

/// A parsed feed batch plus what the environment line told us about its source
#[derive(Debug, Clone)]
pub struct FeedBatch {
    pub station_name: Option<String>,
    pub table_name: Option<String>,
    pub table: ObservationTable,
    pub report: ParseReport,
}

/// Parser for the logger's TOA5 table text:
///
/// ```text
/// "TOA5","Farm Mesonet","CR1000",...,"Table10"   environment line (discarded)
/// "TIMESTAMP","RECORD","AvgAT",...                column names
/// "TS","RN","Deg C",...                           units row (discarded)
/// "","","Avg",...                                 processing row (fails to parse)
/// "2024-05-01 12:00:00",1021,24.5,...             data
/// ```
pub struct FeedReader {
    skip_units_row: bool,
}

impl FeedReader {
    pub fn new() -> Self {
        Self {
            skip_units_row: true,
        }
    }

    pub fn with_skip_units_row(skip_units_row: bool) -> Self {
        Self { skip_units_row }
    }

    pub fn parse(&self, text: &str) -> Result<FeedBatch> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut records = reader.records();

        let environment = records
            .next()
            .ok_or_else(|| ProcessingError::InvalidFormat("Feed is empty".to_string()))??;
        let station_name = environment.get(1).map(|s| s.trim().to_string());
        let table_name = environment
            .get(environment.len().saturating_sub(1))
            .map(|s| s.trim().to_string());
        debug!(
            format = environment.get(0).unwrap_or(""),
            station = station_name.as_deref().unwrap_or(""),
            "Feed environment line"
        );

        let header = records.next().ok_or_else(|| {
            ProcessingError::InvalidFormat("Feed has no column header row".to_string())
        })??;
        let layout = RowLayout::from_header(&header)?;

        if self.skip_units_row {
            records.next();
        }

        let mut table = ObservationTable::new(layout.columns.clone());
        let mut report = ParseReport::default();

        for record in records {
            report.data_rows += 1;
            let parsed = record.ok().and_then(|r| layout.parse_record(&r));
            match parsed {
                Some(row) => {
                    table.push(row)?;
                    report.parsed_rows += 1;
                }
                None => report.dropped_rows += 1,
            }
        }

        Ok(FeedBatch {
            station_name,
            table_name,
            table,
            report,
        })
    }
}

impl Default for FeedReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the timestamp sits in a header and which value columns surround it
#[derive(Debug, Clone)]
pub(crate) struct RowLayout {
    pub width: usize,
    pub timestamp_index: usize,
    pub columns: Vec<String>,
}

impl RowLayout {
    pub fn from_header(header: &StringRecord) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let timestamp_index = names
            .iter()
            .position(|n| n == TIMESTAMP_COLUMN)
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Header has no {} column: {}",
                    TIMESTAMP_COLUMN,
                    names.join(",")
                ))
            })?;

        let columns = names
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != timestamp_index)
            .map(|(_, n)| n.clone())
            .collect();

        Ok(Self {
            width: names.len(),
            timestamp_index,
            columns,
        })
    }

    /// Parse one feed record; `None` if any field is unusable
    pub fn parse_record(&self, record: &StringRecord) -> Option<TableRow> {
        self.parse_with(record, |field| parse_value(field).map(Some))
    }

    /// Parse one store record. Blank cells are values the row never had;
    /// anything else must be a finite number.
    pub fn parse_stored_record(&self, record: &StringRecord) -> Option<TableRow> {
        self.parse_with(record, |field| {
            if field.trim().is_empty() {
                Some(None)
            } else {
                parse_value(field).map(Some)
            }
        })
    }

    fn parse_with<F>(&self, record: &StringRecord, cell: F) -> Option<TableRow>
    where
        F: Fn(&str) -> Option<Option<f64>>,
    {
        if record.len() != self.width {
            return None;
        }

        let timestamp = parse_timestamp(record.get(self.timestamp_index)?)?;

        let mut values = Vec::with_capacity(self.width - 1);
        for (i, field) in record.iter().enumerate() {
            if i == self.timestamp_index {
                continue;
            }
            values.push(cell(field)?);
        }

        Some(TableRow::new(timestamp, values))
    }
}

pub(crate) fn parse_timestamp(field: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(field.trim(), TIMESTAMP_FORMAT).ok()
}

/// Finite numbers only; the logger writes `NAN` for failed sensor reads
pub(crate) fn parse_value(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
