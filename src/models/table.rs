use chrono::NaiveDateTime;

use crate::error::{ProcessingError, Result};

/// One timestamped row of raw logger values, ordered like the table's columns.
/// `None` is a cell the row has no value for (a column added to the store
/// after the row was recorded).
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

impl TableRow {
    pub fn new(timestamp: NaiveDateTime, values: Vec<Option<f64>>) -> Self {
        Self { timestamp, values }
    }

    /// Row with every cell present
    pub fn complete(timestamp: NaiveDateTime, values: Vec<f64>) -> Self {
        Self::new(timestamp, values.into_iter().map(Some).collect())
    }
}

/// Raw logger columns keyed by timestamp, as fetched from the feed or loaded
/// from a site store. Column names are kept exactly as the logger writes them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ObservationTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<TableRow>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push(&mut self, row: TableRow) -> Result<()> {
        if row.values.len() != self.columns.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Row at {} has {} values, expected {}",
                row.timestamp,
                row.values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).min()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.iter().map(|r| r.timestamp).max()
    }

    /// Stable sort by timestamp, then collapse duplicate timestamps keeping
    /// the earliest-inserted row. Returns the number of rows removed.
    pub fn sort_and_dedup(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.sort_by_key(|r| r.timestamp);
        self.rows.dedup_by_key(|r| r.timestamp);
        before - self.rows.len()
    }

    /// True when timestamps are strictly increasing
    pub fn is_sorted_unique(&self) -> bool {
        self.rows
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }

    /// Re-project this table onto `columns`, in that order. Columns not in
    /// `columns` are dropped; columns this table lacks become empty cells.
    pub fn project_to(&self, columns: &[String]) -> ObservationTable {
        let indices: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                TableRow::new(
                    row.timestamp,
                    indices.iter().map(|i| i.and_then(|i| row.values[i])).collect(),
                )
            })
            .collect();

        ObservationTable {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Columns present here but absent from `columns`
    pub fn extra_columns<'a>(&'a self, columns: &[String]) -> Vec<&'a str> {
        self.columns
            .iter()
            .filter(|c| !columns.contains(c))
            .map(|c| c.as_str())
            .collect()
    }

    /// Append `other`'s rows. When the column sets differ the table widens to
    /// the union: this table's columns first, then `other`'s new ones.
    pub fn extend(&mut self, other: ObservationTable) {
        if other.columns == self.columns {
            self.rows.extend(other.rows);
            return;
        }

        let added: Vec<String> = other
            .extra_columns(&self.columns)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !added.is_empty() {
            self.columns.extend(added);
            for row in &mut self.rows {
                row.values.resize(self.columns.len(), None);
            }
        }

        let aligned = other.project_to(&self.columns);
        self.rows.extend(aligned.rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_push_rejects_wrong_width() {
        let mut table = ObservationTable::new(columns(&["AvgAT", "AvgRH"]));
        assert!(table.push(TableRow::complete(ts(0, 0), vec![20.0])).is_err());
        assert!(table
            .push(TableRow::complete(ts(0, 0), vec![20.0, 50.0]))
            .is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_sort_and_dedup_keeps_first() {
        let mut table = ObservationTable::with_rows(
            columns(&["AvgAT"]),
            vec![
                TableRow::complete(ts(0, 20), vec![3.0]),
                TableRow::complete(ts(0, 10), vec![1.0]),
                TableRow::complete(ts(0, 20), vec![99.0]),
                TableRow::complete(ts(0, 0), vec![0.0]),
            ],
        )
        .unwrap();

        let removed = table.sort_and_dedup();

        assert_eq!(removed, 1);
        assert!(table.is_sorted_unique());
        let values: Vec<Option<f64>> = table.rows().iter().map(|r| r.values[0]).collect();
        assert_eq!(values, vec![Some(0.0), Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_project_to_reorders_drops_and_fills() {
        let table = ObservationTable::with_rows(
            columns(&["AvgRH", "AvgAT", "Extra"]),
            vec![TableRow::complete(ts(1, 0), vec![55.0, 21.5, 7.0])],
        )
        .unwrap();

        let projected = table.project_to(&columns(&["AvgAT", "AvgRH", "AvgBP"]));
        assert_eq!(projected.columns(), &columns(&["AvgAT", "AvgRH", "AvgBP"])[..]);
        assert_eq!(projected.rows()[0].values, vec![Some(21.5), Some(55.0), None]);
        assert_eq!(table.extra_columns(projected.columns()), vec!["Extra"]);
    }

    #[test]
    fn test_extend_widens_to_column_union() {
        let mut store = ObservationTable::with_rows(
            columns(&["AvgAT", "AvgWS"]),
            vec![TableRow::complete(ts(0, 0), vec![20.0, 3.0])],
        )
        .unwrap();
        let batch = ObservationTable::with_rows(
            columns(&["AvgAT", "AWS"]),
            vec![TableRow::complete(ts(0, 10), vec![21.0, 4.0])],
        )
        .unwrap();

        store.extend(batch);

        assert_eq!(store.columns(), &columns(&["AvgAT", "AvgWS", "AWS"])[..]);
        assert_eq!(store.rows()[0].values, vec![Some(20.0), Some(3.0), None]);
        assert_eq!(store.rows()[1].values, vec![Some(21.0), None, Some(4.0)]);
    }

    #[test]
    fn test_first_last_timestamp() {
        let table = ObservationTable::with_rows(
            columns(&["AvgAT"]),
            vec![
                TableRow::complete(ts(5, 0), vec![1.0]),
                TableRow::complete(ts(2, 0), vec![1.0]),
            ],
        )
        .unwrap();
        assert_eq!(table.first_timestamp(), Some(ts(2, 0)));
        assert_eq!(table.last_timestamp(), Some(ts(5, 0)));
        assert_eq!(ObservationTable::default().last_timestamp(), None);
    }
}
