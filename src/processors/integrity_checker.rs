use chrono::NaiveDateTime;
use std::collections::HashSet;
use validator::Validate;

use crate::error::Result;
use crate::models::{ColumnMap, ObservationTable, Site};
use crate::utils::constants::TEMP_JUMP_THRESHOLD_C;

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub site: Site,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub incomplete_rows: usize,
    pub duplicate_timestamps: usize,
    pub out_of_order_pairs: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, kind: ViolationType) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub timestamp: NaiveDateTime,
    pub kind: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    DuplicateTimestamp,
    OutOfOrder,
    OutOfRange,
    MissingValues,
    SuspiciousJump,
}

/// Audits a site store for ordering, duplicates, physically implausible
/// readings and temperature spikes
pub struct IntegrityChecker {
    temperature_jump_threshold: f64,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            temperature_jump_threshold: TEMP_JUMP_THRESHOLD_C,
        }
    }

    pub fn check(&self, site: Site, table: &ObservationTable) -> Result<IntegrityReport> {
        let columns = ColumnMap::resolve(site, table)?;

        let mut report = IntegrityReport {
            site,
            total_rows: table.len(),
            valid_rows: 0,
            invalid_rows: 0,
            incomplete_rows: 0,
            duplicate_timestamps: 0,
            out_of_order_pairs: 0,
            first_timestamp: table.first_timestamp(),
            last_timestamp: table.last_timestamp(),
            min_temp_c: None,
            max_temp_c: None,
            violations: Vec::new(),
        };

        let mut seen = HashSet::with_capacity(table.len());
        let mut observations = Vec::with_capacity(table.len());
        for row in table.rows() {
            if !seen.insert(row.timestamp) {
                report.duplicate_timestamps += 1;
                report.violations.push(Violation {
                    timestamp: row.timestamp,
                    kind: ViolationType::DuplicateTimestamp,
                    details: "timestamp appears more than once".to_string(),
                });
            }

            let Some(obs) = columns.observation(row) else {
                report.incomplete_rows += 1;
                report.violations.push(Violation {
                    timestamp: row.timestamp,
                    kind: ViolationType::MissingValues,
                    details: "row lacks a required value".to_string(),
                });
                continue;
            };

            match obs.validate() {
                Ok(()) => report.valid_rows += 1,
                Err(errors) => {
                    report.invalid_rows += 1;
                    report.violations.push(Violation {
                        timestamp: obs.timestamp,
                        kind: ViolationType::OutOfRange,
                        details: errors.to_string().replace('\n', "; "),
                    });
                }
            }

            let temp = obs.air_temp_c;
            report.min_temp_c = Some(report.min_temp_c.map_or(temp, |t| t.min(temp)));
            report.max_temp_c = Some(report.max_temp_c.map_or(temp, |t| t.max(temp)));
            observations.push(obs);
        }

        for pair in table.rows().windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                report.out_of_order_pairs += 1;
                report.violations.push(Violation {
                    timestamp: pair[1].timestamp,
                    kind: ViolationType::OutOfOrder,
                    details: format!("follows later row {}", pair[0].timestamp),
                });
            }
        }

        // Jumps are judged in time order regardless of how the rows are stored
        let mut ordered: Vec<_> = observations.iter().collect();
        ordered.sort_by_key(|o| o.timestamp);
        for pair in ordered.windows(2) {
            let jump = (pair[1].air_temp_c - pair[0].air_temp_c).abs();
            if jump > self.temperature_jump_threshold {
                report.violations.push(Violation {
                    timestamp: pair[1].timestamp,
                    kind: ViolationType::SuspiciousJump,
                    details: format!(
                        "air temperature jumped {:.1}°C since {}",
                        jump, pair[0].timestamp
                    ),
                });
            }
        }

        Ok(report)
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();
        let pct = |n: usize| {
            if report.total_rows == 0 {
                0.0
            } else {
                100.0 * n as f64 / report.total_rows as f64
            }
        };

        summary.push_str(&format!("=== Integrity Check: {} ===\n", report.site));
        summary.push_str(&format!("Total Rows: {}\n", report.total_rows));
        if let (Some(first), Some(last)) = (report.first_timestamp, report.last_timestamp) {
            summary.push_str(&format!("Span: {} to {}\n", first, last));
        }
        summary.push_str(&format!(
            "Valid Rows: {} ({:.1}%)\n",
            report.valid_rows,
            pct(report.valid_rows)
        ));
        summary.push_str(&format!(
            "Out-of-range Rows: {} ({:.1}%)\n",
            report.invalid_rows,
            pct(report.invalid_rows)
        ));
        summary.push_str(&format!(
            "Duplicate Timestamps: {}\n",
            report.duplicate_timestamps
        ));
        summary.push_str(&format!("Incomplete Rows: {}\n", report.incomplete_rows));
        summary.push_str(&format!("Out-of-order Rows: {}\n", report.out_of_order_pairs));
        summary.push_str(&format!(
            "Temperature Jumps: {}\n",
            report.count(ViolationType::SuspiciousJump)
        ));
        if let (Some(min), Some(max)) = (report.min_temp_c, report.max_temp_c) {
            summary.push_str(&format!("Air Temperature: {:.1}°C to {:.1}°C\n", min, max));
        }

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {} {:?}: {}\n",
                    i + 1,
                    violation.timestamp,
                    violation.kind,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableRow;
    use chrono::{Duration, NaiveDate};

    fn ts(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn table(rows: &[(i64, f64, f64)]) -> ObservationTable {
        let columns = ["AvgAT", "AvgRH", "AWS", "AWD", "AvgBP"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        ObservationTable::with_rows(
            columns,
            rows.iter()
                .map(|&(m, temp, rh)| TableRow::complete(ts(m), vec![temp, rh, 2.0, 45.0, 1009.0]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_table() {
        let report = IntegrityChecker::new()
            .check(Site::Farm, &table(&[(0, 12.0, 70.0), (10, 12.4, 69.0), (20, 12.9, 67.5)]))
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.valid_rows, 3);
        assert_eq!(report.min_temp_c, Some(12.0));
        assert_eq!(report.max_temp_c, Some(12.9));
    }

    #[test]
    fn test_detects_problems() {
        let checker = IntegrityChecker::new();
        let report = checker
            .check(
                Site::Gardens,
                &table(&[
                    (0, 12.0, 70.0),
                    (20, 25.0, 70.0),
                    (10, 12.5, 104.0),
                    (20, 25.1, 70.0),
                ]),
            )
            .unwrap();

        assert_eq!(report.duplicate_timestamps, 1);
        assert_eq!(report.out_of_order_pairs, 1);
        assert_eq!(report.invalid_rows, 1);
        assert_eq!(report.count(ViolationType::OutOfRange), 1);
        // 12.5 -> 25.0 in time order
        assert_eq!(report.count(ViolationType::SuspiciousJump), 1);

        let summary = checker.generate_summary(&report);
        assert!(summary.contains("Integrity Check: Gardens"));
        assert!(summary.contains("Duplicate Timestamps: 1"));
        assert!(summary.contains("Top 10 Violations"));
    }

    #[test]
    fn test_rows_missing_required_values() {
        let mut table = table(&[(0, 12.0, 70.0)]);
        table
            .push(TableRow::new(
                ts(10),
                vec![Some(12.2), None, Some(2.0), Some(45.0), Some(1009.0)],
            ))
            .unwrap();

        let checker = IntegrityChecker::new();
        let report = checker.check(Site::Farm, &table).unwrap();

        assert_eq!(report.total_rows, 2);
        assert_eq!(report.valid_rows, 1);
        assert_eq!(report.incomplete_rows, 1);
        assert_eq!(report.count(ViolationType::MissingValues), 1);
        assert!(checker.generate_summary(&report).contains("Incomplete Rows: 1"));
    }

    #[test]
    fn test_empty_table_summary() {
        let checker = IntegrityChecker::new();
        let report = checker.check(Site::Farm, &table(&[])).unwrap();
        assert_eq!(report.total_rows, 0);
        assert!(checker.generate_summary(&report).contains("Valid Rows: 0 (0.0%)"));
    }
}
