use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::calc::celsius_to_fahrenheit;
use crate::error::{ProcessingError, Result};
use crate::models::{ObservationTable, Site, TableRow};
use crate::utils::constants::{
    AIR_TEMP_COLUMN, BATTERY_COLUMN, PRESSURE_COLUMN, RELATIVE_HUMIDITY_COLUMN,
    SOLAR_RADIATION_COLUMN, WIND_COLUMN_PAIRS,
};

/// One timestamped sample from a site's sensor suite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    pub timestamp: NaiveDateTime,

    #[validate(range(min = -40.0, max = 60.0))]
    pub air_temp_c: f64,

    #[validate(range(min = 0.0, max = 100.0))]
    pub relative_humidity_pct: f64,

    #[validate(range(min = 0.0, max = 75.0))]
    pub wind_speed_ms: f64,

    #[validate(range(min = 0.0, max = 360.0))]
    pub wind_dir_deg: f64,

    #[validate(range(min = 850.0, max = 1090.0))]
    pub barometric_pressure_hpa: f64,

    #[validate(range(min = -10.0, max = 1600.0))]
    pub solar_radiation_wm2: Option<f64>,

    #[validate(range(min = 0.0, max = 20.0))]
    pub battery_v: Option<f64>,
}

impl Observation {
    pub fn air_temp_f(&self) -> f64 {
        celsius_to_fahrenheit(self.air_temp_c)
    }

    pub fn relative_humidity_fraction(&self) -> f64 {
        self.relative_humidity_pct / 100.0
    }
}

/// Which naming scheme a logger generation used for its wind fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindColumns {
    pub speed: &'static str,
    pub direction: &'static str,
}

impl WindColumns {
    /// Every known speed/direction pair present in `columns`, in probe order.
    /// A store that saw a scheme change carries both pairs.
    pub fn available(site: Site, columns: &[String]) -> Result<Vec<Self>> {
        let present = |name: &str| columns.iter().any(|c| c == name);

        let pairs: Vec<Self> = WIND_COLUMN_PAIRS
            .iter()
            .filter(|(speed, direction)| present(speed) && present(direction))
            .map(|&(speed, direction)| WindColumns { speed, direction })
            .collect();

        if pairs.is_empty() {
            return Err(ProcessingError::MissingColumn {
                site: site.to_string(),
                candidates: WIND_COLUMN_PAIRS
                    .iter()
                    .map(|(s, d)| format!("{}/{}", s, d))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(pairs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct WindIndices {
    columns: WindColumns,
    speed: usize,
    direction: usize,
}

/// Column positions of every observation field within a raw table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    winds: Vec<WindIndices>,
    air_temp: usize,
    relative_humidity: usize,
    pressure: usize,
    solar_radiation: Option<usize>,
    battery: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(site: Site, table: &ObservationTable) -> Result<Self> {
        let required = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| ProcessingError::MissingColumn {
                    site: site.to_string(),
                    candidates: name.to_string(),
                })
        };

        let winds = WindColumns::available(site, table.columns())?
            .into_iter()
            .map(|columns| -> Result<WindIndices> {
                Ok(WindIndices {
                    columns,
                    speed: required(columns.speed)?,
                    direction: required(columns.direction)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            winds,
            air_temp: required(AIR_TEMP_COLUMN)?,
            relative_humidity: required(RELATIVE_HUMIDITY_COLUMN)?,
            pressure: required(PRESSURE_COLUMN)?,
            solar_radiation: table.column_index(SOLAR_RADIATION_COLUMN),
            battery: table.column_index(BATTERY_COLUMN),
        })
    }

    /// Wind schemes present in the table, in probe order
    pub fn wind_columns(&self) -> Vec<WindColumns> {
        self.winds.iter().map(|w| w.columns).collect()
    }

    /// Build the observation for `row`, taking wind from the first scheme
    /// with both values present. `None` when a required value is missing.
    pub fn observation(&self, row: &TableRow) -> Option<Observation> {
        let v = &row.values;
        let (wind_speed_ms, wind_dir_deg) = self
            .winds
            .iter()
            .find_map(|w| Some((v[w.speed]?, v[w.direction]?)))?;

        Some(Observation {
            timestamp: row.timestamp,
            air_temp_c: v[self.air_temp]?,
            relative_humidity_pct: v[self.relative_humidity]?,
            wind_speed_ms,
            wind_dir_deg,
            barometric_pressure_hpa: v[self.pressure]?,
            solar_radiation_wm2: self.solar_radiation.and_then(|i| v[i]),
            battery_v: self.battery.and_then(|i| v[i]),
        })
    }

    /// Observations for every complete row; incomplete rows are skipped
    pub fn observations(&self, table: &ObservationTable) -> Vec<Observation> {
        table
            .rows()
            .iter()
            .filter_map(|row| self.observation(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample_row() -> TableRow {
        let ts = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        TableRow::complete(ts, vec![101.0, 30.0, 60.0, 4.0, 180.0, 1005.0, 850.0, 13.1])
    }

    #[test]
    fn test_wind_columns_current_scheme() {
        let cols = columns(&["AvgAT", "AvgWS", "AvgWD"]);
        let winds = WindColumns::available(Site::Farm, &cols).unwrap();
        assert_eq!(winds.len(), 1);
        assert_eq!(winds[0].speed, "AvgWS");
        assert_eq!(winds[0].direction, "AvgWD");
    }

    #[test]
    fn test_wind_columns_legacy_scheme() {
        let cols = columns(&["AvgAT", "AWS", "AWD"]);
        let winds = WindColumns::available(Site::Gardens, &cols).unwrap();
        assert_eq!(winds[0].speed, "AWS");
        assert_eq!(winds[0].direction, "AWD");
    }

    #[test]
    fn test_wind_columns_missing() {
        let cols = columns(&["AvgAT", "AvgWS", "AWD"]);
        let err = WindColumns::available(Site::Farm, &cols).unwrap_err();
        match err {
            ProcessingError::MissingColumn { site, candidates } => {
                assert_eq!(site, "Farm");
                assert!(candidates.contains("AvgWS/AvgWD"));
                assert!(candidates.contains("AWS/AWD"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_map_builds_observation() {
        let table = ObservationTable::with_rows(
            columns(&[
                "RECORD", "AvgAT", "AvgRH", "AvgWS", "AvgWD", "AvgBP", "AvgSR", "Batt",
            ]),
            vec![sample_row()],
        )
        .unwrap();

        let map = ColumnMap::resolve(Site::Farm, &table).unwrap();
        let obs = map.observation(&table.rows()[0]).unwrap();

        assert_eq!(obs.air_temp_c, 30.0);
        assert_eq!(obs.relative_humidity_pct, 60.0);
        assert_eq!(obs.wind_speed_ms, 4.0);
        assert_eq!(obs.wind_dir_deg, 180.0);
        assert_eq!(obs.barometric_pressure_hpa, 1005.0);
        assert_eq!(obs.solar_radiation_wm2, Some(850.0));
        assert_eq!(obs.battery_v, Some(13.1));
        assert!((obs.air_temp_f() - 86.0).abs() < 1e-9);
        assert!((obs.relative_humidity_fraction() - 0.6).abs() < 1e-12);
        assert!(obs.validate().is_ok());
    }

    #[test]
    fn test_column_map_optional_columns() {
        let table = ObservationTable::new(columns(&["AvgAT", "AvgRH", "AWS", "AWD", "AvgBP"]));
        let map = ColumnMap::resolve(Site::Gardens, &table).unwrap();
        assert_eq!(map.wind_columns()[0].speed, "AWS");
        assert!(map.solar_radiation.is_none());
        assert!(map.battery.is_none());
    }

    #[test]
    fn test_wind_taken_per_row_across_schemes() {
        let ts = sample_row().timestamp;
        let table = ObservationTable::with_rows(
            columns(&["AvgAT", "AvgRH", "AvgWS", "AvgWD", "AvgBP", "AWS", "AWD"]),
            vec![
                TableRow::new(
                    ts,
                    vec![Some(20.0), Some(50.0), Some(3.0), Some(90.0), Some(1010.0), None, None],
                ),
                TableRow::new(
                    ts + chrono::Duration::minutes(10),
                    vec![Some(21.0), Some(49.0), None, None, Some(1010.0), Some(5.0), Some(270.0)],
                ),
                TableRow::new(
                    ts + chrono::Duration::minutes(20),
                    vec![Some(21.0), None, Some(3.0), Some(90.0), Some(1010.0), None, None],
                ),
            ],
        )
        .unwrap();

        let map = ColumnMap::resolve(Site::Farm, &table).unwrap();
        let speeds: Vec<&str> = map.wind_columns().iter().map(|w| w.speed).collect();
        assert_eq!(speeds, vec!["AvgWS", "AWS"]);

        let first = map.observation(&table.rows()[0]).unwrap();
        assert_eq!((first.wind_speed_ms, first.wind_dir_deg), (3.0, 90.0));
        let second = map.observation(&table.rows()[1]).unwrap();
        assert_eq!((second.wind_speed_ms, second.wind_dir_deg), (5.0, 270.0));

        // No humidity on the last row
        assert!(map.observation(&table.rows()[2]).is_none());
        assert_eq!(map.observations(&table).len(), 2);
    }

    #[test]
    fn test_column_map_missing_pressure() {
        let table = ObservationTable::new(columns(&["AvgAT", "AvgRH", "AWS", "AWD"]));
        let err = ColumnMap::resolve(Site::Gardens, &table).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn { .. }));
    }

    #[test]
    fn test_observation_range_validation() {
        let mut obs = Observation {
            timestamp: sample_row().timestamp,
            air_temp_c: 25.0,
            relative_humidity_pct: 140.0,
            wind_speed_ms: 3.0,
            wind_dir_deg: 90.0,
            barometric_pressure_hpa: 1010.0,
            solar_radiation_wm2: None,
            battery_v: Some(12.8),
        };
        assert!(obs.validate().is_err());

        obs.relative_humidity_pct = 40.0;
        assert!(obs.validate().is_ok());
    }
}
