use csv::Writer;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::models::DerivedWindow;
use crate::utils::constants::TIMESTAMP_FORMAT;
use crate::writers::atomic::write_atomic;

const DERIVED_HEADER: [&str; 15] = [
    "timestamp",
    "air_temp_f",
    "relative_humidity",
    "dewpoint_f",
    "heat_index_f",
    "wind_chill_f",
    "rolling_air_temp_f",
    "wind_speed_ms",
    "wind_dir_deg",
    "wind_u_kt",
    "wind_v_kt",
    "mslp_hpa",
    "solar_radiation_wm2",
    "battery_v",
    "wind_direction_break",
];

/// Exports a derived window as the chart-ready table the renderer reads.
/// Not-applicable values are written as empty cells.
pub struct DerivedWriter {
    precision: usize,
}

impl DerivedWriter {
    pub fn new() -> Self {
        Self { precision: 3 }
    }

    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    pub fn write(&self, window: &DerivedWindow, path: &Path) -> Result<()> {
        let breaks = window.wind_direction_breaks();

        write_atomic(path, |out| {
            let mut writer = Writer::from_writer(out);
            writer.write_record(DERIVED_HEADER)?;

            for (i, record) in window.records.iter().enumerate() {
                let obs = &record.observation;
                let wind = record.wind;
                let row = [
                    obs.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    self.number(record.air_temp_f),
                    self.number(record.relative_humidity_fraction),
                    self.optional(record.dewpoint_f),
                    self.optional(record.heat_index_f),
                    self.optional(record.wind_chill_f),
                    self.number(record.rolling_air_temp_f),
                    self.number(obs.wind_speed_ms),
                    self.number(obs.wind_dir_deg),
                    self.optional(wind.map(|w| w.u_kt)),
                    self.optional(wind.map(|w| w.v_kt)),
                    self.number(record.mslp_hpa),
                    self.optional(obs.solar_radiation_wm2),
                    self.optional(obs.battery_v),
                    breaks.contains(&i).to_string(),
                ];
                writer.write_record(&row)?;
            }

            writer.flush()?;
            Ok(())
        })?;

        info!(
            site = %window.site,
            rows = window.len(),
            path = %path.display(),
            "Wrote derived window"
        );
        Ok(())
    }

    fn number(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }

    fn optional(&self, value: Option<f64>) -> String {
        value.map(|v| self.number(v)).unwrap_or_default()
    }
}

impl Default for DerivedWriter {
    fn default() -> Self {
        Self::new()
    }
}
