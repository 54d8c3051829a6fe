use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::calc::WindComponents;
use crate::models::{Observation, Site, WindColumns};
use crate::utils::constants::WIND_DIRECTION_BREAK_DEG;

/// An observation together with the quantities computed from it.
///
/// `None` marks a value that is not applicable for this row: heat index not
/// above ambient, wind chill not below ambient, dew point of bone-dry air, or
/// a row skipped by the wind sampling stride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    pub observation: Observation,
    pub air_temp_f: f64,
    pub relative_humidity_fraction: f64,
    pub heat_index_f: Option<f64>,
    pub wind_chill_f: Option<f64>,
    pub dewpoint_f: Option<f64>,
    pub mslp_hpa: f64,
    pub wind: Option<WindComponents>,
    /// Trailing time-windowed mean of `air_temp_f`
    pub rolling_air_temp_f: f64,
}

impl DerivedRecord {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.observation.timestamp
    }
}

/// Derived records for the trailing window of one site, ordered by timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedWindow {
    pub site: Site,
    /// Inclusive lower bound, in site-local time
    pub window_start: NaiveDateTime,
    /// Wind naming schemes found in the store, in probe order; empty when no
    /// store exists yet
    pub wind_columns: Vec<WindColumns>,
    pub records: Vec<DerivedRecord>,
}

impl DerivedWindow {
    pub fn empty(site: Site, window_start: NaiveDateTime) -> Self {
        Self {
            site,
            window_start,
            wind_columns: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.timestamp())
    }

    /// Rows that carry a wind barb sample
    pub fn wind_samples(&self) -> Vec<(NaiveDateTime, WindComponents)> {
        self.records
            .iter()
            .filter_map(|r| r.wind.map(|w| (r.timestamp(), w)))
            .collect()
    }

    /// Indices where the direction series wraps through north, so a line plot
    /// can be split instead of drawing a spike across the panel
    pub fn wind_direction_breaks(&self) -> Vec<usize> {
        self.records
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| {
                (pair[1].observation.wind_dir_deg - pair[0].observation.wind_dir_deg).abs()
                    > WIND_DIRECTION_BREAK_DEG
            })
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn summary(&self) -> WindowSummary {
        let temps = self.records.iter().map(|r| r.air_temp_f);
        WindowSummary {
            site: self.site,
            rows: self.records.len(),
            first: self.records.first().map(|r| r.timestamp()),
            last: self.latest_timestamp(),
            min_temp_f: temps.clone().reduce(f64::min),
            max_temp_f: temps.reduce(f64::max),
            latest: self.records.last().cloned(),
            wind_samples: self.records.iter().filter(|r| r.wind.is_some()).count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowSummary {
    pub site: Site,
    pub rows: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub min_temp_f: Option<f64>,
    pub max_temp_f: Option<f64>,
    pub latest: Option<DerivedRecord>,
    pub wind_samples: usize,
}

impl fmt::Display for WindowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} Site ===", self.site)?;
        writeln!(f, "Rows in window: {}", self.rows)?;

        let (Some(first), Some(last), Some(latest)) = (self.first, self.last, &self.latest) else {
            return writeln!(f, "No observations in window");
        };

        writeln!(f, "Span: {} to {}", first, last)?;
        if let (Some(min), Some(max)) = (self.min_temp_f, self.max_temp_f) {
            writeln!(f, "Temperature range: {:.1}°F to {:.1}°F", min, max)?;
        }
        writeln!(
            f,
            "Latest: {:.1}°F, MSLP {:.1} hPa",
            latest.air_temp_f, latest.mslp_hpa
        )?;
        if let Some(dp) = latest.dewpoint_f {
            writeln!(f, "Dew point: {:.1}°F", dp)?;
        }
        if let Some(hi) = latest.heat_index_f {
            writeln!(f, "Heat index: {:.1}°F", hi)?;
        }
        if let Some(wc) = latest.wind_chill_f {
            writeln!(f, "Wind chill: {:.1}°F", wc)?;
        }
        writeln!(f, "Rolling mean temperature: {:.1}°F", latest.rolling_air_temp_f)?;
        write!(f, "Wind barb samples: {}", self.wind_samples)
    }
}
