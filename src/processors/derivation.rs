use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::calc::{
    altimeter_to_sea_level_pressure, dewpoint_f, heat_index_f, wind_chill_f, wind_components_kt,
};
use crate::error::Result;
use crate::models::{ColumnMap, DerivedRecord, DerivedWindow, Observation, ObservationTable, Site};
use crate::readers::StoreReader;
use crate::settings::Settings;
use crate::utils::constants::WIND_SAMPLE_STRIDE;
use crate::utils::store_path;

/// Computes the trailing window of derived quantities for a site. Never
/// modifies the store.
pub struct DerivationPipeline {
    input_dir: PathBuf,
    window: Duration,
    store_reader: StoreReader,
}

impl DerivationPipeline {
    pub fn new(settings: &Settings) -> Self {
        Self::with_window(settings.input_dir.clone(), settings.window_hours)
    }

    pub fn with_window(input_dir: impl Into<PathBuf>, window_hours: i64) -> Self {
        Self {
            input_dir: input_dir.into(),
            window: Duration::hours(window_hours),
            store_reader: StoreReader::lenient(),
        }
    }

    /// Site-local wall-clock time at which the window opening at `now` starts
    pub fn window_start(&self, site: Site, now: DateTime<Utc>) -> NaiveDateTime {
        site.metadata().utc_to_local(now) - self.window
    }

    /// Derive the window ending at `now` from the site's store. A site with no
    /// store yet yields an empty window.
    pub fn derive_window(&self, site: Site, now: DateTime<Utc>) -> Result<DerivedWindow> {
        let start = self.window_start(site, now);
        let path = store_path(&self.input_dir, site);

        match self.store_reader.read(&path)? {
            Some(table) => self.derive_table(site, &table, start),
            None => {
                info!(site = %site, "No store, window is empty");
                Ok(DerivedWindow::empty(site, start))
            }
        }
    }

    /// Derive from an in-memory table, keeping rows at or after `start`
    pub fn derive_table(
        &self,
        site: Site,
        table: &ObservationTable,
        start: NaiveDateTime,
    ) -> Result<DerivedWindow> {
        let columns = ColumnMap::resolve(site, table)?;
        let wind_columns = columns.wind_columns();
        debug!(
            site = %site,
            schemes = wind_columns.len(),
            speed = wind_columns.first().map(|w| w.speed),
            "Resolved wind columns"
        );

        let in_window: Vec<_> = table
            .rows()
            .iter()
            .filter(|row| row.timestamp >= start)
            .collect();
        let mut observations: Vec<Observation> = in_window
            .iter()
            .filter_map(|row| columns.observation(row))
            .collect();
        if observations.len() < in_window.len() {
            warn!(
                site = %site,
                skipped = in_window.len() - observations.len(),
                "Skipped rows missing required values"
            );
        }
        observations.sort_by_key(|o| o.timestamp);
        let before = observations.len();
        observations.dedup_by_key(|o| o.timestamp);
        if observations.len() < before {
            debug!(
                site = %site,
                removed = before - observations.len(),
                "Dropped duplicate timestamps in window"
            );
        }

        let records = derive_records(site, observations, self.window);

        info!(
            site = %site,
            rows = records.len(),
            window_start = %start,
            "Derived window"
        );

        Ok(DerivedWindow {
            site,
            window_start: start,
            wind_columns,
            records,
        })
    }
}

/// Apply the per-row formulas to time-ordered observations
pub fn derive_records(
    site: Site,
    observations: Vec<Observation>,
    rolling_window: Duration,
) -> Vec<DerivedRecord> {
    let elevation_m = site.metadata().elevation_m;
    let temps_f: Vec<f64> = observations.iter().map(Observation::air_temp_f).collect();
    let times: Vec<NaiveDateTime> = observations.iter().map(|o| o.timestamp).collect();
    let rolling = rolling_mean(&times, &temps_f, rolling_window);

    observations
        .into_iter()
        .enumerate()
        .map(|(i, observation)| {
            let air_temp_f = temps_f[i];
            let rh = observation.relative_humidity_fraction();

            let heat_index = mask_heat_index(heat_index_f(air_temp_f, rh), air_temp_f);
            let wind_chill =
                mask_wind_chill(wind_chill_f(air_temp_f, observation.wind_speed_ms), air_temp_f);
            let wind = (i % WIND_SAMPLE_STRIDE == 0).then(|| {
                wind_components_kt(observation.wind_speed_ms, observation.wind_dir_deg)
            });

            DerivedRecord {
                air_temp_f,
                relative_humidity_fraction: rh,
                heat_index_f: heat_index,
                wind_chill_f: wind_chill,
                dewpoint_f: dewpoint_f(air_temp_f, rh),
                mslp_hpa: altimeter_to_sea_level_pressure(
                    observation.barometric_pressure_hpa,
                    elevation_m,
                    air_temp_f,
                ),
                wind,
                rolling_air_temp_f: rolling[i],
                observation,
            }
        })
        .collect()
}

/// Heat index is only reported when it feels hotter than the air
pub fn mask_heat_index(heat_index_f: Option<f64>, air_temp_f: f64) -> Option<f64> {
    heat_index_f.filter(|&hi| hi > air_temp_f)
}

/// Wind chill is only reported when it feels colder than the air
pub fn mask_wind_chill(wind_chill_f: Option<f64>, air_temp_f: f64) -> Option<f64> {
    wind_chill_f.filter(|&wc| wc < air_temp_f)
}

/// Mean of `values` over the half-open interval `(t - window, t]` ending at
/// each timestamp. `times` must be ascending.
pub fn rolling_mean(times: &[NaiveDateTime], values: &[f64], window: Duration) -> Vec<f64> {
    let mut means = Vec::with_capacity(values.len());
    let mut left = 0usize;
    let mut sum = 0.0;

    for (right, &value) in values.iter().enumerate() {
        sum += value;
        while times[right] - times[left] >= window {
            sum -= values[left];
            left += 1;
        }
        means.push(sum / (right - left + 1) as f64);
    }

    means
}
