use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::models::Site;

/// Site store: `<input_dir>/<Site>.csv`
pub fn store_path(input_dir: &Path, site: Site) -> PathBuf {
    input_dir.join(format!("{}.csv", site.name()))
}

/// Derived window export: `<output_dir>/<Site>_derived.csv`
pub fn derived_path(output_dir: &Path, site: Site) -> PathBuf {
    output_dir.join(format!("{}_derived.csv", site.name()))
}

/// Rendered chart: `<output_dir>/<Site>.png`
pub fn image_path(output_dir: &Path, site: Site) -> PathBuf {
    output_dir.join(format!("{}.png", site.name()))
}

/// Run descriptor name for a product valid time: `YYYYMMDDHHMM.json`
pub fn run_metadata_filename(valid_time: NaiveDateTime) -> String {
    format!("{}.json", valid_time.format("%Y%m%d%H%M"))
}
