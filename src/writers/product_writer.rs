use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::Site;
use crate::utils::run_metadata_filename;
use crate::writers::atomic::write_atomic;

const VALID_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// Static description of a chart product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDescriptor {
    pub product_id: u32,
    pub product_description: String,
    pub product_path: String,
    pub product_reload_time: u64,
    pub last_reload_time: String,
    pub is_forecast: bool,
    #[serde(rename = "isGIS")]
    pub is_gis: bool,
    pub file_extension: String,
}

/// One frame of a product run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDescriptor {
    pub fhour: u32,
    pub filename: String,
    pub valid: String,
    pub gis_info: Option<[String; 2]>,
}

/// A product run: the frames valid at one time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDescriptor {
    pub product_id: u32,
    pub valid_time: String,
    pub reload_interval: u64,
    pub total_frame_count: usize,
    pub frames: Vec<FrameDescriptor>,
}

/// Files written for one publication
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedProduct {
    pub product_file: PathBuf,
    pub run_file: PathBuf,
}

/// Writes the JSON descriptors an image catalog service uses to find and
/// reload a site's chart.
///
/// ```text
/// <metadata_dir>/products/<productId>.json
/// <metadata_dir>/products/<productId>/<YYYYMMDDHHMM>.json
/// ```
pub struct ProductPublisher {
    metadata_dir: PathBuf,
    reload_interval_secs: u64,
}

impl ProductPublisher {
    pub fn new(metadata_dir: impl Into<PathBuf>, reload_interval_secs: u64) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            reload_interval_secs,
        }
    }

    /// Publish `image_path` as the site's product valid at `valid_time`
    /// (site-local logger time). Skipped when the image does not exist.
    pub fn publish(
        &self,
        site: Site,
        valid_time: NaiveDateTime,
        image_path: &Path,
    ) -> Result<Option<PublishedProduct>> {
        if !image_path.exists() {
            warn!(
                site = %site,
                image = %image_path.display(),
                "Image not found, skipping product metadata"
            );
            return Ok(None);
        }

        let meta = site.metadata();
        let valid_utc = meta.local_to_utc(valid_time);
        let valid = valid_utc.format(VALID_TIME_FORMAT).to_string();

        let products_dir = self.metadata_dir.join("products");
        let product_file = products_dir.join(format!("{}.json", meta.product_id));
        let run_file = products_dir
            .join(meta.product_id.to_string())
            .join(run_metadata_filename(valid_utc.naive_utc()));

        let product = ProductDescriptor {
            product_id: meta.product_id,
            product_description: meta.product_description.to_string(),
            product_path: format!("products/{}", meta.product_id),
            product_reload_time: self.reload_interval_secs,
            last_reload_time: Utc::now().format(VALID_TIME_FORMAT).to_string(),
            is_forecast: false,
            is_gis: false,
            file_extension: "png".to_string(),
        };

        let filename = image_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| image_path.display().to_string());

        let run = RunDescriptor {
            product_id: meta.product_id,
            valid_time: valid.clone(),
            reload_interval: self.reload_interval_secs,
            total_frame_count: 1,
            frames: vec![FrameDescriptor {
                fhour: 0,
                filename,
                valid,
                gis_info: None,
            }],
        };

        write_json(&product_file, &product)?;
        write_json(&run_file, &run)?;

        info!(
            site = %site,
            product_id = meta.product_id,
            valid_time = %run.valid_time,
            "Published product metadata"
        );

        Ok(Some(PublishedProduct {
            product_file,
            run_file,
        }))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |out| {
        serde_json::to_writer_pretty(&mut *out, value)?;
        out.write_all(b"\n")?;
        Ok(())
    })
}
