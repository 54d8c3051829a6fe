use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{error, info};

use crate::error::Result;
use crate::models::{DerivedWindow, Site};
use crate::processors::{DerivationPipeline, IngestReport, Ingestor};
use crate::readers::FeedClient;
use crate::settings::Settings;
use crate::writers::{DerivedWriter, ProductPublisher, PublishedProduct};

/// What one site's cycle produced
#[derive(Debug)]
pub struct CycleReport {
    pub site: Site,
    pub ingest: IngestReport,
    pub window: DerivedWindow,
    pub derived_path: PathBuf,
    pub published: Option<PublishedProduct>,
}

/// Runs fetch, ingest, derive, export and publish for each site in turn
pub struct SiteProcessor {
    settings: Settings,
    client: FeedClient,
    ingestor: Ingestor,
    pipeline: DerivationPipeline,
    derived_writer: DerivedWriter,
    publisher: ProductPublisher,
}

impl SiteProcessor {
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self {
            client: FeedClient::new(&settings)?,
            ingestor: Ingestor::new(&settings),
            pipeline: DerivationPipeline::new(&settings),
            derived_writer: DerivedWriter::new(),
            publisher: ProductPublisher::new(
                settings.metadata_dir.clone(),
                settings.reload_interval_secs,
            ),
            settings,
        })
    }

    /// Full cycle for one site, fetching its feed over the network
    pub async fn process_site(&self, site: Site, now: DateTime<Utc>) -> Result<CycleReport> {
        let raw = self.client.fetch(site).await?;
        self.process_feed(site, &raw, now)
    }

    /// Cycle for one site from feed text already in hand
    pub fn process_feed(
        &self,
        site: Site,
        raw_feed: &str,
        now: DateTime<Utc>,
    ) -> Result<CycleReport> {
        let ingest = self.ingestor.ingest(site, raw_feed)?;
        let window = self.pipeline.derive_window(site, now)?;

        let derived_path = self.settings.derived_path(site);
        self.derived_writer.write(&window, &derived_path)?;

        let published = match window.latest_timestamp() {
            Some(valid_time) => {
                self.publisher
                    .publish(site, valid_time, &self.settings.image_path(site))?
            }
            None => None,
        };

        Ok(CycleReport {
            site,
            ingest,
            window,
            derived_path,
            published,
        })
    }

    /// Process `sites` sequentially. A failing site is logged and does not
    /// stop the others.
    pub async fn process_all(
        &self,
        sites: &[Site],
        now: DateTime<Utc>,
    ) -> Vec<(Site, Result<CycleReport>)> {
        let mut outcomes = Vec::with_capacity(sites.len());

        for &site in sites {
            let outcome = self.process_site(site, now).await;
            match &outcome {
                Ok(report) => info!(
                    site = %site,
                    added = report.ingest.merge.added_rows(),
                    window_rows = report.window.len(),
                    published = report.published.is_some(),
                    "Site cycle complete"
                ),
                Err(e) => error!(site = %site, error = %e, "Site cycle failed"),
            }
            outcomes.push((site, outcome));
        }

        outcomes
    }
}
