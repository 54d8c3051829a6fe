use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::Site;
use crate::settings::Settings;

/// Pulls the most recent rows of a site's logger table from the data server.
/// One GET per call; a failed request is returned as-is with no retry.
pub struct FeedClient {
    client: Client,
    base_url: String,
    records: u32,
}

impl FeedClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.feed_base_url.clone(),
            records: settings.feed_records,
        })
    }

    /// DataQuery URL for the site's table in TOA5 format
    pub fn feed_url(&self, site: Site) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!(
            "{}/?command=DataQuery&uri=Server:{}&format=toa5&mode=most-recent&p1={}&p2=",
            base,
            site.metadata().feed_table,
            self.records
        )
    }

    pub async fn fetch(&self, site: Site) -> Result<String> {
        let url = self.feed_url(site);
        debug!(site = %site, url = %url, "Requesting feed");

        let text = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        info!(site = %site, bytes = text.len(), "Fetched feed");
        Ok(text)
    }
}
