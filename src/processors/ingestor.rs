use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{ObservationTable, Site};
use crate::readers::{FeedReader, ParseReport, StoreReader};
use crate::settings::Settings;
use crate::utils::store_path;
use crate::writers::StoreWriter;

/// Row accounting for one merge of a batch into a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Unique store rows before the batch was added
    pub existing_rows: usize,
    pub batch_rows: usize,
    pub duplicate_rows: usize,
    pub total_rows: usize,
    /// The store itself was out of order or held duplicate timestamps
    pub store_repaired: bool,
}

impl MergeStats {
    pub fn added_rows(&self) -> usize {
        self.total_rows.saturating_sub(self.existing_rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub site: Site,
    pub parse: ParseReport,
    pub merge: MergeStats,
    pub created: bool,
    pub written: bool,
}

/// Union `batch` into `store` keyed by timestamp. The store's rows win over
/// batch rows with the same timestamp; the result is sorted ascending with
/// unique timestamps. Columns are the union of both tables, and a row has no
/// value for columns its source lacked.
pub fn merge_tables(
    store: Option<ObservationTable>,
    batch: ObservationTable,
) -> (ObservationTable, MergeStats) {
    let batch_rows = batch.len();

    let (mut merged, existing_rows, store_repaired) = match store {
        Some(mut store) => {
            let store_repaired = !store.is_sorted_unique();
            if store_repaired {
                let removed = store.sort_and_dedup();
                warn!(removed, "Store was unsorted or held duplicate timestamps");
            }

            let added = batch.extra_columns(store.columns());
            if !added.is_empty() {
                info!(columns = %added.join(","), "Adding new columns to store");
            }
            let missing = store.extra_columns(batch.columns());
            if !missing.is_empty() {
                debug!(columns = %missing.join(","), "Batch lacks stored columns");
            }

            let existing = store.len();
            store.extend(batch);
            (store, existing, store_repaired)
        }
        None => (batch, 0, false),
    };

    let duplicate_rows = merged.sort_and_dedup();

    let stats = MergeStats {
        existing_rows,
        batch_rows,
        duplicate_rows,
        total_rows: merged.len(),
        store_repaired,
    };
    (merged, stats)
}

/// Merges fetched feed batches into the durable per-site stores
pub struct Ingestor {
    input_dir: PathBuf,
    feed_reader: FeedReader,
    store_reader: StoreReader,
    store_writer: StoreWriter,
}

impl Ingestor {
    pub fn new(settings: &Settings) -> Self {
        Self::with_input_dir(settings.input_dir.clone())
    }

    pub fn with_input_dir(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            feed_reader: FeedReader::new(),
            store_reader: StoreReader::new(),
            store_writer: StoreWriter::new(),
        }
    }

    /// Parse raw feed text and merge it into the site's store
    pub fn ingest(&self, site: Site, raw_feed: &str) -> Result<IngestReport> {
        let batch = self.feed_reader.parse(raw_feed)?;
        if batch.report.dropped_rows > 0 {
            debug!(
                site = %site,
                dropped = batch.report.dropped_rows,
                "Dropped malformed feed rows"
            );
        }

        let mut report = self.ingest_table(site, batch.table)?;
        report.parse = batch.report;
        Ok(report)
    }

    /// Merge an already-parsed batch into the site's store
    pub fn ingest_table(&self, site: Site, batch: ObservationTable) -> Result<IngestReport> {
        let path = store_path(&self.input_dir, site);
        let store = self.store_reader.read(&path)?;
        let created = store.is_none();
        let parse = ParseReport {
            data_rows: batch.len(),
            parsed_rows: batch.len(),
            dropped_rows: 0,
        };

        let (merged, merge) = merge_tables(store, batch);

        let written = if merged.is_empty() {
            warn!(site = %site, "Feed produced no usable rows, store not created");
            false
        } else if !created && merge.added_rows() == 0 && !merge.store_repaired {
            debug!(site = %site, "No new rows, store unchanged");
            false
        } else {
            self.store_writer.write(&merged, &path)?;
            true
        };

        info!(
            site = %site,
            existing = merge.existing_rows,
            added = merge.added_rows(),
            duplicates = merge.duplicate_rows,
            total = merge.total_rows,
            "Ingested batch"
        );

        Ok(IngestReport {
            site,
            parse,
            merge,
            created: created && written,
            written,
        })
    }
}
