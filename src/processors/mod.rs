pub mod derivation;
pub mod ingestor;
pub mod integrity_checker;
pub mod site_processor;

pub use derivation::{
    derive_records, mask_heat_index, mask_wind_chill, rolling_mean, DerivationPipeline,
};
pub use ingestor::{merge_tables, IngestReport, Ingestor, MergeStats};
pub use integrity_checker::{IntegrityChecker, IntegrityReport, Violation, ViolationType};
pub use site_processor::{CycleReport, SiteProcessor};
