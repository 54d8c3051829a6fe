pub mod derived;
pub mod observation;
pub mod site;
pub mod table;

pub use derived::{DerivedRecord, DerivedWindow, WindowSummary};
pub use observation::{ColumnMap, Observation, WindColumns};
pub use site::{Site, SiteMetadata};
pub use table::{ObservationTable, TableRow};
