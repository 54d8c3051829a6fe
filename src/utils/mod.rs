pub mod constants;
pub mod filename;

pub use constants::*;
pub use filename::{derived_path, image_path, run_metadata_filename, store_path};
