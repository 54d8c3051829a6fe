pub mod feed_client;
pub mod feed_reader;
pub mod store_reader;

pub use feed_client::FeedClient;
pub use feed_reader::{FeedBatch, FeedReader, ParseReport};
pub use store_reader::StoreReader;
