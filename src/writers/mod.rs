pub mod atomic;
pub mod derived_writer;
pub mod product_writer;
pub mod store_writer;

pub use atomic::write_atomic;
pub use derived_writer::DerivedWriter;
pub use product_writer::{
    FrameDescriptor, ProductDescriptor, ProductPublisher, PublishedProduct, RunDescriptor,
};
pub use store_writer::StoreWriter;
