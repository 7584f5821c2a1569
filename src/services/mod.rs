pub mod providers;

pub use providers::MetadataProvider;
