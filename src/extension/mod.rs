//! Extension metadata loading.

pub mod metadata;

pub use metadata::Metadata;
