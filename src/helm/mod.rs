//! Chart model, value overlays, rendering, and structural linting.
//!
//! This module is the "helm side" of extlint: everything needed to take a
//! chart-like extension directory plus a value overlay and turn it into
//! rendered manifest text. The convention linter in [`crate::linter`]
//! consumes these pieces but never reaches into template internals itself.

pub mod chart;
pub mod lint;
pub mod render;
pub mod values;

pub use chart::{Chart, ChartMetadata};
pub use render::render;
pub use values::ValueOptions;
