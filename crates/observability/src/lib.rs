//! `doorstep-observability` — shared tracing/logging setup.

pub mod tracing;

pub use tracing::init;
