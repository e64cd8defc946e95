//! `doorstep-catalog` — read model over the remote service catalog.
//!
//! The storefront home page renders curated category tiles and several
//! service rails. The remote API returns flat lists; everything this
//! crate does (curation, keyword bucketing, rail capping) is pure and
//! deterministic so it can be tested without a network.

pub mod categorize;
pub mod category;
pub mod service;

pub use categorize::{CategoryBuckets, bucketize, matches_keywords, others};
pub use category::{Category, curate};
pub use service::{CatalogError, CatalogSource, Service, ServiceQuery};
