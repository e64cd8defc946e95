//! `doorstep-client` — HTTP adapters behind the domain ports.
//!
//! [`StorefrontClient`] implements the catalog and booking ports
//! against the storefront API; [`NominatimClient`] implements the
//! geocoding port against Nominatim. Everything above these adapters is
//! transport-agnostic.

pub mod error;
pub mod http;
pub mod nominatim;

pub use error::ClientError;
pub use http::StorefrontClient;
pub use nominatim::NominatimClient;
