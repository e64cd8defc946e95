//! Geocoder port and wire shapes.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Geocoder lookup failure. Never fatal to the caller; every consumer
/// has a local fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GeocodeError {
    pub message: String,
}

impl GeocodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Structured address components of a reverse-geocode result.
///
/// All optional; the formatter joins whichever are present, in this
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressComponents {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub residential: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

/// Reverse-geocode result: a ready-made display string and/or the
/// structured components, either of which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub display_name: Option<String>,
    pub address: Option<AddressComponents>,
}

/// One forward-geocode candidate. The collaborator reports coordinates
/// as strings; mapping to numbers happens in the suggestion flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// External geocoding collaborator; implemented by the HTTP adapter.
#[async_trait]
pub trait GeocodeApi: Send + Sync {
    /// Coordinates → address detail.
    async fn reverse(&self, lat: f64, lng: f64) -> Result<ReverseGeocodeResponse, GeocodeError>;

    /// Free-text query → up to `limit` candidates.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, GeocodeError>;
}
