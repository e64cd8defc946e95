//! Services and the catalog fetch port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use doorstep_core::{ServiceId, VendorId};

/// A bookable service as the remote API reports it.
///
/// Field names vary across API endpoints (`name` vs `serviceName`), so
/// decoding accepts both. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<VendorId>,
    #[serde(alias = "serviceName")]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub is_premium: bool,
}

/// Query parameters for `GET /services`.
///
/// Built through the named constructors so each home-page rail reads as
/// what it is, not a bag of flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceQuery {
    pub popular: bool,
    pub premium: bool,
    pub sort_by: Option<String>,
    pub limit: Option<u32>,
}

impl ServiceQuery {
    /// All services, up to `limit`.
    pub fn all(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// The popular rail.
    pub fn popular(limit: u32) -> Self {
        Self {
            popular: true,
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// The premium rail.
    pub fn premium(limit: u32) -> Self {
        Self {
            premium: true,
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Trending/most-booked rails: server-side sort by booking count.
    pub fn by_booking_count(limit: u32) -> Self {
        Self {
            sort_by: Some("bookingCount".to_owned()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Render as URL query pairs for the HTTP adapter.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.popular {
            pairs.push(("popular", "true".to_owned()));
        }
        if self.premium {
            pairs.push(("premium", "true".to_owned()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// Catalog fetch failure, carrying the message shown next to the empty
/// section. Transient by design: the caller substitutes an empty list
/// and the page stays usable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CatalogError {
    pub message: String,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Remote catalog port; implemented by the HTTP client adapter.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<super::Category>, CatalogError>;
    async fn fetch_services(&self, query: &ServiceQuery) -> Result<Vec<Service>, CatalogError>;
}
