//! Category tiles for the home page.

use serde::{Deserialize, Serialize};

use doorstep_core::CategoryId;

/// How many category tiles the home page shows.
pub const CATEGORY_LIMIT: usize = 12;

/// A service category as the remote API reports it.
///
/// Decoded leniently: inactive flags and ordering are optional in the
/// API response and default to active / order 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub order: i64,
}

fn default_active() -> bool {
    true
}

/// Curate raw categories for display: drop inactive ones, sort ascending
/// by `order` (stable, so equal orders keep API order), cap at
/// [`CATEGORY_LIMIT`].
pub fn curate(mut categories: Vec<Category>) -> Vec<Category> {
    categories.retain(|c| c.is_active);
    categories.sort_by_key(|c| c.order);
    categories.truncate(CATEGORY_LIMIT);
    categories
}
