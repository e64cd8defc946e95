//! Cached user profile, used to prefill checkout contact fields.

use serde::{Deserialize, Serialize};

/// The slice of `GET /auth/me` the storefront cares about.
///
/// Decoded leniently: missing fields default to empty, unknown fields
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Wire shape of `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
}
