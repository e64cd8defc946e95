//! Locally stored session: access token + cached profile.

use std::sync::Arc;

use doorstep_storage::{KeyValueStore, keys, load, save};

use crate::profile::UserProfile;

/// Handle over the stored session.
///
/// The token is stored raw (it is opaque text, not JSON); the profile
/// goes through the typed layer. Read failures count as "no session".
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        match self.store.get(keys::ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "token read failed");
                None
            }
        }
    }

    pub fn profile(&self) -> Option<UserProfile> {
        load(self.store.as_ref(), keys::USER_PROFILE)
    }

    pub fn store_token(&self, token: &str) {
        if let Err(e) = self.store.put(keys::ACCESS_TOKEN, token) {
            tracing::warn!(error = %e, "token write failed");
        }
    }

    pub fn store_profile(&self, profile: &UserProfile) {
        save(self.store.as_ref(), keys::USER_PROFILE, profile);
    }

    /// Both the token and the cached profile must be present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some() && self.profile().is_some()
    }

    /// Drop the whole session (logout).
    pub fn clear(&self) {
        for key in [keys::ACCESS_TOKEN, keys::USER_PROFILE] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "session clear failed");
            }
        }
    }
}
