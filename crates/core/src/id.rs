//! Strongly-typed identifiers used across the domain.
//!
//! The remote storefront API assigns ids server-side and treats them as
//! opaque strings, so these newtypes wrap `String` rather than a UUID.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a bookable service in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

/// Identifier of a vendor. Optional on bookings; the server assigns one
/// when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorId(String);

/// Identifier of a service category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

macro_rules! impl_opaque_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a server-assigned identifier without validating it.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": empty")));
                }
                Ok(Self(s.to_owned()))
            }
        }
    };
}

impl_opaque_id!(ServiceId, "ServiceId");
impl_opaque_id!(VendorId, "VendorId");
impl_opaque_id!(CategoryId, "CategoryId");
