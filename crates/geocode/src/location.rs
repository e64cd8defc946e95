//! "Use my current location" flow.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::GeocodeApi;
use crate::format::resolve_address;
use crate::suggest::Coordinates;

/// Hard ceiling on position acquisition.
pub const POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the success status stays visible before auto-clearing.
pub const FOUND_CLEARS_AFTER: Duration = Duration::from_secs(3);

/// A device position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

/// Why the device could not produce a position.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    Unavailable,

    #[error("position request timed out")]
    TimedOut,
}

/// Device positioning port (the platform's geolocation facility).
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<Position, PositionError>;
}

/// User-visible phases of the current-location flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationStatus {
    #[default]
    Idle,
    /// Waiting on the device position.
    Locating,
    /// Position acquired; reverse-geocoding it.
    Resolving,
    /// Address filled in. Auto-clears after [`FOUND_CLEARS_AFTER`].
    Found,
    PermissionDenied,
    Unavailable,
    TimedOut,
}

impl LocationStatus {
    /// The inline message for this phase, if one is shown.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            LocationStatus::Idle => None,
            LocationStatus::Locating => Some("Fetching your location..."),
            LocationStatus::Resolving => Some("Getting address details..."),
            LocationStatus::Found => Some("Location found!"),
            LocationStatus::PermissionDenied => {
                Some("Location permission denied. Please enable it in your settings.")
            }
            LocationStatus::Unavailable => Some("Location unavailable. Check your network & GPS."),
            LocationStatus::TimedOut => Some("Location request timed out. Try again."),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LocationStatus::PermissionDenied | LocationStatus::Unavailable | LocationStatus::TimedOut
        )
    }
}

impl From<PositionError> for LocationStatus {
    fn from(e: PositionError) -> Self {
        match e {
            PositionError::PermissionDenied => LocationStatus::PermissionDenied,
            PositionError::Unavailable => LocationStatus::Unavailable,
            PositionError::TimedOut => LocationStatus::TimedOut,
        }
    }
}

/// The flow's successful outcome: a display address plus the raw
/// coordinates it was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedAddress {
    pub address: String,
    pub coordinates: Coordinates,
}

/// Acquire the device position and reverse-resolve it.
///
/// Status phases are reported through `on_status` as the flow moves.
/// Failures end the flow with the matching status; they are never
/// fatal to the page. Note the reverse lookup itself cannot fail here:
/// it degrades to a coordinate label inside [`resolve_address`].
pub async fn acquire_location(
    source: &dyn PositionSource,
    geocoder: &dyn GeocodeApi,
    mut on_status: impl FnMut(LocationStatus),
) -> Option<LocatedAddress> {
    on_status(LocationStatus::Locating);

    let position = match tokio::time::timeout(POSITION_TIMEOUT, source.current_position()).await {
        Ok(Ok(position)) => position,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "geolocation failed");
            on_status(e.into());
            return None;
        }
        Err(_) => {
            tracing::warn!("geolocation timed out");
            on_status(LocationStatus::TimedOut);
            return None;
        }
    };

    on_status(LocationStatus::Resolving);
    let coordinates = Coordinates {
        lat: position.lat,
        lng: position.lng,
    }
    .rounded();
    let address = resolve_address(geocoder, position.lat, position.lng).await;

    on_status(LocationStatus::Found);
    Some(LocatedAddress {
        address,
        coordinates,
    })
}

/// Hold the success status for its display window, then clear it.
///
/// Runs after a successful [`acquire_location`]; the status goes back
/// to [`LocationStatus::Idle`] once the window elapses.
pub async fn clear_found(mut on_status: impl FnMut(LocationStatus)) {
    tokio::time::sleep(FOUND_CLEARS_AFTER).await;
    on_status(LocationStatus::Idle);
}
