//! Address formatting fallback chain.

use crate::api::{AddressComponents, GeocodeApi, ReverseGeocodeResponse};

/// The last-resort address label: the raw coordinates.
pub fn coordinate_label(lat: f64, lng: f64) -> String {
    format!("{lat:.4}, {lng:.4}")
}

fn join_components(addr: &AddressComponents) -> String {
    let parts = [
        &addr.house_number,
        &addr.road,
        &addr.residential,
        &addr.neighbourhood,
        &addr.suburb,
        &addr.village,
        &addr.town,
        &addr.city,
        &addr.county,
        &addr.district,
        &addr.state,
        &addr.postcode,
        &addr.country,
    ];

    parts
        .into_iter()
        .filter_map(|p| p.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pick the best human-readable address from a reverse-geocode result.
///
/// Preference order: the geocoder's `display_name`, then the joined
/// structured components, then the coordinate label.
pub fn format_address(response: &ReverseGeocodeResponse, lat: f64, lng: f64) -> String {
    if let Some(display_name) = &response.display_name
        && !display_name.is_empty()
    {
        return display_name.clone();
    }

    if let Some(addr) = &response.address {
        let joined = join_components(addr);
        if !joined.is_empty() {
            return joined;
        }
    }

    coordinate_label(lat, lng)
}

/// Reverse-resolve coordinates to a display address.
///
/// A lookup failure degrades to the coordinate label; it never surfaces
/// as an error.
pub async fn resolve_address(api: &dyn GeocodeApi, lat: f64, lng: f64) -> String {
    match api.reverse(lat, lng).await {
        Ok(response) => format_address(&response, lat, lng),
        Err(e) => {
            tracing::warn!(error = %e, "address lookup failed");
            coordinate_label(lat, lng)
        }
    }
}
