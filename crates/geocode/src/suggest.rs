//! Address suggestion flow for the wizard's address field.

use serde::{Deserialize, Serialize};

use crate::api::GeocodeApi;

/// Queries shorter than this skip the network and clear suggestions.
pub const MIN_QUERY_LEN: usize = 3;

/// How many candidates to request per search.
pub const SUGGESTION_LIMIT: usize = 5;

/// Rounding applied to coordinates taken from a selected suggestion.
const COORD_DECIMALS: i32 = 6;

/// A point on the map, as the booking payload carries it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Round to six decimals (~0.1m), the precision the booking payload
    /// records.
    pub fn rounded(self) -> Self {
        let factor = 10f64.powi(COORD_DECIMALS);
        Self {
            lat: (self.lat * factor).round() / factor,
            lng: (self.lng * factor).round() / factor,
        }
    }
}

/// One selectable candidate. Ephemeral: produced by a search, consumed
/// by a selection, discarded after.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressSuggestion {
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
}

impl AddressSuggestion {
    /// What selecting this suggestion fills into the draft.
    pub fn selection(&self) -> (String, Coordinates) {
        (
            self.display_name.clone(),
            Coordinates {
                lat: self.lat,
                lng: self.lng,
            }
            .rounded(),
        )
    }
}

/// Run a forward-geocode query for the address field.
///
/// Short queries return an empty list without touching the network, and
/// so do lookup failures; the field just shows no suggestions.
/// Candidates with unparsable coordinates are skipped.
pub async fn search_addresses(api: &dyn GeocodeApi, query: &str) -> Vec<AddressSuggestion> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let results = match api.search(query, SUGGESTION_LIMIT).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(error = %e, "address search failed");
            return Vec::new();
        }
    };

    results
        .into_iter()
        .filter_map(|r| {
            let lat = r.lat.parse().ok()?;
            let lng = r.lon.parse().ok()?;
            Some(AddressSuggestion {
                display_name: r.display_name,
                lat,
                lng,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::api::{GeocodeError, ReverseGeocodeResponse, SearchResult};

    struct FakeGeocoder {
        results: Result<Vec<SearchResult>, GeocodeError>,
    }

    #[async_trait]
    impl GeocodeApi for FakeGeocoder {
        async fn reverse(
            &self,
            _lat: f64,
            _lng: f64,
        ) -> Result<ReverseGeocodeResponse, GeocodeError> {
            unimplemented!("not used in these tests")
        }

        async fn search(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<SearchResult>, GeocodeError> {
            self.results.clone()
        }
    }

    fn result(name: &str, lat: &str, lon: &str) -> SearchResult {
        SearchResult {
            display_name: name.to_owned(),
            lat: lat.to_owned(),
            lon: lon.to_owned(),
        }
    }

    #[tokio::test]
    async fn short_queries_return_nothing() {
        let api = FakeGeocoder {
            results: Ok(vec![result("MG Road", "12.97", "77.59")]),
        };
        assert!(search_addresses(&api, "MG").await.is_empty());
    }

    #[tokio::test]
    async fn query_length_counts_characters_not_bytes() {
        let api = FakeGeocoder {
            results: Ok(vec![result("MG Road", "12.97", "77.59")]),
        };

        // Two characters, six bytes.
        assert!(search_addresses(&api, "रा").await.is_empty());
        assert_eq!(search_addresses(&api, "राम").await.len(), 1);
    }

    #[tokio::test]
    async fn candidates_map_with_parsed_coordinates() {
        let api = FakeGeocoder {
            results: Ok(vec![
                result("MG Road", "12.97", "77.59"),
                result("Bad", "not-a-number", "77.59"),
            ]),
        };

        let suggestions = search_addresses(&api, "MG Road").await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].display_name, "MG Road");
        assert_eq!(suggestions[0].lat, 12.97);
    }

    #[tokio::test]
    async fn lookup_failure_degrades_to_empty() {
        let api = FakeGeocoder {
            results: Err(GeocodeError::new("boom")),
        };
        assert!(search_addresses(&api, "MG Road").await.is_empty());
    }

    #[test]
    fn selection_rounds_coordinates_to_six_decimals() {
        let suggestion = AddressSuggestion {
            display_name: "MG Road".into(),
            lat: 12.971_598_76,
            lng: 77.594_562_34,
        };

        let (address, coords) = suggestion.selection();
        assert_eq!(address, "MG Road");
        assert_eq!(coords.lat, 12.971_599);
        assert_eq!(coords.lng, 77.594_562);
    }
}
