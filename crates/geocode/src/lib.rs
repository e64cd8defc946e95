//! `doorstep-geocode` — address resolution around an external geocoder.
//!
//! Wraps the reverse (coordinates → address) and forward (free text →
//! candidates) geocoding collaborator, with the formatting fallback
//! chain, the suggestion flow used by the wizard's address field, a
//! debounce primitive for keystroke-driven search, and the
//! current-location status machine.

pub mod api;
pub mod debounce;
pub mod format;
pub mod location;
pub mod suggest;

pub use api::{AddressComponents, GeocodeApi, GeocodeError, ReverseGeocodeResponse, SearchResult};
pub use debounce::Debouncer;
pub use format::{coordinate_label, format_address, resolve_address};
pub use location::{
    LocatedAddress, LocationStatus, Position, PositionError, PositionSource, acquire_location,
    clear_found,
};
pub use suggest::{AddressSuggestion, Coordinates, MIN_QUERY_LEN, search_addresses};
