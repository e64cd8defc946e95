//! `doorstep-auth` — session state and the protected-route guard.
//!
//! Intentionally decoupled from HTTP: token issuance/refresh lives on
//! the server; this crate only reads and writes the locally stored
//! session and decides whether a protected route may render.

pub mod guard;
pub mod profile;
pub mod session;

pub use guard::{RouteDecision, guard};
pub use profile::{MeResponse, UserProfile};
pub use session::Session;
