//! `doorstep-storage` — durable local key-value persistence.
//!
//! The storefront keeps its session state (cart snapshot, access token,
//! cached profile) in a small local key-value store. The typed layer on
//! top guarantees the "never throw" contract the rest of the engine
//! relies on: corrupt or missing data reads as absent, failed writes are
//! logged and swallowed.

pub mod keys;
pub mod kv;
pub mod typed;

pub use kv::{KeyValueStore, LocalStore, MemoryStore, StorageError};
pub use typed::{load, save};
