//! `doorstep-cart` — the cart aggregate and its owning service.
//!
//! The cart is the only piece of session state shared across pages. The
//! aggregate in [`cart`] is pure (commands in, events out); the
//! [`service::CartService`] layers on what the pages actually need: one
//! serialized mutation path, a persisted snapshot per change, and a
//! pub/sub feed for observers.

pub mod cart;
pub mod service;

pub use cart::{AddItem, Cart, CartCommand, CartEvent, CartLine, Clear, RemoveItem, SetQuantity};
pub use service::CartService;
