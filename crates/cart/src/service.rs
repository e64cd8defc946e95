//! The injectable cart handle shared by pages.
//!
//! Pages never hold a private cart copy; they receive an
//! `Arc<CartService>` and go through its operations. A single mutex
//! serializes every mutation, so the read-modify-write of the persisted
//! snapshot cannot interleave and the merge-by-id invariant survives
//! concurrent callers.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use doorstep_catalog::Service;
use doorstep_core::{DomainError, DomainResult, ServiceId};
use doorstep_events::{EventBus, InMemoryEventBus, Subscription, execute};
use doorstep_storage::{KeyValueStore, keys, load, save};

use crate::cart::{AddItem, Cart, CartCommand, CartEvent, CartLine, Clear, RemoveItem, SetQuantity};

struct Inner {
    cart: Cart,
    /// Snapshot writes are suppressed until the one-time initial load,
    /// so an empty pre-load cart never clobbers a stored one.
    loaded: bool,
}

pub struct CartService {
    inner: Mutex<Inner>,
    store: Arc<dyn KeyValueStore>,
    bus: InMemoryEventBus<CartEvent>,
}

impl CartService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cart: Cart::empty(),
                loaded: false,
            }),
            store,
            bus: InMemoryEventBus::new(),
        }
    }

    /// One-time initial load of the persisted snapshot.
    ///
    /// A missing or corrupt snapshot leaves the cart empty; the consumer
    /// never sees a failure. Calling again after the first load is a
    /// no-op.
    pub fn load(&self) -> DomainResult<()> {
        let mut inner = self.lock()?;
        if inner.loaded {
            return Ok(());
        }

        if let Some(lines) = load::<Vec<CartLine>>(self.store.as_ref(), keys::CART) {
            inner.cart = Cart::from_snapshot(lines);
        }
        inner.loaded = true;

        tracing::debug!(lines = inner.cart.lines().len(), "cart loaded");
        Ok(())
    }

    /// Add one unit of `service`, merging by id.
    pub fn add_item(&self, service: &Service) -> DomainResult<()> {
        self.mutate(CartCommand::AddItem(AddItem {
            service: service.clone(),
            occurred_at: Utc::now(),
        }))
    }

    /// Drop the line for `service_id`; no-op if absent.
    pub fn remove_item(&self, service_id: &ServiceId) -> DomainResult<()> {
        self.mutate(CartCommand::RemoveItem(RemoveItem {
            service_id: service_id.clone(),
            occurred_at: Utc::now(),
        }))
    }

    /// Set a line's quantity exactly; non-positive removes the line.
    pub fn set_quantity(&self, service_id: &ServiceId, quantity: i64) -> DomainResult<()> {
        self.mutate(CartCommand::SetQuantity(SetQuantity {
            service_id: service_id.clone(),
            quantity,
            occurred_at: Utc::now(),
        }))
    }

    /// Empty the cart.
    pub fn clear(&self) -> DomainResult<()> {
        self.mutate(CartCommand::Clear(Clear {
            occurred_at: Utc::now(),
        }))
    }

    pub fn lines(&self) -> DomainResult<Vec<CartLine>> {
        Ok(self.lock()?.cart.snapshot())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.lock()?.cart.is_empty())
    }

    pub fn total_items(&self) -> DomainResult<u32> {
        Ok(self.lock()?.cart.total_items())
    }

    pub fn total_price(&self) -> DomainResult<f64> {
        Ok(self.lock()?.cart.total_price())
    }

    /// Observe cart changes (badge counters, other pages).
    pub fn subscribe(&self) -> Subscription<CartEvent> {
        self.bus.subscribe()
    }

    /// Hand the cart to the checkout flow.
    ///
    /// Writes the transfer snapshot and returns the checkout route; an
    /// empty cart hands off nothing.
    pub fn begin_checkout(&self) -> DomainResult<Option<String>> {
        let inner = self.lock()?;
        if inner.cart.is_empty() {
            return Ok(None);
        }

        save(self.store.as_ref(), keys::CHECKOUT_CART, &inner.cart.snapshot());
        Ok(Some("/checkout".to_owned()))
    }

    fn mutate(&self, command: CartCommand) -> DomainResult<()> {
        let mut inner = self.lock()?;

        let events = execute(&mut inner.cart, &command)?;
        if events.is_empty() {
            return Ok(());
        }

        if inner.loaded {
            save(self.store.as_ref(), keys::CART, &inner.cart.snapshot());
        }

        for event in events {
            if let Err(e) = self.bus.publish(event) {
                tracing::warn!(error = ?e, "cart event publish failed");
            }
        }

        Ok(())
    }

    fn lock(&self) -> DomainResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| DomainError::invariant("cart lock poisoned"))
    }
}
