//! Event publishing/subscription abstraction (mechanics only).
//!
//! A lightweight pub/sub layer used to fan session-state changes out to
//! observers. In the storefront this replaces ambient shared state: pages
//! that care about the cart subscribe to its events instead of polling a
//! global.
//!
//! The contract is intentionally minimal:
//!
//! - **Transport-agnostic**: in-memory channels here; nothing precludes a
//!   different transport behind the same trait.
//! - **Broadcast semantics**: each subscriber gets a copy of every
//!   published message.
//! - **No persistence**: the bus distributes, it does not store. The cart
//!   snapshot in durable storage is the source of truth.
//! - **At-least-once**: subscribers must tolerate duplicates.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription receives a copy of all events published to the bus
/// after the subscription was created. Designed for single-threaded
/// consumption; hand one subscription to one consumer.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail; failures surface to the caller, which may retry.
/// Since state is snapshotted before publication, republishing is safe.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
