//! `doorstep-events` — domain events and the pub/sub bus the session
//! engine uses to notify observers (badge counters, page views) of state
//! changes.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};

/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical lifecycle in one step:
///
/// 1. **Decide**: `aggregate.handle(command)` returns events (pure).
/// 2. **Evolve**: each event is applied via `aggregate.apply(event)`.
///
/// The emitted events are returned so the caller can persist a snapshot
/// and/or publish them on a bus.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: doorstep_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
