use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use doorstep_catalog::Service;
use doorstep_core::{Aggregate, AggregateRoot, DomainError, ServiceId};
use doorstep_events::Event;

/// One selected service with an aggregated quantity.
///
/// This doubles as the persisted snapshot line, so decoding is lenient:
/// a missing price counts as 0 and a missing quantity as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub service_id: ServiceId,
    pub service_name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartLine {
    fn from_service(service: &Service) -> Self {
        Self {
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            price: service.price,
            image_url: service.image_url.clone(),
            description: service.description.clone(),
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Aggregate root: the session cart.
///
/// There is exactly one cart per session, so the aggregate carries no
/// external identity. Invariants: at most one line per service id, every
/// quantity >= 1, insertion order preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    version: u64,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rehydrate from a persisted snapshot.
    ///
    /// The snapshot may predate this build or have been hand-edited, so
    /// invariants are re-established: non-positive quantities are
    /// dropped and duplicate ids keep their first occurrence.
    pub fn from_snapshot(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::empty();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            if cart.find(&line.service_id).is_none() {
                cart.lines.push(line);
            }
        }
        cart
    }

    /// The persisted form: the whole line list.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over all lines.
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `price * quantity` over all lines. Empty cart totals 0.
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn find(&self, id: &ServiceId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.service_id == id)
    }
}

impl AggregateRoot for Cart {
    type Id = ();

    fn id(&self) -> &Self::Id {
        &()
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: add one unit of a service (merge-by-id).
#[derive(Debug, Clone, PartialEq)]
pub struct AddItem {
    pub service: Service,
    pub occurred_at: DateTime<Utc>,
}

/// Command: drop a line entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveItem {
    pub service_id: ServiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: set a line's quantity exactly. Non-positive removes the line.
#[derive(Debug, Clone, PartialEq)]
pub struct SetQuantity {
    pub service_id: ServiceId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: empty the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Clear {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    SetQuantity(SetQuantity),
    Clear(Clear),
}

/// Event: a new line entered the cart with quantity 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub line: CartLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: an existing line's quantity changed (merge or explicit set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub service_id: ServiceId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a line left the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub service_id: ServiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the cart was emptied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCleared {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    QuantityChanged(QuantityChanged),
    ItemRemoved(ItemRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item_added",
            CartEvent::QuantityChanged(_) => "cart.quantity_changed",
            CartEvent::ItemRemoved(_) => "cart.item_removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::QuantityChanged(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(e) => {
                self.lines.push(e.line.clone());
            }
            CartEvent::QuantityChanged(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.service_id == e.service_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::ItemRemoved(e) => {
                self.lines.retain(|l| l.service_id != e.service_id);
            }
            CartEvent::CartCleared(_) => {
                self.lines.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add(cmd),
            CartCommand::RemoveItem(cmd) => self.handle_remove(cmd),
            CartCommand::SetQuantity(cmd) => self.handle_set_quantity(cmd),
            CartCommand::Clear(cmd) => self.handle_clear(cmd),
        }
    }
}

impl Cart {
    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, DomainError> {
        if cmd.service.price < 0.0 {
            return Err(DomainError::validation("price must be non-negative"));
        }

        // Merge-by-id: the existing line keeps whatever name/price/image
        // was first recorded; only the quantity moves.
        if let Some(existing) = self.find(&cmd.service.id) {
            return Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
                service_id: existing.service_id.clone(),
                quantity: existing.quantity + 1,
                occurred_at: cmd.occurred_at,
            })]);
        }

        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            line: CartLine::from_service(&cmd.service),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveItem) -> Result<Vec<CartEvent>, DomainError> {
        // Removing an absent line is a no-op, not an error.
        if self.find(&cmd.service_id).is_none() {
            return Ok(Vec::new());
        }

        Ok(vec![CartEvent::ItemRemoved(ItemRemoved {
            service_id: cmd.service_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_quantity(&self, cmd: &SetQuantity) -> Result<Vec<CartEvent>, DomainError> {
        if cmd.quantity <= 0 {
            return self.handle_remove(&RemoveItem {
                service_id: cmd.service_id.clone(),
                occurred_at: cmd.occurred_at,
            });
        }

        if self.find(&cmd.service_id).is_none() {
            return Ok(Vec::new());
        }

        let quantity = u32::try_from(cmd.quantity)
            .map_err(|_| DomainError::validation("quantity out of range"))?;

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            service_id: cmd.service_id.clone(),
            quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &Clear) -> Result<Vec<CartEvent>, DomainError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![CartEvent::CartCleared(CartCleared {
            occurred_at: cmd.occurred_at,
        })])
    }
}
