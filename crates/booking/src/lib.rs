//! `doorstep-booking` — the booking flows.
//!
//! Two ways a booking gets made:
//!
//! - the three-stage **wizard** ([`wizard`], driven by
//!   [`submit::WizardFlow`]) for a single service, and
//! - the **checkout aggregator** ([`checkout`]) which books every cart
//!   line in one go.
//!
//! Both terminate against the [`submit::BookingGateway`] collaborator;
//! the HTTP implementation lives in `doorstep-client`.

pub mod checkout;
pub mod flow;
pub mod payload;
pub mod submit;
pub mod wizard;

pub use checkout::{
    CheckoutAggregator, CheckoutField, CheckoutForm, CheckoutResult, FormError, PriceSummary,
};
pub use flow::ActiveFlag;
pub use payload::{
    BookingRequest, CheckoutBooking, ClientReference, PaymentMethod, WizardBooking,
};
pub use submit::{BookingGateway, SubmitError, SubmitResult, WizardFlow, load_services};
pub use wizard::{BookingDraft, DeepLink, DraftField, FieldError, TimeSlot, Wizard, WizardStage};
