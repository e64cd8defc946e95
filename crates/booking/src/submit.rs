//! Wizard submission driver: the one place a booking attempt crosses
//! from draft state into a network call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use doorstep_auth::UserProfile;
use doorstep_catalog::{CatalogSource, Service, ServiceQuery};

use crate::flow::ActiveFlag;
use crate::payload::{BookingRequest, ClientReference, WizardBooking};
use crate::wizard::{FieldError, Wizard, WizardStage, validate_for_submission};

/// Where a confirmed booking sends the customer.
pub const BOOKINGS_REDIRECT: &str = "/bookings";

/// How long the confirmation overlay shows before redirecting.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// A booking creation the remote side refused or that never arrived.
/// Carries the most specific message the response offered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmitError {
    pub message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outbound port for booking creation and account lookups.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn create_booking(&self, request: &BookingRequest) -> Result<(), SubmitError>;

    /// Current account profile, used to prefill contact fields.
    async fn me(&self) -> Result<UserProfile, SubmitError>;
}

/// What a submission attempt came to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    /// Wrong stage or already submitted; nothing happened.
    Blocked,
    /// Validation failed; no request was made.
    Invalid(Vec<FieldError>),
    /// Booked. Show confirmation, then redirect.
    Confirmed {
        redirect: &'static str,
        after: Duration,
    },
    /// The request failed; the wizard keeps its stage and draft.
    Failed { message: String },
    /// The page was torn down mid-flight; the outcome was discarded.
    Detached,
}

/// Drives one wizard through submission against the gateway.
pub struct WizardFlow {
    wizard: Wizard,
    gateway: Arc<dyn BookingGateway>,
    active: ActiveFlag,
    client_reference: ClientReference,
}

impl WizardFlow {
    pub fn new(wizard: Wizard, gateway: Arc<dyn BookingGateway>) -> Self {
        Self {
            wizard,
            gateway,
            active: ActiveFlag::new(),
            client_reference: ClientReference::generate(),
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn active_flag(&self) -> ActiveFlag {
        self.active.clone()
    }

    /// Submit the draft. Exactly one gateway call per invocation that
    /// passes the stage gate and validation; a confirmed submission
    /// moves the wizard to its terminal stage so a second click is
    /// [`SubmitResult::Blocked`].
    pub async fn submit(&mut self) -> SubmitResult {
        if self.wizard.stage() != WizardStage::DetailsAndConfirm {
            return SubmitResult::Blocked;
        }

        let errors = validate_for_submission(self.wizard.draft());
        if !errors.is_empty() {
            return SubmitResult::Invalid(errors);
        }

        let Some(payload) = WizardBooking::from_draft(self.wizard.draft(), self.client_reference)
        else {
            // Unreachable after validation; treated as a blocked click
            // rather than a phantom request.
            return SubmitResult::Blocked;
        };

        let request = BookingRequest::Wizard(payload);
        let outcome = self.gateway.create_booking(&request).await;

        if !self.active.is_active() {
            return SubmitResult::Detached;
        }

        match outcome {
            Ok(()) => {
                info!(reference = %self.client_reference, "booking confirmed");
                self.wizard.mark_submitted();
                SubmitResult::Confirmed {
                    redirect: BOOKINGS_REDIRECT,
                    after: REDIRECT_DELAY,
                }
            }
            Err(e) => {
                warn!(error = %e, "booking submission failed");
                SubmitResult::Failed { message: e.message }
            }
        }
    }
}

/// Fetch the bookable services for stage 1. A failed fetch degrades to
/// an empty list plus a message for the banner; the wizard still opens.
pub async fn load_services(catalog: &dyn CatalogSource) -> (Vec<Service>, Option<String>) {
    match catalog.fetch_services(&ServiceQuery::default()).await {
        Ok(services) => (services, None),
        Err(e) => {
            warn!(error = %e, "service list fetch failed");
            (
                Vec::new(),
                Some("Failed to load services. Please try again.".to_owned()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use doorstep_catalog::CatalogError;
    use doorstep_core::ServiceId;

    use super::*;
    use crate::wizard::{DraftField, TimeSlot};

    struct FakeGateway {
        calls: AtomicUsize,
        requests: Mutex<Vec<BookingRequest>>,
        outcome: Result<(), SubmitError>,
    }

    impl FakeGateway {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                outcome: Ok(()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                outcome: Err(SubmitError::new(message)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookingGateway for FakeGateway {
        async fn create_booking(&self, request: &BookingRequest) -> Result<(), SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }

        async fn me(&self) -> Result<UserProfile, SubmitError> {
            Ok(UserProfile::default())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn service() -> Service {
        Service {
            id: ServiceId::new("s1"),
            vendor_id: None,
            name: "Haircut".to_owned(),
            price: 200.0,
            image_url: None,
            description: None,
            category: None,
            is_popular: false,
            is_premium: false,
        }
    }

    fn wizard_ready_to_submit() -> Wizard {
        let mut wizard = Wizard::new(today());
        wizard.select_service(&service());
        wizard.set_date(today()).unwrap();
        wizard.set_time(TimeSlot::TenAm);
        wizard.advance();
        wizard.set_address("12 MG Road");
        wizard
    }

    #[tokio::test]
    async fn submission_before_the_final_stage_is_blocked() {
        let gateway = Arc::new(FakeGateway::succeeding());
        let mut flow = WizardFlow::new(Wizard::new(today()), gateway.clone());

        assert_eq!(flow.submit().await, SubmitResult::Blocked);
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_draft_makes_no_request_and_keeps_the_stage() {
        let gateway = Arc::new(FakeGateway::succeeding());
        let mut wizard = wizard_ready_to_submit();
        wizard.set_address("");
        let mut flow = WizardFlow::new(wizard, gateway.clone());

        let result = flow.submit().await;
        let SubmitResult::Invalid(errors) = result else {
            panic!("expected Invalid, got {result:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, DraftField::Address);

        assert_eq!(gateway.call_count(), 0);
        assert_eq!(flow.wizard().stage(), WizardStage::DetailsAndConfirm);
    }

    #[tokio::test]
    async fn successful_submission_calls_the_gateway_exactly_once() {
        let gateway = Arc::new(FakeGateway::succeeding());
        let mut flow = WizardFlow::new(wizard_ready_to_submit(), gateway.clone());

        let result = flow.submit().await;
        assert_eq!(
            result,
            SubmitResult::Confirmed {
                redirect: "/bookings",
                after: Duration::from_secs(2),
            }
        );
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(flow.wizard().stage(), WizardStage::Submitted);

        let requests = gateway.requests.lock().unwrap();
        let BookingRequest::Wizard(booking) = &requests[0] else {
            panic!("expected a wizard booking");
        };
        assert_eq!(booking.description, "Haircut");
    }

    #[tokio::test]
    async fn second_submission_after_success_is_blocked() {
        let gateway = Arc::new(FakeGateway::succeeding());
        let mut flow = WizardFlow::new(wizard_ready_to_submit(), gateway.clone());

        flow.submit().await;
        assert_eq!(flow.submit().await, SubmitResult::Blocked);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_submission_keeps_stage_and_draft_for_retry() {
        let gateway = Arc::new(FakeGateway::failing("Slot no longer available"));
        let mut flow = WizardFlow::new(wizard_ready_to_submit(), gateway.clone());

        let result = flow.submit().await;
        assert_eq!(
            result,
            SubmitResult::Failed {
                message: "Slot no longer available".to_owned()
            }
        );
        assert_eq!(flow.wizard().stage(), WizardStage::DetailsAndConfirm);
        assert_eq!(flow.wizard().draft().address, "12 MG Road");

        // Retry goes through unchanged.
        assert_eq!(gateway.call_count(), 1);
        flow.submit().await;
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn teardown_mid_flight_discards_the_outcome() {
        let gateway = Arc::new(FakeGateway::succeeding());
        let mut flow = WizardFlow::new(wizard_ready_to_submit(), gateway.clone());
        flow.active_flag().deactivate();

        assert_eq!(flow.submit().await, SubmitResult::Detached);
        // The request itself still went out; only the outcome is dropped.
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(flow.wizard().stage(), WizardStage::DetailsAndConfirm);
    }

    struct FakeCatalog {
        fail: bool,
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn fetch_categories(
            &self,
        ) -> Result<Vec<doorstep_catalog::Category>, CatalogError> {
            Ok(Vec::new())
        }

        async fn fetch_services(
            &self,
            _query: &ServiceQuery,
        ) -> Result<Vec<Service>, CatalogError> {
            if self.fail {
                Err(CatalogError::new("connection refused"))
            } else {
                Ok(vec![service()])
            }
        }
    }

    #[tokio::test]
    async fn service_load_failure_degrades_to_empty_with_message() {
        let (services, message) = load_services(&FakeCatalog { fail: true }).await;
        assert!(services.is_empty());
        assert!(message.is_some());

        let (services, message) = load_services(&FakeCatalog { fail: false }).await;
        assert_eq!(services.len(), 1);
        assert!(message.is_none());
    }
}
