//! Checkout: one contact/schedule form applied to every cart line,
//! submitted as a batch of per-line booking requests.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use doorstep_auth::{Session, UserProfile};
use doorstep_cart::{CartLine, CartService};

use crate::flow::ActiveFlag;
use crate::payload::{BookingRequest, CheckoutBooking, ClientReference};
use crate::submit::BookingGateway;

/// Flat fee added on top of the cart subtotal.
pub const BOOKING_FEE: f64 = 20.0;

/// Where a completed checkout sends the customer.
pub const CHECKOUT_SUCCESS_REDIRECT: &str = "/bookings?success=true";

/// Where an empty-cart checkout visit bounces back to.
pub const EMPTY_CART_REDIRECT: &str = "/cart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutField {
    Name,
    Phone,
    Address,
    Date,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormError {
    pub field: CheckoutField,
    pub message: &'static str,
}

/// The single form covering every line in the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub notes: String,
}

impl CheckoutForm {
    /// Collect every violated mandatory field; city, pincode and notes
    /// are optional. Bookings cannot be scheduled in the past.
    pub fn validate(&self, today: NaiveDate) -> Vec<FormError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FormError {
                field: CheckoutField::Name,
                message: "Enter your name",
            });
        }
        if self.phone.trim().is_empty() {
            errors.push(FormError {
                field: CheckoutField::Phone,
                message: "Enter your phone number",
            });
        }
        if self.address.trim().is_empty() {
            errors.push(FormError {
                field: CheckoutField::Address,
                message: "Enter address",
            });
        }
        match self.date {
            None => errors.push(FormError {
                field: CheckoutField::Date,
                message: "Pick a date",
            }),
            Some(date) if date < today => errors.push(FormError {
                field: CheckoutField::Date,
                message: "Date cannot be in the past",
            }),
            Some(_) => {}
        }
        if self.time.trim().is_empty() {
            errors.push(FormError {
                field: CheckoutField::Time,
                message: "Pick a time",
            });
        }
        errors
    }

    /// Fill contact fields from the cached profile, without overwriting
    /// anything the customer already typed.
    pub fn prefill(&mut self, profile: &UserProfile) {
        if self.name.trim().is_empty() {
            self.name = profile.name.clone();
        }
        if self.phone.trim().is_empty() {
            self.phone = profile.phone.clone();
        }
    }
}

/// Order total breakdown shown beside the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSummary {
    pub subtotal: f64,
    pub booking_fee: f64,
    pub total: f64,
}

impl PriceSummary {
    pub fn for_lines(lines: &[CartLine]) -> Self {
        let subtotal: f64 = lines.iter().map(CartLine::line_total).sum();
        Self {
            subtotal,
            booking_fee: BOOKING_FEE,
            total: subtotal + BOOKING_FEE,
        }
    }
}

/// What a checkout attempt came to.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutResult {
    /// Nothing to book; bounce back to the cart page.
    EmptyCart { redirect: &'static str },
    /// Validation failed; no requests were made.
    Invalid(Vec<FormError>),
    /// Every line booked; the cart has been cleared.
    Completed { redirect: &'static str },
    /// At least one line failed. The cart is kept intact so the batch
    /// can be retried whole.
    Failed { message: String },
    /// The page was torn down mid-flight; the outcome was discarded.
    Detached,
}

/// Books the whole cart against the gateway.
pub struct CheckoutAggregator {
    cart: Arc<CartService>,
    gateway: Arc<dyn BookingGateway>,
    active: ActiveFlag,
}

impl CheckoutAggregator {
    pub fn new(cart: Arc<CartService>, gateway: Arc<dyn BookingGateway>) -> Self {
        Self {
            cart,
            gateway,
            active: ActiveFlag::new(),
        }
    }

    pub fn active_flag(&self) -> ActiveFlag {
        self.active.clone()
    }

    /// Page-entry check: an empty cart has nothing to check out.
    pub fn entry(&self) -> Option<&'static str> {
        match self.cart.is_empty() {
            Ok(true) => Some(EMPTY_CART_REDIRECT),
            Ok(false) => None,
            Err(e) => {
                warn!(error = %e, "cart read failed on checkout entry");
                Some(EMPTY_CART_REDIRECT)
            }
        }
    }

    pub fn price_summary(&self) -> PriceSummary {
        let lines = self.cart.lines().unwrap_or_default();
        PriceSummary::for_lines(&lines)
    }

    /// Prefill contact fields from the account profile. Best-effort:
    /// no session token or a failed lookup leaves the form untouched.
    pub async fn prefill_contact(&self, session: &Session, form: &mut CheckoutForm) {
        if session.access_token().is_none() {
            return;
        }
        match self.gateway.me().await {
            Ok(profile) => form.prefill(&profile),
            Err(e) => warn!(error = %e, "profile prefill failed"),
        }
    }

    /// Book every cart line with the shared form fields.
    ///
    /// Requests go out concurrently. The cart is cleared only when the
    /// whole batch succeeds; any failure keeps it intact for a retry,
    /// even though the successful lines are already booked.
    pub async fn submit(&self, form: &CheckoutForm, today: NaiveDate) -> CheckoutResult {
        let errors = form.validate(today);
        if !errors.is_empty() {
            return CheckoutResult::Invalid(errors);
        }
        // Validated above, so the date is present.
        let Some(date) = form.date else {
            return CheckoutResult::Invalid(errors);
        };

        let lines = match self.cart.lines() {
            Ok(lines) => lines,
            Err(e) => {
                return CheckoutResult::Failed {
                    message: e.to_string(),
                };
            }
        };
        if lines.is_empty() {
            return CheckoutResult::EmptyCart {
                redirect: EMPTY_CART_REDIRECT,
            };
        }

        let optional = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_owned());
        let requests: Vec<BookingRequest> = lines
            .iter()
            .map(|line| {
                BookingRequest::CheckoutLine(CheckoutBooking::from_line(
                    line,
                    date,
                    form.time.trim(),
                    form.address.trim(),
                    optional(&form.city).as_deref(),
                    optional(&form.pincode).as_deref(),
                    optional(&form.notes).as_deref(),
                    ClientReference::generate(),
                ))
            })
            .collect();

        let outcomes = join_all(
            requests
                .iter()
                .map(|request| self.gateway.create_booking(request)),
        )
        .await;

        if !self.active.is_active() {
            return CheckoutResult::Detached;
        }

        if let Some(Err(e)) = outcomes.into_iter().find(Result::is_err) {
            warn!(error = %e, "checkout batch failed");
            return CheckoutResult::Failed { message: e.message };
        }

        if let Err(e) = self.cart.clear() {
            warn!(error = %e, "cart clear after checkout failed");
        }
        info!(lines = requests.len(), "checkout completed");
        CheckoutResult::Completed {
            redirect: CHECKOUT_SUCCESS_REDIRECT,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use doorstep_catalog::Service;
    use doorstep_core::ServiceId;
    use doorstep_storage::MemoryStore;

    use super::*;
    use crate::submit::SubmitError;

    struct BatchGateway {
        calls: AtomicUsize,
        requests: Mutex<Vec<BookingRequest>>,
        /// Service ids whose line should fail.
        failing_ids: Vec<&'static str>,
    }

    impl BatchGateway {
        fn new(failing_ids: Vec<&'static str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                failing_ids,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookingGateway for BatchGateway {
        async fn create_booking(&self, request: &BookingRequest) -> Result<(), SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());

            let BookingRequest::CheckoutLine(line) = request else {
                panic!("checkout should only post checkout lines");
            };
            if self.failing_ids.contains(&line.service_id.as_str()) {
                Err(SubmitError::new("Slot no longer available"))
            } else {
                Ok(())
            }
        }

        async fn me(&self) -> Result<UserProfile, SubmitError> {
            Ok(UserProfile {
                name: "Asha".to_owned(),
                phone: "9999999999".to_owned(),
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn test_service(id: &str, name: &str, price: f64) -> Service {
        Service {
            id: ServiceId::new(id),
            vendor_id: None,
            name: name.to_owned(),
            price,
            image_url: None,
            description: None,
            category: None,
            is_popular: false,
            is_premium: false,
        }
    }

    fn cart_with(services: &[(&str, f64)]) -> Arc<CartService> {
        let cart = Arc::new(CartService::new(Arc::new(MemoryStore::new())));
        cart.load().unwrap();
        for (id, price) in services {
            cart.add_item(&test_service(id, id, *price)).unwrap();
        }
        cart
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            name: "Asha".to_owned(),
            phone: "9999999999".to_owned(),
            address: "12 MG Road".to_owned(),
            city: "Bengaluru".to_owned(),
            pincode: String::new(),
            date: Some(today()),
            time: "09:00 AM".to_owned(),
            notes: String::new(),
        }
    }

    #[test]
    fn validation_collects_every_missing_mandatory_field() {
        let errors = CheckoutForm::default().validate(today());
        let fields: Vec<CheckoutField> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                CheckoutField::Name,
                CheckoutField::Phone,
                CheckoutField::Address,
                CheckoutField::Date,
                CheckoutField::Time,
            ]
        );
    }

    #[test]
    fn past_dates_are_rejected() {
        let mut form = valid_form();
        form.date = Some(today() - chrono::Days::new(1));
        let errors = form.validate(today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, CheckoutField::Date);
    }

    #[test]
    fn prefill_never_overwrites_typed_fields() {
        let mut form = CheckoutForm {
            name: "Ravi".to_owned(),
            ..CheckoutForm::default()
        };
        form.prefill(&UserProfile {
            name: "Asha".to_owned(),
            phone: "9999999999".to_owned(),
        });
        assert_eq!(form.name, "Ravi");
        assert_eq!(form.phone, "9999999999");
    }

    #[test]
    fn price_summary_adds_the_booking_fee() {
        let cart = cart_with(&[("a", 500.0), ("b", 300.0)]);
        let aggregator =
            CheckoutAggregator::new(cart, Arc::new(BatchGateway::new(Vec::new())));

        let summary = aggregator.price_summary();
        assert_eq!(summary.subtotal, 800.0);
        assert_eq!(summary.booking_fee, 20.0);
        assert_eq!(summary.total, 820.0);
    }

    #[test]
    fn empty_cart_entry_redirects_back() {
        let aggregator = CheckoutAggregator::new(
            cart_with(&[]),
            Arc::new(BatchGateway::new(Vec::new())),
        );
        assert_eq!(aggregator.entry(), Some("/cart"));

        let aggregator = CheckoutAggregator::new(
            cart_with(&[("a", 100.0)]),
            Arc::new(BatchGateway::new(Vec::new())),
        );
        assert_eq!(aggregator.entry(), None);
    }

    #[tokio::test]
    async fn full_success_books_every_line_and_clears_the_cart() {
        let cart = cart_with(&[("a", 500.0), ("b", 300.0)]);
        let gateway = Arc::new(BatchGateway::new(Vec::new()));
        let aggregator = CheckoutAggregator::new(cart.clone(), gateway.clone());

        let result = aggregator.submit(&valid_form(), today()).await;
        assert_eq!(
            result,
            CheckoutResult::Completed {
                redirect: "/bookings?success=true"
            }
        );
        assert_eq!(gateway.call_count(), 2);
        assert!(cart.is_empty().unwrap());
    }

    #[tokio::test]
    async fn partial_failure_keeps_the_cart_and_reports_the_error() {
        let cart = cart_with(&[("a", 500.0), ("b", 300.0)]);
        let gateway = Arc::new(BatchGateway::new(vec!["b"]));
        let aggregator = CheckoutAggregator::new(cart.clone(), gateway.clone());

        let result = aggregator.submit(&valid_form(), today()).await;
        assert_eq!(
            result,
            CheckoutResult::Failed {
                message: "Slot no longer available".to_owned()
            }
        );
        // Both lines were attempted; the cart survives for a retry.
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(cart.total_items().unwrap(), 2);
    }

    #[tokio::test]
    async fn invalid_form_makes_no_requests() {
        let gateway = Arc::new(BatchGateway::new(Vec::new()));
        let aggregator =
            CheckoutAggregator::new(cart_with(&[("a", 100.0)]), gateway.clone());

        let result = aggregator.submit(&CheckoutForm::default(), today()).await;
        assert!(matches!(result, CheckoutResult::Invalid(_)));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn submitting_an_empty_cart_redirects() {
        let aggregator = CheckoutAggregator::new(
            cart_with(&[]),
            Arc::new(BatchGateway::new(Vec::new())),
        );
        let result = aggregator.submit(&valid_form(), today()).await;
        assert_eq!(
            result,
            CheckoutResult::EmptyCart { redirect: "/cart" }
        );
    }

    #[tokio::test]
    async fn teardown_mid_flight_discards_the_outcome() {
        let cart = cart_with(&[("a", 100.0)]);
        let gateway = Arc::new(BatchGateway::new(Vec::new()));
        let aggregator = CheckoutAggregator::new(cart.clone(), gateway);
        aggregator.active_flag().deactivate();

        let result = aggregator.submit(&valid_form(), today()).await;
        assert_eq!(result, CheckoutResult::Detached);
        assert_eq!(cart.total_items().unwrap(), 1);
    }

    #[tokio::test]
    async fn each_line_carries_the_shared_form_fields() {
        let cart = cart_with(&[("a", 500.0)]);
        let gateway = Arc::new(BatchGateway::new(Vec::new()));
        let aggregator = CheckoutAggregator::new(cart, gateway.clone());

        aggregator.submit(&valid_form(), today()).await;

        let requests = gateway.requests.lock().unwrap();
        let BookingRequest::CheckoutLine(line) = &requests[0] else {
            panic!("expected a checkout line");
        };
        assert_eq!(line.time, "09:00 AM");
        assert_eq!(line.city.as_deref(), Some("Bengaluru"));
        assert!(line.pincode.is_none());
        assert_eq!(line.quantity, 1);
    }
}
