//! The three-stage booking wizard, modelled as an explicit state
//! machine: named stages, a single guard predicate table, and
//! transition methods that either move or silently refuse.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use doorstep_catalog::Service;
use doorstep_core::{DomainError, DomainResult, ServiceId, VendorId};
use doorstep_geocode::{AddressSuggestion, Coordinates};

use crate::payload::PaymentMethod;

/// The fixed set of bookable time slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "09:00 AM")]
    NineAm,
    #[serde(rename = "10:00 AM")]
    TenAm,
    #[serde(rename = "11:00 AM")]
    ElevenAm,
    #[serde(rename = "12:00 PM")]
    TwelvePm,
    #[serde(rename = "02:00 PM")]
    TwoPm,
    #[serde(rename = "03:00 PM")]
    ThreePm,
    #[serde(rename = "04:00 PM")]
    FourPm,
    #[serde(rename = "05:00 PM")]
    FivePm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 8] = [
        TimeSlot::NineAm,
        TimeSlot::TenAm,
        TimeSlot::ElevenAm,
        TimeSlot::TwelvePm,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
        TimeSlot::FourPm,
        TimeSlot::FivePm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::NineAm => "09:00 AM",
            TimeSlot::TenAm => "10:00 AM",
            TimeSlot::ElevenAm => "11:00 AM",
            TimeSlot::TwelvePm => "12:00 PM",
            TimeSlot::TwoPm => "02:00 PM",
            TimeSlot::ThreePm => "03:00 PM",
            TimeSlot::FourPm => "04:00 PM",
            TimeSlot::FivePm => "05:00 PM",
        }
    }
}

impl core::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TimeSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown time slot: {s}")))
    }
}

/// Wizard stages, in order. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStage {
    #[default]
    SelectService,
    ScheduleDateTime,
    DetailsAndConfirm,
    Submitted,
}

impl WizardStage {
    /// 1-based progress step for display. The confirmation overlay
    /// still shows step 3.
    pub fn step(&self) -> u8 {
        match self {
            WizardStage::SelectService => 1,
            WizardStage::ScheduleDateTime => 2,
            WizardStage::DetailsAndConfirm | WizardStage::Submitted => 3,
        }
    }

    fn next(&self) -> Option<WizardStage> {
        match self {
            WizardStage::SelectService => Some(WizardStage::ScheduleDateTime),
            WizardStage::ScheduleDateTime => Some(WizardStage::DetailsAndConfirm),
            // Leaving stage 3 happens only through submission.
            WizardStage::DetailsAndConfirm | WizardStage::Submitted => None,
        }
    }

    fn prev(&self) -> Option<WizardStage> {
        match self {
            WizardStage::SelectService | WizardStage::Submitted => None,
            WizardStage::ScheduleDateTime => Some(WizardStage::SelectService),
            WizardStage::DetailsAndConfirm => Some(WizardStage::ScheduleDateTime),
        }
    }
}

/// How far ahead a booking may be scheduled.
pub const BOOKING_WINDOW_MONTHS: u32 = 3;

/// Inclusive date window for new bookings: `[today, today + 3 months]`.
pub fn date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let max = today
        .checked_add_months(Months::new(BOOKING_WINDOW_MONTHS))
        .unwrap_or(today);
    (today, max)
}

fn date_in_window(date: NaiveDate, today: NaiveDate) -> bool {
    let (min, max) = date_window(today);
    date >= min && date <= max
}

/// The in-progress booking form state. Owned by the wizard for the
/// lifetime of one booking attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub service_id: Option<ServiceId>,
    pub vendor_id: Option<VendorId>,
    pub service_name: String,
    pub price: f64,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub manual_location: String,
    pub special_instructions: String,
    pub payment_method: PaymentMethod,
}

impl BookingDraft {
    fn has_service(&self) -> bool {
        self.service_id.is_some() && !self.service_name.is_empty()
    }
}

/// Field keys for stage-3 validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Service,
    Date,
    Time,
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: DraftField,
    pub message: &'static str,
}

/// Synchronous pre-submission validation. Not fail-fast: every violated
/// field is reported so the form can mark them all at once.
pub fn validate_for_submission(draft: &BookingDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if draft.service_id.is_none() {
        errors.push(FieldError {
            field: DraftField::Service,
            message: "Select a service",
        });
    }
    if draft.date.is_none() {
        errors.push(FieldError {
            field: DraftField::Date,
            message: "Pick a date",
        });
    }
    if draft.time.is_none() {
        errors.push(FieldError {
            field: DraftField::Time,
            message: "Pick a time",
        });
    }
    if draft.address.trim().is_empty() {
        errors.push(FieldError {
            field: DraftField::Address,
            message: "Enter address",
        });
    }
    errors
}

/// Inbound deep link carrying a preselected service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepLink {
    pub service_id: Option<ServiceId>,
    pub service_name: Option<String>,
    pub price: Option<f64>,
}

impl DeepLink {
    /// Pick the recognised parameters out of a parsed query string.
    pub fn from_query_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut link = Self::default();
        for (key, value) in pairs {
            match key {
                "serviceId" if !value.is_empty() => link.service_id = Some(ServiceId::new(value)),
                "serviceName" if !value.is_empty() => link.service_name = Some(value.to_owned()),
                "price" => link.price = Some(value.parse().unwrap_or(0.0)),
                _ => {}
            }
        }
        link
    }
}

/// The wizard state machine.
///
/// `today` is injected so the date window is deterministic under test.
#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    stage: WizardStage,
    draft: BookingDraft,
    today: NaiveDate,
}

impl Wizard {
    /// Fresh wizard at stage 1 with an empty draft.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            stage: WizardStage::SelectService,
            draft: BookingDraft::default(),
            today,
        }
    }

    /// Entry point honouring a deep link.
    ///
    /// A fully-specified link (id + name + price) seeds the draft
    /// directly; an id-only link is resolved against the loaded
    /// catalog. Either way the wizard opens at stage 2. Anything less
    /// falls back to a fresh stage-1 wizard.
    pub fn from_deep_link(link: &DeepLink, services: &[Service], today: NaiveDate) -> Self {
        let mut wizard = Self::new(today);

        let Some(service_id) = &link.service_id else {
            return wizard;
        };

        if let (Some(name), Some(price)) = (&link.service_name, link.price) {
            wizard.draft.service_id = Some(service_id.clone());
            wizard.draft.service_name = name.clone();
            wizard.draft.price = price;
            wizard.stage = WizardStage::ScheduleDateTime;
            return wizard;
        }

        if let Some(found) = services.iter().find(|s| &s.id == service_id) {
            wizard.select_service(found);
        }
        wizard
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Record the chosen service and advance to scheduling. Choosing a
    /// service always advances; it is the stage-1 guard made true.
    pub fn select_service(&mut self, service: &Service) {
        self.draft.service_id = Some(service.id.clone());
        self.draft.vendor_id = service.vendor_id.clone();
        self.draft.service_name = service.name.clone();
        self.draft.price = service.price;
        self.stage = WizardStage::ScheduleDateTime;
    }

    /// Set the service date; rejects dates outside the booking window.
    pub fn set_date(&mut self, date: NaiveDate) -> DomainResult<()> {
        if !date_in_window(date, self.today) {
            return Err(DomainError::validation(
                "date must be within three months from today",
            ));
        }
        self.draft.date = Some(date);
        Ok(())
    }

    pub fn set_time(&mut self, time: TimeSlot) {
        self.draft.time = Some(time);
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.draft.address = address.into();
    }

    /// Fill address + coordinates from a picked search suggestion.
    pub fn apply_suggestion(&mut self, suggestion: &AddressSuggestion) {
        let (address, coordinates) = suggestion.selection();
        self.draft.address = address;
        self.draft.coordinates = Some(coordinates);
    }

    pub fn set_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.draft.coordinates = coordinates;
    }

    pub fn set_manual_location(&mut self, detail: impl Into<String>) {
        self.draft.manual_location = detail.into();
    }

    pub fn set_special_instructions(&mut self, notes: impl Into<String>) {
        self.draft.special_instructions = notes.into();
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.draft.payment_method = method;
    }

    /// The guard predicate table: may the wizard move forward out of
    /// `stage` given `draft`?
    pub fn can_advance_from(stage: WizardStage, draft: &BookingDraft, today: NaiveDate) -> bool {
        match stage {
            WizardStage::SelectService => draft.has_service(),
            WizardStage::ScheduleDateTime => {
                draft.has_service()
                    && draft.date.is_some_and(|d| date_in_window(d, today))
                    && draft.time.is_some()
            }
            WizardStage::DetailsAndConfirm => validate_for_submission(draft).is_empty(),
            WizardStage::Submitted => false,
        }
    }

    pub fn can_advance(&self) -> bool {
        Self::can_advance_from(self.stage, &self.draft, self.today)
    }

    /// Try to move forward. A failing guard blocks silently; there is
    /// no automatic stage skip.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        match self.stage.next() {
            Some(next) => {
                self.stage = next;
                true
            }
            None => false,
        }
    }

    /// Move backward. Always permitted (except from the terminal
    /// stage) and never clears entered data.
    pub fn back(&mut self) -> bool {
        match self.stage.prev() {
            Some(prev) => {
                self.stage = prev;
                true
            }
            None => false,
        }
    }

    /// Terminal transition, driven by a successful submission.
    pub(crate) fn mark_submitted(&mut self) {
        self.stage = WizardStage::Submitted;
    }

    /// Stage-1 search box: case-insensitive name filter.
    pub fn filter_services<'a>(services: &'a [Service], query: &str) -> Vec<&'a Service> {
        let query = query.to_lowercase();
        services
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Up to three other services shown beside the summary.
    pub fn related_services<'a>(&self, services: &'a [Service]) -> Vec<&'a Service> {
        services
            .iter()
            .filter(|s| Some(&s.id) != self.draft.service_id.as_ref())
            .take(3)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn wizard_at_stage_two() -> Wizard {
        let mut wizard = Wizard::new(today());
        wizard.select_service(&test_service("s1", "Haircut", 200.0));
        wizard
    }

    #[test]
    fn cannot_advance_without_a_selected_service() {
        let mut wizard = Wizard::new(today());
        assert!(!wizard.advance());
        assert_eq!(wizard.stage(), WizardStage::SelectService);
    }

    #[test]
    fn selecting_a_service_advances_to_scheduling() {
        let wizard = wizard_at_stage_two();
        assert_eq!(wizard.stage(), WizardStage::ScheduleDateTime);
        assert_eq!(wizard.draft().service_name, "Haircut");
        assert_eq!(wizard.draft().price, 200.0);
    }

    #[test]
    fn scheduling_requires_both_date_and_time() {
        let mut wizard = wizard_at_stage_two();
        assert!(!wizard.advance());

        wizard.set_date(today() + chrono::Days::new(1)).unwrap();
        assert!(!wizard.advance());

        wizard.set_time(TimeSlot::TenAm);
        assert!(wizard.advance());
        assert_eq!(wizard.stage(), WizardStage::DetailsAndConfirm);
    }

    #[test]
    fn dates_outside_the_window_are_rejected() {
        let mut wizard = wizard_at_stage_two();

        let yesterday = today() - chrono::Days::new(1);
        assert!(wizard.set_date(yesterday).is_err());

        let too_far = today() + chrono::Months::new(4);
        assert!(wizard.set_date(too_far).is_err());

        // Window edges are bookable.
        assert!(wizard.set_date(today()).is_ok());
        let (_, max) = date_window(today());
        assert!(wizard.set_date(max).is_ok());
    }

    #[test]
    fn moving_backward_preserves_entered_data() {
        let mut wizard = wizard_at_stage_two();
        wizard.set_date(today()).unwrap();
        wizard.set_time(TimeSlot::NineAm);
        wizard.advance();
        wizard.set_address("12 MG Road");

        assert!(wizard.back());
        assert!(wizard.back());
        assert_eq!(wizard.stage(), WizardStage::SelectService);

        assert_eq!(wizard.draft().address, "12 MG Road");
        assert_eq!(wizard.draft().date, Some(today()));
        assert_eq!(wizard.draft().time, Some(TimeSlot::NineAm));

        // And the guards let it straight back through.
        assert!(wizard.advance());
        assert!(wizard.advance());
        assert_eq!(wizard.stage(), WizardStage::DetailsAndConfirm);
    }

    #[test]
    fn full_deep_link_opens_at_stage_two_with_seeded_draft() {
        let link = DeepLink::from_query_pairs([
            ("serviceId", "s1"),
            ("serviceName", "Haircut"),
            ("price", "200"),
        ]);

        let wizard = Wizard::from_deep_link(&link, &[], today());
        assert_eq!(wizard.stage(), WizardStage::ScheduleDateTime);
        assert_eq!(wizard.draft().service_id, Some(ServiceId::new("s1")));
        assert_eq!(wizard.draft().service_name, "Haircut");
        assert_eq!(wizard.draft().price, 200.0);
    }

    #[test]
    fn id_only_deep_link_resolves_against_the_catalog() {
        let link = DeepLink::from_query_pairs([("serviceId", "s2")]);
        let services = [
            test_service("s1", "Haircut", 200.0),
            test_service("s2", "Deep Clean", 900.0),
        ];

        let wizard = Wizard::from_deep_link(&link, &services, today());
        assert_eq!(wizard.stage(), WizardStage::ScheduleDateTime);
        assert_eq!(wizard.draft().service_name, "Deep Clean");
    }

    #[test]
    fn unresolvable_deep_link_falls_back_to_stage_one() {
        let link = DeepLink::from_query_pairs([("serviceId", "ghost")]);
        let wizard = Wizard::from_deep_link(&link, &[], today());
        assert_eq!(wizard.stage(), WizardStage::SelectService);
        assert_eq!(wizard.draft(), &BookingDraft::default());
    }

    #[test]
    fn unparsable_deep_link_price_counts_as_zero() {
        let link =
            DeepLink::from_query_pairs([("serviceId", "s1"), ("serviceName", "X"), ("price", "??")]);
        let wizard = Wizard::from_deep_link(&link, &[], today());
        assert_eq!(wizard.stage(), WizardStage::ScheduleDateTime);
        assert_eq!(wizard.draft().price, 0.0);
    }

    #[test]
    fn validation_collects_every_violation_at_once() {
        let errors = validate_for_submission(&BookingDraft::default());
        let fields: Vec<DraftField> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                DraftField::Service,
                DraftField::Date,
                DraftField::Time,
                DraftField::Address
            ]
        );
    }

    #[test]
    fn time_slots_round_trip_their_labels() {
        for slot in TimeSlot::ALL {
            assert_eq!(slot.as_str().parse::<TimeSlot>().unwrap(), slot);
        }
        assert!("01:00 PM".parse::<TimeSlot>().is_err());
    }

    #[test]
    fn service_filter_matches_case_insensitively() {
        let services = [
            test_service("s1", "Haircut", 200.0),
            test_service("s2", "Deep Clean", 900.0),
        ];
        let hits = Wizard::filter_services(&services, "hair");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Haircut");
    }

    #[test]
    fn related_services_exclude_the_selected_one() {
        let services: Vec<Service> = (0..5)
            .map(|i| test_service(&format!("s{i}"), &format!("Svc {i}"), 100.0))
            .collect();

        let mut wizard = Wizard::new(today());
        wizard.select_service(&services[0]);

        let related = wizard.related_services(&services);
        assert_eq!(related.len(), 3);
        assert!(related.iter().all(|s| s.id != services[0].id));
    }
}
