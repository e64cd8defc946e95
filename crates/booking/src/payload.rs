//! Wire payloads for booking creation.
//!
//! The two flows post different shapes to the same endpoint: the
//! wizard sends a scheduled single-service booking, checkout sends one
//! request per cart line. [`BookingRequest`] keeps both behind one
//! gateway signature.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doorstep_cart::CartLine;
use doorstep_core::{ServiceId, VendorId};
use doorstep_geocode::Coordinates;

use crate::wizard::{BookingDraft, TimeSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Online,
}

/// Client-generated idempotency handle attached to every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientReference(Uuid);

impl ClientReference {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl core::fmt::Display for ClientReference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

/// Optional structured location attached to a wizard booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Free-text landmark or flat detail typed by the customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<String>,
}

impl LocationPayload {
    fn from_draft(draft: &BookingDraft) -> Option<Self> {
        let coordinates = draft.coordinates.map(Coordinates::rounded);
        let manual = (!draft.manual_location.trim().is_empty())
            .then(|| draft.manual_location.trim().to_owned());

        if coordinates.is_none() && manual.is_none() {
            return None;
        }
        Some(Self {
            lat: coordinates.map(|c| c.lat),
            lng: coordinates.map(|c| c.lng),
            manual,
        })
    }
}

/// A scheduled booking produced by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardBooking {
    pub service_id: ServiceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<VendorId>,
    pub service_date: NaiveDate,
    pub service_time: TimeSlot,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationPayload>,
    pub price: f64,
    /// Server-side label; carries the service name.
    pub description: String,
    pub special_instructions: String,
    pub payment_method: PaymentMethod,
    pub client_reference: ClientReference,
}

impl WizardBooking {
    /// Assemble the payload from a validated draft. Returns `None` when
    /// any mandatory field is still missing, so the caller validates
    /// first and this is the backstop.
    pub fn from_draft(draft: &BookingDraft, client_reference: ClientReference) -> Option<Self> {
        let service_id = draft.service_id.clone()?;
        let service_date = draft.date?;
        let service_time = draft.time?;
        let address = draft.address.trim();
        if address.is_empty() {
            return None;
        }

        Some(Self {
            service_id,
            vendor_id: draft.vendor_id.clone(),
            service_date,
            service_time,
            address: address.to_owned(),
            location: LocationPayload::from_draft(draft),
            price: draft.price,
            description: draft.service_name.clone(),
            special_instructions: draft.special_instructions.clone(),
            payment_method: draft.payment_method,
            client_reference,
        })
    }
}

/// One checkout cart line, as posted to the bookings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBooking {
    pub service_id: ServiceId,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub price: f64,
    pub quantity: u32,
    pub client_reference: ClientReference,
}

impl CheckoutBooking {
    pub(crate) fn from_line(
        line: &CartLine,
        date: NaiveDate,
        time: &str,
        address: &str,
        city: Option<&str>,
        pincode: Option<&str>,
        notes: Option<&str>,
        client_reference: ClientReference,
    ) -> Self {
        Self {
            service_id: line.service_id.clone(),
            service_name: line.service_name.clone(),
            date,
            time: time.to_owned(),
            address: address.to_owned(),
            city: city.map(str::to_owned),
            pincode: pincode.map(str::to_owned),
            notes: notes.map(str::to_owned),
            price: line.price,
            quantity: line.quantity,
            client_reference,
        }
    }
}

/// Everything the gateway can post to create a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingRequest {
    Wizard(WizardBooking),
    CheckoutLine(CheckoutBooking),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn filled_draft() -> BookingDraft {
        BookingDraft {
            service_id: Some(ServiceId::new("s1")),
            vendor_id: Some(VendorId::new("v1")),
            service_name: "Haircut".to_owned(),
            price: 200.0,
            date: NaiveDate::from_ymd_opt(2025, 6, 10),
            time: Some(TimeSlot::TenAm),
            address: "12 MG Road".to_owned(),
            coordinates: Some(Coordinates {
                lat: 12.971598765,
                lng: 77.594566123,
            }),
            manual_location: "Flat 4B".to_owned(),
            special_instructions: "Ring the bell".to_owned(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[test]
    fn wizard_payload_serializes_in_the_expected_shape() {
        let payload =
            WizardBooking::from_draft(&filled_draft(), ClientReference::generate()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["serviceId"], "s1");
        assert_eq!(value["vendorId"], "v1");
        assert_eq!(value["serviceDate"], "2025-06-10");
        assert_eq!(value["serviceTime"], "10:00 AM");
        assert_eq!(value["address"], "12 MG Road");
        assert_eq!(value["description"], "Haircut");
        assert_eq!(value["paymentMethod"], "cash");
        // Coordinates travel rounded to six decimals.
        assert_eq!(value["location"], json!({
            "lat": 12.971599,
            "lng": 77.594566,
            "manual": "Flat 4B",
        }));
    }

    #[test]
    fn wizard_payload_refuses_an_incomplete_draft() {
        let mut draft = filled_draft();
        draft.time = None;
        assert!(WizardBooking::from_draft(&draft, ClientReference::generate()).is_none());

        let mut draft = filled_draft();
        draft.address = "   ".to_owned();
        assert!(WizardBooking::from_draft(&draft, ClientReference::generate()).is_none());
    }

    #[test]
    fn location_block_is_omitted_when_nothing_was_captured() {
        let mut draft = filled_draft();
        draft.coordinates = None;
        draft.manual_location = String::new();

        let payload = WizardBooking::from_draft(&draft, ClientReference::generate()).unwrap();
        assert!(payload.location.is_none());

        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("location").is_none());
    }

    #[test]
    fn checkout_line_serializes_with_quantity_and_contact_fields() {
        let line = CartLine {
            service_id: ServiceId::new("s2"),
            service_name: "Deep Clean".to_owned(),
            price: 900.0,
            quantity: 2,
            image_url: None,
            description: None,
        };
        let payload = CheckoutBooking::from_line(
            &line,
            NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            "09:00 AM",
            "12 MG Road",
            Some("Bengaluru"),
            Some("560001"),
            None,
            ClientReference::generate(),
        );
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["serviceName"], "Deep Clean");
        assert_eq!(value["quantity"], 2);
        assert_eq!(value["city"], "Bengaluru");
        assert_eq!(value["pincode"], "560001");
        assert!(value.get("notes").is_none());
    }
}
