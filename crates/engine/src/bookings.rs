//! Booking primitives.
//!
//! A `Booking` is a transport job for a customer: either a single trip, a
//! multi-day tour or a job outsourced to a partner. Round trips carry two
//! independently completable legs (pickup and return).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, customers::name_key};

/// Price applied when a booking is invoiced without an explicit price,
/// in minor units (45.00 EUR).
pub const DEFAULT_BOOKING_PRICE_MINOR: i64 = 4500;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    #[default]
    Single,
    Tour,
    Outsourced,
}

impl BookingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Tour => "tour",
            Self::Outsourced => "outsourced",
        }
    }
}

impl TryFrom<&str> for BookingKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "single" => Ok(Self::Single),
            "tour" => Ok(Self::Tour),
            "outsourced" => Ok(Self::Outsourced),
            other => Err(EngineError::Validation(format!(
                "invalid booking kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// A booking still on the schedule, i.e. neither completed nor cancelled.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid booking status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer: String,
    pub pickup: String,
    pub destination: String,
    pub kind: BookingKind,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub tour_start: Option<NaiveDate>,
    pub tour_end: Option<NaiveDate>,
    pub driver: Option<String>,
    pub vehicle: Option<String>,
    pub partner: Option<String>,
    pub price_minor: Option<i64>,
    pub status: BookingStatus,
    pub has_return: bool,
    pub pickup_completed: bool,
    pub return_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Build a booking from caller input.
    ///
    /// The status always starts at `Pending` and both leg flags start
    /// cleared, whatever the caller asked for.
    pub fn new(data: NewBooking) -> ResultEngine<Self> {
        let customer = data.customer.trim();
        if name_key(customer).is_empty() {
            return Err(EngineError::Validation(
                "customer name needs at least one letter or digit".to_string(),
            ));
        }
        if let Some(price_minor) = data.price_minor
            && price_minor < 0
        {
            return Err(EngineError::Validation(
                "price_minor must be >= 0".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            customer: customer.to_string(),
            pickup: data.pickup.trim().to_string(),
            destination: data.destination.trim().to_string(),
            kind: data.kind,
            date: data.date,
            time: data.time,
            tour_start: data.tour_start,
            tour_end: data.tour_end,
            driver: data.driver,
            vehicle: data.vehicle,
            partner: data.partner,
            price_minor: data.price_minor,
            status: BookingStatus::Pending,
            has_return: data.has_return,
            pickup_completed: false,
            return_completed: false,
            created_at: Utc::now(),
        })
    }

    /// The price used when deriving an invoice from this booking.
    pub fn effective_price_minor(&self) -> i64 {
        self.price_minor.unwrap_or(DEFAULT_BOOKING_PRICE_MINOR)
    }

    /// Merge-patch the editable fields. Status changes are handled by the
    /// lifecycle operations, not here.
    pub fn apply_patch(&mut self, patch: &BookingPatch) {
        if let Some(customer) = &patch.customer {
            self.customer = customer.clone();
        }
        if let Some(pickup) = &patch.pickup {
            self.pickup = pickup.clone();
        }
        if let Some(destination) = &patch.destination {
            self.destination = destination.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = Some(time);
        }
        if let Some(tour_start) = patch.tour_start {
            self.tour_start = Some(tour_start);
        }
        if let Some(tour_end) = patch.tour_end {
            self.tour_end = Some(tour_end);
        }
        if let Some(driver) = &patch.driver {
            self.driver = Some(driver.clone());
        }
        if let Some(vehicle) = &patch.vehicle {
            self.vehicle = Some(vehicle.clone());
        }
        if let Some(partner) = &patch.partner {
            self.partner = Some(partner.clone());
        }
        if let Some(price_minor) = patch.price_minor {
            self.price_minor = Some(price_minor);
        }
        if let Some(has_return) = patch.has_return {
            self.has_return = has_return;
        }
    }
}

/// Caller input for [`Booking::new`].
///
/// `status` is accepted for interface compatibility with import-style
/// callers and deliberately ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewBooking {
    pub customer: String,
    pub pickup: String,
    pub destination: String,
    pub kind: BookingKind,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub tour_start: Option<NaiveDate>,
    pub tour_end: Option<NaiveDate>,
    pub driver: Option<String>,
    pub vehicle: Option<String>,
    pub partner: Option<String>,
    pub price_minor: Option<i64>,
    pub status: Option<BookingStatus>,
    pub has_return: bool,
}

/// Merge-patch for [`Engine::update_booking`].
///
/// [`Engine::update_booking`]: crate::Engine::update_booking
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingPatch {
    pub customer: Option<String>,
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub kind: Option<BookingKind>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub tour_start: Option<NaiveDate>,
    pub tour_end: Option<NaiveDate>,
    pub driver: Option<String>,
    pub vehicle: Option<String>,
    pub partner: Option<String>,
    pub price_minor: Option<i64>,
    pub status: Option<BookingStatus>,
    pub has_return: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_booking() -> NewBooking {
        NewBooking {
            customer: String::from("Anna Bianchi"),
            pickup: String::from("Malpensa T1"),
            destination: String::from("Milano Centrale"),
            date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            price_minor: Some(4500),
            ..NewBooking::default()
        }
    }

    #[test]
    fn new_booking_forces_pending() {
        let mut data = new_booking();
        data.status = Some(BookingStatus::Completed);

        let booking = Booking::new(data).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(!booking.pickup_completed);
        assert!(!booking.return_completed);
    }

    #[test]
    fn default_price_applies_when_absent() {
        let mut data = new_booking();
        data.price_minor = None;

        let booking = Booking::new(data).unwrap();
        assert_eq!(booking.effective_price_minor(), DEFAULT_BOOKING_PRICE_MINOR);
    }

    #[test]
    #[should_panic(expected = "customer name needs at least one letter or digit")]
    fn fail_empty_customer() {
        let mut data = new_booking();
        data.customer = String::from("  ");
        Booking::new(data).unwrap();
    }

    #[test]
    #[should_panic(expected = "customer name needs at least one letter or digit")]
    fn fail_symbol_only_customer() {
        // Non-empty input whose normalized name key is empty would never
        // match a customer record.
        let mut data = new_booking();
        data.customer = String::from("***");
        Booking::new(data).unwrap();
    }

    #[test]
    fn patch_merges_only_given_fields() {
        let mut booking = Booking::new(new_booking()).unwrap();
        booking.apply_patch(&BookingPatch {
            destination: Some(String::from("Linate")),
            price_minor: Some(6000),
            ..BookingPatch::default()
        });

        assert_eq!(booking.destination, "Linate");
        assert_eq!(booking.price_minor, Some(6000));
        assert_eq!(booking.pickup, "Malpensa T1");
        assert_eq!(booking.status, BookingStatus::Pending);
    }
}
