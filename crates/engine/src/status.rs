//! Combined reporting status.
//!
//! Reporting consumers want one label per booking that folds in the state of
//! its invoice. [`resolve`] derives it from a `(Booking, Option<Invoice>)`
//! pair; it reads nothing else and mutates nothing.

use serde::{Deserialize, Serialize};

use crate::{
    bookings::{Booking, BookingStatus},
    invoices::{Invoice, InvoiceStatus},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinedStatus {
    Pending,
    Confirmed,
    Completed,
    Invoiced,
    Paid,
    Overdue,
    Cancelled,
    Other,
}

impl CombinedStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

/// Derive the combined status. First matching rule wins; the order is part
/// of the contract, later rules are reachable only when earlier ones fail.
pub fn resolve(booking: &Booking, invoice: Option<&Invoice>) -> CombinedStatus {
    match booking.status {
        BookingStatus::Pending => return CombinedStatus::Pending,
        BookingStatus::Confirmed => return CombinedStatus::Confirmed,
        BookingStatus::Completed if invoice.is_none() => return CombinedStatus::Completed,
        BookingStatus::Completed | BookingStatus::Cancelled => {}
    }

    if let Some(invoice) = invoice {
        match invoice.status {
            InvoiceStatus::Pending | InvoiceStatus::Sent => return CombinedStatus::Invoiced,
            InvoiceStatus::Paid => return CombinedStatus::Paid,
            InvoiceStatus::Overdue => return CombinedStatus::Overdue,
            InvoiceStatus::Cancelled => {}
        }
    }

    if booking.status == BookingStatus::Cancelled {
        return CombinedStatus::Cancelled;
    }

    CombinedStatus::Other
}
