//! Invoice primitives.
//!
//! An `Invoice` either backs a booking (`booking_id = Some`) or is ad-hoc
//! (`booking_id = None`). At most one non-cancelled invoice may exist per
//! booking; the engine enforces that in the lifecycle operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, bookings::BookingKind, customers::name_key};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    Transport,
    Tour,
    #[default]
    Other,
}

impl InvoiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Tour => "tour",
            Self::Other => "other",
        }
    }

    /// Ledger category for income entries created when an invoice of this
    /// kind is paid.
    pub fn income_category(self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Tour => "Tours",
            Self::Other => "Other income",
        }
    }
}

impl From<BookingKind> for InvoiceKind {
    fn from(kind: BookingKind) -> Self {
        match kind {
            BookingKind::Single | BookingKind::Outsourced => Self::Transport,
            BookingKind::Tour => Self::Tour,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid invoice status: {other}"
            ))),
        }
    }
}

/// A single invoice line. The line amount is always `quantity * rate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub quantity: i64,
    pub rate_minor: i64,
    pub amount_minor: i64,
}

impl InvoiceItem {
    pub fn new(description: String, quantity: i64, rate_minor: i64) -> Self {
        Self {
            description,
            quantity,
            rate_minor,
            amount_minor: quantity.saturating_mul(rate_minor),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub customer: String,
    pub customer_email: Option<String>,
    pub kind: InvoiceKind,
    pub amount_minor: i64,
    pub items: Vec<InvoiceItem>,
    pub date: NaiveDate,
    pub status: InvoiceStatus,
    pub editable: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub sent_to: Option<String>,
    pub paid_date: Option<NaiveDate>,
}

impl Invoice {
    /// Build an ad-hoc invoice. The amount is the sum of the line amounts.
    pub fn ad_hoc(data: NewInvoice) -> ResultEngine<Self> {
        let customer = data.customer.trim();
        if name_key(customer).is_empty() {
            return Err(EngineError::Validation(
                "customer name needs at least one letter or digit".to_string(),
            ));
        }
        if data.items.is_empty() {
            return Err(EngineError::Validation(
                "invoice needs at least one item".to_string(),
            ));
        }
        validate_items(&data.items)?;

        let items: Vec<InvoiceItem> = data
            .items
            .into_iter()
            .map(|item| InvoiceItem::new(item.description, item.quantity, item.rate_minor))
            .collect();
        let amount_minor = items.iter().map(|item| item.amount_minor).sum();

        Ok(Self {
            id: Uuid::new_v4(),
            booking_id: None,
            customer: customer.to_string(),
            customer_email: data.customer_email,
            kind: data.kind,
            amount_minor,
            items,
            date: data.date.unwrap_or_else(|| Utc::now().date_naive()),
            status: InvoiceStatus::Pending,
            editable: true,
            sent_at: None,
            sent_to: None,
            paid_date: None,
        })
    }

    /// Recompute the invoice amount from its items.
    pub fn recompute_amount(&mut self) {
        self.amount_minor = self.items.iter().map(|item| item.amount_minor).sum();
    }

    /// Merge-patch for editable invoices. Status is included so an invoice
    /// can be flagged `Overdue`, the one status only an edit produces;
    /// `Engine::update_invoice` rejects every other status change before
    /// applying the patch.
    pub fn apply_patch(&mut self, patch: InvoicePatch) {
        if let Some(customer) = patch.customer {
            self.customer = customer;
        }
        if let Some(customer_email) = patch.customer_email {
            self.customer_email = Some(customer_email);
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(items) = patch.items {
            self.items = items
                .into_iter()
                .map(|item| InvoiceItem::new(item.description, item.quantity, item.rate_minor))
                .collect();
            self.recompute_amount();
        }
    }
}

/// Line items must carry a positive quantity and a non-negative rate, so a
/// derived amount can never drag the income ledger negative.
pub(crate) fn validate_items(items: &[NewInvoiceItem]) -> ResultEngine<()> {
    for item in items {
        if item.quantity <= 0 {
            return Err(EngineError::Validation(format!(
                "item \"{}\": quantity must be > 0",
                item.description
            )));
        }
        if item.rate_minor < 0 {
            return Err(EngineError::Validation(format!(
                "item \"{}\": rate_minor must be >= 0",
                item.description
            )));
        }
    }
    Ok(())
}

/// Caller input for one invoice line; the amount is derived, never supplied.
#[derive(Clone, Debug, Deserialize)]
pub struct NewInvoiceItem {
    pub description: String,
    pub quantity: i64,
    pub rate_minor: i64,
}

/// Caller input for [`Invoice::ad_hoc`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewInvoice {
    pub customer: String,
    pub customer_email: Option<String>,
    pub kind: InvoiceKind,
    pub date: Option<NaiveDate>,
    pub items: Vec<NewInvoiceItem>,
}

/// Merge-patch for [`Engine::update_invoice`].
///
/// [`Engine::update_invoice`]: crate::Engine::update_invoice
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvoicePatch {
    pub customer: Option<String>,
    pub customer_email: Option<String>,
    pub kind: Option<InvoiceKind>,
    pub date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub items: Option<Vec<NewInvoiceItem>>,
}
