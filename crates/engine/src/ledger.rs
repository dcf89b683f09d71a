//! Income and expense ledger entries.
//!
//! Income entries are mostly machine-made: paying an invoice records exactly
//! one entry for the invoice amount. Expense entries are plain bookkeeping
//! records managed through the entity store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::invoices::Invoice;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    #[default]
    Received,
    Projected,
}

impl LedgerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Projected => "projected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount_minor: i64,
    pub invoice_id: Option<Uuid>,
    pub customer: Option<String>,
    pub status: LedgerStatus,
}

impl IncomeEntry {
    /// The single ledger record for an invoice payment.
    pub fn from_paid_invoice(invoice: &Invoice, paid_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: paid_date,
            description: format!("Payment of invoice for {}", invoice.customer),
            category: invoice.kind.income_category().to_string(),
            amount_minor: invoice.amount_minor,
            invoice_id: Some(invoice.id),
            customer: Some(invoice.customer.clone()),
            status: LedgerStatus::Received,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount_minor: i64,
    pub vendor: Option<String>,
}
