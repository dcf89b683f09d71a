//! Price estimations. Quotes that have not (yet) become bookings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estimation {
    pub id: Uuid,
    pub customer: String,
    pub pickup: String,
    pub destination: String,
    pub date: NaiveDate,
    pub price_minor: i64,
    pub notes: Option<String>,
}
