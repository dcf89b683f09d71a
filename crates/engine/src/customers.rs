//! Customer records and name matching.
//!
//! Customers are auto-created the first time a booking or invoice references
//! a name not yet on file. Matching is done through [`name_key`] so that
//! accents, case and stray whitespace do not spawn duplicate records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_bookings: u32,
    pub total_spent_minor: i64,
    pub total_invoices: u32,
    pub last_booking: Option<NaiveDate>,
    pub last_invoice: Option<NaiveDate>,
}

impl Customer {
    /// A fresh record with zeroed aggregates; the stats pass fills them in.
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: None,
            phone: None,
            total_bookings: 0,
            total_spent_minor: 0,
            total_invoices: 0,
            last_booking: None,
            last_invoice: None,
        }
    }
}

/// Normalized lookup key for a customer or driver name.
///
/// NFKD-decomposes, drops combining marks, lowercases and collapses
/// non-alphanumeric runs to single spaces, so "José  Pérez" and
/// "jose perez" resolve to the same record.
pub fn name_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
