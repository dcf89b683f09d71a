//! In-memory entity collections.
//!
//! The `EntityStore` is the single source of truth for a process lifetime:
//! one map per entity type, keyed by id. Lifecycle operations and the stats
//! pass read and mutate through it; no cross-entity logic lives here.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    bookings::Booking,
    customers::Customer,
    drivers::Driver,
    estimations::Estimation,
    invoices::Invoice,
    ledger::{ExpenseEntry, IncomeEntry},
    partners::Partner,
    vehicles::Vehicle,
};

macro_rules! collection {
    ($field:ident, $ty:ty, $get:ident, $list:ident, $upsert:ident, $delete:ident) => {
        pub fn $get(&self, id: Uuid) -> Option<&$ty> {
            self.$field.get(&id)
        }

        pub fn $list(&self) -> impl Iterator<Item = &$ty> {
            self.$field.values()
        }

        pub fn $upsert(&mut self, value: $ty) {
            self.$field.insert(value.id, value);
        }

        pub fn $delete(&mut self, id: Uuid) -> Option<$ty> {
            self.$field.remove(&id)
        }
    };
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityStore {
    pub(crate) bookings: HashMap<Uuid, Booking>,
    pub(crate) invoices: HashMap<Uuid, Invoice>,
    pub(crate) customers: HashMap<Uuid, Customer>,
    pub(crate) drivers: HashMap<Uuid, Driver>,
    pub(crate) vehicles: HashMap<Uuid, Vehicle>,
    pub(crate) income: HashMap<Uuid, IncomeEntry>,
    pub(crate) expenses: HashMap<Uuid, ExpenseEntry>,
    pub(crate) partners: HashMap<Uuid, Partner>,
    pub(crate) estimations: HashMap<Uuid, Estimation>,
}

impl EntityStore {
    collection!(bookings, Booking, booking, bookings, upsert_booking, delete_booking);
    collection!(invoices, Invoice, invoice, invoices, upsert_invoice, delete_invoice);
    collection!(customers, Customer, customer, customers, upsert_customer, delete_customer);
    collection!(drivers, Driver, driver, drivers, upsert_driver, delete_driver);
    collection!(vehicles, Vehicle, vehicle, vehicles, upsert_vehicle, delete_vehicle);
    collection!(income, IncomeEntry, income_entry, income_entries, upsert_income_entry, delete_income_entry);
    collection!(expenses, ExpenseEntry, expense_entry, expense_entries, upsert_expense_entry, delete_expense_entry);
    collection!(partners, Partner, partner, partners, upsert_partner, delete_partner);
    collection!(estimations, Estimation, estimation, estimations, upsert_estimation, delete_estimation);
}

/// Index a decoded wire list by id.
pub(crate) fn index_by<T>(values: Vec<T>, id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, T> {
    values.into_iter().map(|value| (id(&value), value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::NewBooking;
    use chrono::NaiveDate;

    #[test]
    fn upsert_get_delete() {
        let mut entities = EntityStore::default();
        let booking = Booking::new(NewBooking {
            customer: String::from("Anna Bianchi"),
            pickup: String::from("Malpensa T1"),
            destination: String::from("Milano Centrale"),
            date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            ..NewBooking::default()
        })
        .unwrap();
        let id = booking.id;

        entities.upsert_booking(booking.clone());
        assert_eq!(entities.booking(id), Some(&booking));
        assert_eq!(entities.bookings().count(), 1);

        assert!(entities.delete_booking(id).is_some());
        assert_eq!(entities.booking(id), None);
    }
}
