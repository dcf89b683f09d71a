//! Bulk administration and read-only accessors.

use uuid::Uuid;

use crate::{
    ResultEngine,
    activity::{ActivityEntry, ActivityKind, ActivityLog},
    bookings::Booking,
    customers::Customer,
    drivers::Driver,
    estimations::Estimation,
    fixtures,
    invoices::Invoice,
    ledger::{ExpenseEntry, IncomeEntry},
    partners::Partner,
    state::{EntityStore, index_by},
    status::{self, CombinedStatus},
    store::StoreKey,
    vehicles::Vehicle,
};

use super::{Engine, load_collection, load_entities};

impl Engine {
    /// Drop the in-memory state and reload every collection from the
    /// durable store, with the usual per-key fixture fallback.
    pub fn refresh_all_data(&mut self) {
        tracing::info!("reloading all collections from the durable store");
        self.entities = load_entities(self.store.as_ref());
        self.activity = ActivityLog::from_entries(load_collection(
            self.store.as_ref(),
            StoreKey::Activity,
            Vec::new,
        ));
    }

    /// Wipe everything and reseed the demo dataset.
    pub fn reset_to_demo(&mut self) {
        tracing::info!("resetting to the demo dataset");
        self.entities = demo_entities();
        self.activity.clear();
        self.persist_all();
        self.log(
            ActivityKind::DataReset,
            String::from("Demo data restored"),
            None,
        );
    }

    /// Wipe everything, activity history included, and persist the empty
    /// collections.
    pub fn clear_all_data(&mut self) {
        tracing::info!("clearing all data");
        self.entities = EntityStore::default();
        self.activity.clear();
        self.persist_all();
    }

    pub fn booking(&self, id: Uuid) -> Option<&Booking> {
        self.entities.booking(id)
    }

    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.entities.bookings()
    }

    pub fn invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.entities.invoice(id)
    }

    pub fn invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.entities.invoices()
    }

    /// The non-cancelled invoice backing a booking, if any.
    pub fn invoice_for_booking(&self, booking_id: Uuid) -> Option<&Invoice> {
        self.open_invoice_for(booking_id)
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.entities.customers()
    }

    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.entities.drivers()
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.entities.vehicles()
    }

    pub fn partners(&self) -> impl Iterator<Item = &Partner> {
        self.entities.partners()
    }

    pub fn income_entries(&self) -> impl Iterator<Item = &IncomeEntry> {
        self.entities.income_entries()
    }

    pub fn expense_entries(&self) -> impl Iterator<Item = &ExpenseEntry> {
        self.entities.expense_entries()
    }

    pub fn estimations(&self) -> impl Iterator<Item = &Estimation> {
        self.entities.estimations()
    }

    /// Most recent activity entries, newest first.
    pub fn activity(&self, limit: usize) -> impl Iterator<Item = &ActivityEntry> {
        self.activity.recent(limit)
    }

    /// The reporting status of a booking, derived together with its current
    /// non-cancelled invoice.
    pub fn combined_status(&self, booking_id: Uuid) -> ResultEngine<CombinedStatus> {
        let booking = self.booking_ref(booking_id)?;
        Ok(status::resolve(booking, self.open_invoice_for(booking_id)))
    }
}

fn demo_entities() -> EntityStore {
    EntityStore {
        bookings: index_by(fixtures::demo_bookings(), |b| b.id),
        invoices: index_by(fixtures::demo_invoices(), |i| i.id),
        customers: index_by(fixtures::demo_customers(), |c| c.id),
        drivers: index_by(fixtures::demo_drivers(), |d| d.id),
        vehicles: index_by(fixtures::demo_vehicles(), |v| v.id),
        income: index_by(fixtures::demo_income(), |e| e.id),
        expenses: index_by(fixtures::demo_expenses(), |e| e.id),
        partners: index_by(fixtures::demo_partners(), |p| p.id),
        estimations: index_by(fixtures::demo_estimations(), |e| e.id),
    }
}
