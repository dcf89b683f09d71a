//! The engine: lifecycle operations over the entity store.
//!
//! Every mutating operation runs to completion in order: validate against
//! the current state, mutate the entity store, write the affected
//! collections through the durable store, append one activity entry and
//! recompute the affected aggregates. Persistence is fire-and-forget; a
//! write that fails every medium is logged and dropped, never surfaced.

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    activity::{ActivityKind, ActivityLog},
    bookings::Booking,
    customers::{Customer, name_key},
    fixtures,
    invoices::{Invoice, InvoiceStatus},
    state::{EntityStore, index_by},
    stats,
    store::{DurableStore, MemoryStore, StoreKey},
};

mod admin;
mod bookings;
mod invoices;

pub use bookings::{ConfirmOutcome, UpdateBookingOutcome};
pub use invoices::PaidOutcome;

#[derive(Debug)]
pub struct Engine {
    pub(crate) entities: EntityStore,
    pub(crate) activity: ActivityLog,
    pub(crate) store: Box<dyn DurableStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn booking_ref(&self, id: Uuid) -> ResultEngine<&Booking> {
        self.entities
            .booking(id)
            .ok_or_else(|| EngineError::NotFound("booking not exists".to_string()))
    }

    pub(crate) fn invoice_ref(&self, id: Uuid) -> ResultEngine<&Invoice> {
        self.entities
            .invoice(id)
            .ok_or_else(|| EngineError::NotFound("invoice not exists".to_string()))
    }

    /// The non-cancelled invoice backing a booking, if any. At most one can
    /// exist; the invoice lifecycle guards the invariant.
    pub(crate) fn open_invoice_for(&self, booking_id: Uuid) -> Option<&Invoice> {
        self.entities.invoices().find(|invoice| {
            invoice.booking_id == Some(booking_id) && invoice.status != InvoiceStatus::Cancelled
        })
    }

    /// Serialize one collection and hand it to the durable store. Failures
    /// are logged and swallowed: in-memory state is the source of truth and
    /// callers are never told persistence failed.
    pub(crate) fn persist(&mut self, key: StoreKey) {
        let encoded = match key {
            StoreKey::Bookings => serde_json::to_vec(&self.entities.bookings().collect::<Vec<_>>()),
            StoreKey::Invoices => serde_json::to_vec(&self.entities.invoices().collect::<Vec<_>>()),
            StoreKey::Customers => {
                serde_json::to_vec(&self.entities.customers().collect::<Vec<_>>())
            }
            StoreKey::Drivers => serde_json::to_vec(&self.entities.drivers().collect::<Vec<_>>()),
            StoreKey::Vehicles => serde_json::to_vec(&self.entities.vehicles().collect::<Vec<_>>()),
            StoreKey::Income => {
                serde_json::to_vec(&self.entities.income_entries().collect::<Vec<_>>())
            }
            StoreKey::Expenses => {
                serde_json::to_vec(&self.entities.expense_entries().collect::<Vec<_>>())
            }
            StoreKey::Partners => serde_json::to_vec(&self.entities.partners().collect::<Vec<_>>()),
            StoreKey::Estimations => {
                serde_json::to_vec(&self.entities.estimations().collect::<Vec<_>>())
            }
            StoreKey::Activity => serde_json::to_vec(&self.activity.entries().collect::<Vec<_>>()),
        };
        let bytes = match encoded {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "collection not serializable, write skipped");
                return;
            }
        };
        if let Err(err) = self.store.save(key, &bytes) {
            tracing::warn!(key = key.as_str(), %err, "durable write dropped, state stays memory-only");
        }
    }

    pub(crate) fn persist_all(&mut self) {
        for key in StoreKey::ALL {
            self.persist(key);
        }
    }

    /// Append one audit entry and write the log through.
    pub(crate) fn log(&mut self, kind: ActivityKind, description: String, related_id: Option<Uuid>) {
        tracing::debug!(kind = kind.as_str(), %description, "activity");
        self.activity.append(kind, description, related_id);
        self.persist(StoreKey::Activity);
    }

    /// Create the customer on first reference by a booking or invoice.
    pub(crate) fn ensure_customer(&mut self, name: &str) {
        let key = name_key(name);
        if key.is_empty() {
            return;
        }
        let on_file = self
            .entities
            .customers()
            .any(|customer| name_key(&customer.name) == key);
        if !on_file {
            tracing::info!(customer = name, "customer auto-created");
            self.entities.upsert_customer(Customer::new(name));
            self.persist(StoreKey::Customers);
        }
    }

    /// Full-pass recompute of one customer's aggregates, written through.
    pub(crate) fn sync_customer(&mut self, name: &str) {
        stats::recompute_customer(&mut self.entities, name);
        self.persist(StoreKey::Customers);
    }

    /// Full-pass recompute of one driver's aggregates, written through.
    pub(crate) fn sync_driver(&mut self, name: Option<&str>) {
        if let Some(name) = name {
            stats::recompute_driver(&mut self.entities, name);
            self.persist(StoreKey::Drivers);
        }
    }
}

/// Load one collection from the durable store, falling back to its demo
/// fixture when the blob is absent, unreadable or undecodable. Keys are
/// independent: a corrupt `invoices` blob does not affect `bookings`.
pub(crate) fn load_collection<T: DeserializeOwned>(
    store: &dyn DurableStore,
    key: StoreKey,
    seed: fn() -> Vec<T>,
) -> Vec<T> {
    match store.load(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(key = key.as_str(), %err, "corrupt blob, seeding fixture");
                seed()
            }
        },
        Ok(None) => seed(),
        Err(err) => {
            tracing::warn!(key = key.as_str(), %err, "load failed, seeding fixture");
            seed()
        }
    }
}

pub(crate) fn load_entities(store: &dyn DurableStore) -> EntityStore {
    EntityStore {
        bookings: index_by(
            load_collection(store, StoreKey::Bookings, fixtures::demo_bookings),
            |b| b.id,
        ),
        invoices: index_by(
            load_collection(store, StoreKey::Invoices, fixtures::demo_invoices),
            |i| i.id,
        ),
        customers: index_by(
            load_collection(store, StoreKey::Customers, fixtures::demo_customers),
            |c| c.id,
        ),
        drivers: index_by(
            load_collection(store, StoreKey::Drivers, fixtures::demo_drivers),
            |d| d.id,
        ),
        vehicles: index_by(
            load_collection(store, StoreKey::Vehicles, fixtures::demo_vehicles),
            |v| v.id,
        ),
        income: index_by(
            load_collection(store, StoreKey::Income, fixtures::demo_income),
            |e| e.id,
        ),
        expenses: index_by(
            load_collection(store, StoreKey::Expenses, fixtures::demo_expenses),
            |e| e.id,
        ),
        partners: index_by(
            load_collection(store, StoreKey::Partners, fixtures::demo_partners),
            |p| p.id,
        ),
        estimations: index_by(
            load_collection(store, StoreKey::Estimations, fixtures::demo_estimations),
            |e| e.id,
        ),
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    store: Box<dyn DurableStore>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
        }
    }
}

impl EngineBuilder {
    /// Pass the durable store the engine writes through.
    pub fn store(mut self, store: impl DurableStore + 'static) -> EngineBuilder {
        self.store = Box::new(store);
        self
    }

    /// Construct `Engine`, recovering every collection from the durable
    /// store (per-key fixture fallback on first start or corrupt data).
    pub fn build(self) -> Engine {
        let entities = load_entities(self.store.as_ref());
        let activity = ActivityLog::from_entries(load_collection(
            self.store.as_ref(),
            StoreKey::Activity,
            Vec::new,
        ));
        Engine {
            entities,
            activity,
            store: self.store,
        }
    }
}
