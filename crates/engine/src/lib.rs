pub use activity::{ACTIVITY_CAPACITY, ActivityEntry, ActivityKind, ActivityLog};
pub use bookings::{
    Booking, BookingKind, BookingPatch, BookingStatus, DEFAULT_BOOKING_PRICE_MINOR, NewBooking,
};
pub use customers::{Customer, name_key};
pub use drivers::{Driver, DriverStatus};
pub use error::EngineError;
pub use estimations::Estimation;
pub use invoices::{
    Invoice, InvoiceItem, InvoiceKind, InvoicePatch, InvoiceStatus, NewInvoice, NewInvoiceItem,
};
pub use ledger::{ExpenseEntry, IncomeEntry, LedgerStatus};
pub use ops::{ConfirmOutcome, Engine, EngineBuilder, PaidOutcome, UpdateBookingOutcome};
pub use partners::Partner;
pub use state::EntityStore;
pub use status::{CombinedStatus, resolve};
pub use store::{DurableStore, FallbackStore, FileStore, MemoryStore, StoreKey};
pub use vehicles::Vehicle;

mod activity;
mod bookings;
mod customers;
mod drivers;
mod error;
mod estimations;
pub mod fixtures;
mod invoices;
mod ledger;
mod ops;
mod partners;
mod state;
mod stats;
mod status;
mod store;
mod vehicles;

pub type ResultEngine<T> = Result<T, EngineError>;
