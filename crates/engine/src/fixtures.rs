//! Built-in demo dataset.
//!
//! Seeded per collection on first start and whenever a persisted blob is
//! missing or undecodable. Ids are fixed literals so reseeding is
//! deterministic and tests can reference records directly.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::{Uuid, uuid};

use crate::{
    bookings::{Booking, BookingKind, BookingStatus},
    customers::Customer,
    drivers::{Driver, DriverStatus},
    estimations::Estimation,
    invoices::{Invoice, InvoiceItem, InvoiceKind, InvoiceStatus},
    ledger::{ExpenseEntry, IncomeEntry, LedgerStatus},
    partners::Partner,
    vehicles::Vehicle,
};

pub const DEMO_CUSTOMER_ANNA: Uuid = uuid!("6a1f32a0-4c0e-4c7a-9e12-0d8f5b2a1c01");
pub const DEMO_CUSTOMER_BELLAVISTA: Uuid = uuid!("6a1f32a0-4c0e-4c7a-9e12-0d8f5b2a1c02");
pub const DEMO_DRIVER_MARCO: Uuid = uuid!("7b2e41b1-5d1f-4d8b-8f23-1e9f6c3b2d01");
pub const DEMO_DRIVER_LUCA: Uuid = uuid!("7b2e41b1-5d1f-4d8b-8f23-1e9f6c3b2d02");
pub const DEMO_VEHICLE_VCLASS: Uuid = uuid!("8c3f50c2-6e20-4e9c-9034-2f0a7d4c3e01");
pub const DEMO_VEHICLE_OCTAVIA: Uuid = uuid!("8c3f50c2-6e20-4e9c-9034-2f0a7d4c3e02");
pub const DEMO_BOOKING_AIRPORT: Uuid = uuid!("9d4061d3-7f31-4fad-a145-301b8e5d4f01");
pub const DEMO_BOOKING_LAKE_TOUR: Uuid = uuid!("9d4061d3-7f31-4fad-a145-301b8e5d4f02");
pub const DEMO_INVOICE_BELLAVISTA: Uuid = uuid!("ae5172e4-8042-40be-b256-412c9f6e5a01");
pub const DEMO_PARTNER_LARIO: Uuid = uuid!("bf6283f5-9153-41cf-c367-523da07f6b01");
pub const DEMO_INCOME_FEBRUARY: Uuid = uuid!("c07394a6-a264-42da-d478-634eb1807c01");
pub const DEMO_EXPENSE_FUEL: Uuid = uuid!("d184a5b7-b375-43eb-e589-745fc2918d01");
pub const DEMO_ESTIMATION_WEDDING: Uuid = uuid!("e295b6c8-c486-44fc-f69a-8560d3a29e01");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn time(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

fn datetime(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap_or_default().and_utc()
}

pub fn demo_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: DEMO_CUSTOMER_ANNA,
            name: String::from("Anna Bianchi"),
            email: Some(String::from("anna.bianchi@example.com")),
            phone: Some(String::from("+39 333 123 4567")),
            total_bookings: 0,
            total_spent_minor: 0,
            total_invoices: 0,
            last_booking: None,
            last_invoice: None,
        },
        Customer {
            id: DEMO_CUSTOMER_BELLAVISTA,
            name: String::from("Hotel Bellavista"),
            email: Some(String::from("booking@bellavista.example")),
            phone: Some(String::from("+39 031 556 7788")),
            total_bookings: 0,
            total_spent_minor: 0,
            total_invoices: 0,
            last_booking: None,
            last_invoice: None,
        },
    ]
}

pub fn demo_drivers() -> Vec<Driver> {
    vec![
        Driver {
            id: DEMO_DRIVER_MARCO,
            name: String::from("Marco Rossi"),
            status: DriverStatus::Available,
            total_bookings: 0,
            completed_bookings: 0,
            color: String::from("#2563eb"),
        },
        Driver {
            id: DEMO_DRIVER_LUCA,
            name: String::from("Luca Greco"),
            status: DriverStatus::Available,
            total_bookings: 0,
            completed_bookings: 0,
            color: String::from("#16a34a"),
        },
    ]
}

pub fn demo_vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: DEMO_VEHICLE_VCLASS,
            name: String::from("Mercedes V-Class"),
            plate: Some(String::from("GK482XK")),
            seats: Some(7),
        },
        Vehicle {
            id: DEMO_VEHICLE_OCTAVIA,
            name: String::from("Skoda Octavia"),
            plate: Some(String::from("GF915TD")),
            seats: Some(4),
        },
    ]
}

pub fn demo_bookings() -> Vec<Booking> {
    vec![
        Booking {
            id: DEMO_BOOKING_AIRPORT,
            customer: String::from("Anna Bianchi"),
            pickup: String::from("Malpensa T1"),
            destination: String::from("Como"),
            kind: BookingKind::Single,
            date: date(2026, 9, 4),
            time: time(10, 30),
            tour_start: None,
            tour_end: None,
            driver: Some(String::from("Marco Rossi")),
            vehicle: Some(String::from("Mercedes V-Class")),
            partner: None,
            price_minor: Some(12_000),
            status: BookingStatus::Pending,
            has_return: true,
            pickup_completed: false,
            return_completed: false,
            created_at: datetime(2026, 8, 20, 9),
        },
        Booking {
            id: DEMO_BOOKING_LAKE_TOUR,
            customer: String::from("Hotel Bellavista"),
            pickup: String::from("Hotel Bellavista"),
            destination: String::from("Bellagio"),
            kind: BookingKind::Tour,
            date: date(2026, 9, 12),
            time: None,
            tour_start: Some(date(2026, 9, 12)),
            tour_end: Some(date(2026, 9, 13)),
            driver: Some(String::from("Luca Greco")),
            vehicle: Some(String::from("Skoda Octavia")),
            partner: None,
            price_minor: Some(68_000),
            status: BookingStatus::Pending,
            has_return: false,
            pickup_completed: false,
            return_completed: false,
            created_at: datetime(2026, 8, 21, 15),
        },
    ]
}

pub fn demo_invoices() -> Vec<Invoice> {
    vec![Invoice {
        id: DEMO_INVOICE_BELLAVISTA,
        booking_id: None,
        customer: String::from("Hotel Bellavista"),
        customer_email: Some(String::from("booking@bellavista.example")),
        kind: InvoiceKind::Transport,
        amount_minor: 9_000,
        items: vec![InvoiceItem::new(
            String::from("Guest transfers, August"),
            2,
            4_500,
        )],
        date: date(2026, 8, 31),
        status: InvoiceStatus::Pending,
        editable: true,
        sent_at: None,
        sent_to: None,
        paid_date: None,
    }]
}

pub fn demo_partners() -> Vec<Partner> {
    vec![Partner {
        id: DEMO_PARTNER_LARIO,
        name: String::from("Lario Transfer SRL"),
        email: Some(String::from("dispatch@lariotransfer.example")),
        phone: Some(String::from("+39 031 889 9001")),
    }]
}

pub fn demo_income() -> Vec<IncomeEntry> {
    vec![IncomeEntry {
        id: DEMO_INCOME_FEBRUARY,
        date: date(2026, 7, 28),
        description: String::from("Payment of invoice for Anna Bianchi"),
        category: String::from("Transport"),
        amount_minor: 4_500,
        invoice_id: None,
        customer: Some(String::from("Anna Bianchi")),
        status: LedgerStatus::Received,
    }]
}

pub fn demo_expenses() -> Vec<ExpenseEntry> {
    vec![ExpenseEntry {
        id: DEMO_EXPENSE_FUEL,
        date: date(2026, 8, 18),
        description: String::from("Fuel, V-Class"),
        category: String::from("Fuel"),
        amount_minor: 8_200,
        vendor: Some(String::from("Q8 Como Nord")),
    }]
}

pub fn demo_estimations() -> Vec<Estimation> {
    vec![Estimation {
        id: DEMO_ESTIMATION_WEDDING,
        customer: String::from("Famiglia Colombo"),
        pickup: String::from("Cernobbio"),
        destination: String::from("Villa d'Este"),
        date: date(2026, 10, 3),
        price_minor: 35_000,
        notes: Some(String::from("Wedding shuttle, two runs")),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_ids_are_stable_and_distinct() {
        let first = demo_bookings();
        let second = demo_bookings();
        assert_eq!(first, second);

        let mut ids: Vec<Uuid> = first.iter().map(|b| b.id).collect();
        ids.extend(demo_invoices().iter().map(|i| i.id));
        ids.extend(demo_customers().iter().map(|c| c.id));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn demo_bookings_start_pending() {
        assert!(
            demo_bookings()
                .iter()
                .all(|b| b.status == BookingStatus::Pending)
        );
    }
}
