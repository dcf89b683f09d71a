//! Driver records.
//!
//! Driver availability is derived from the schedule: any confirmed booking
//! assigned to a driver makes them `Busy`. The stats pass keeps the status
//! and the counters in sync; nothing sets them directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    #[default]
    Available,
    Busy,
}

impl DriverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub status: DriverStatus,
    pub total_bookings: u32,
    pub completed_bookings: u32,
    /// Calendar color assigned by the consuming UI; opaque to the engine.
    pub color: String,
}

impl Driver {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            status: DriverStatus::Available,
            total_bookings: 0,
            completed_bookings: 0,
            color: color.to_string(),
        }
    }
}
