//! Vehicle records. A flat collection with no lifecycle of its own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub plate: Option<String>,
    pub seats: Option<u32>,
}

impl Vehicle {
    pub fn new(name: &str, plate: Option<&str>, seats: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            plate: plate.map(|p| p.trim().to_string()),
            seats,
        }
    }
}
