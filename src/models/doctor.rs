use serde::{Deserialize, Serialize};

/// Read-only provider record with its bookable time slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub image: String,
    /// Ordered slot labels, e.g. `"09:00"`.
    pub availability: Vec<String>,
}

impl Doctor {
    pub fn has_slot(&self, time: &str) -> bool {
        self.availability.iter().any(|slot| slot == time)
    }
}
