use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A booking request and its evolving status.
///
/// Only `status` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn belongs_to(&self, patient_id: &str) -> bool {
        self.patient_id == patient_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_iso_date_and_camel_case() {
        let apt = Appointment {
            id: "a1".into(),
            patient_id: "p1".into(),
            patient_name: "John Doe".into(),
            doctor_id: "d1".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: "09:00".into(),
            status: AppointmentStatus::Pending,
            notes: None,
        };
        let json = serde_json::to_value(&apt).unwrap();
        assert_eq!(json["date"], "2025-06-01");
        assert_eq!(json["patientId"], "p1");
        assert_eq!(json["status"], "pending");
        assert!(json.get("notes").is_none());
    }
}
