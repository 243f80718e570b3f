//! Mock data store: the doctor directory and the demo appointment seed.
//!
//! Loaded once at startup. The doctor list is never mutated afterwards;
//! seed appointments are handed to the lifecycle engine and only change
//! through it.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentStatus, Doctor};

struct DoctorSeed {
    id: &'static str,
    name: &'static str,
    specialty: &'static str,
    availability: &'static [&'static str],
}

const DOCTOR_SEED: &[DoctorSeed] = &[
    DoctorSeed {
        id: "d1",
        name: "Dr. Hariom Dubey",
        specialty: "Cardiologist",
        availability: &["09:00", "10:00", "11:00", "14:00", "15:00"],
    },
    DoctorSeed {
        id: "d2",
        name: "Dr. Anant Gupta",
        specialty: "Dermatologist",
        availability: &["10:00", "11:30", "13:00", "16:00"],
    },
    DoctorSeed {
        id: "d3",
        name: "Dr. Harshit Gupta",
        specialty: "Pediatrician",
        availability: &["08:30", "09:30", "10:30", "12:00", "14:30"],
    },
    DoctorSeed {
        id: "d4",
        name: "Dr. Pranav Pandey",
        specialty: "Neurologist",
        availability: &["11:00", "13:00", "15:00", "17:00"],
    },
    DoctorSeed {
        id: "d5",
        name: "Dr. Ashish Tiwari",
        specialty: "Orthopedic Surgeon",
        availability: &["09:00", "12:00", "14:00", "16:00"],
    },
    DoctorSeed {
        id: "d6",
        name: "Dr. Ayushi Jaiswal",
        specialty: "Gynecologist",
        availability: &["10:00", "11:00", "13:00", "15:00"],
    },
    DoctorSeed {
        id: "d7",
        name: "Dr. Nidhi Yadav",
        specialty: "General Practitioner",
        availability: &["09:30", "10:30", "11:30", "14:30"],
    },
    DoctorSeed {
        id: "d8",
        name: "Dr. Kashish Yadav",
        specialty: "Psychiatrist",
        availability: &["11:00", "12:00", "15:00", "16:30"],
    },
];

/// Immutable doctor reference data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    /// The eight demo specialists.
    pub fn seeded() -> Self {
        let doctors = DOCTOR_SEED
            .iter()
            .enumerate()
            .map(|(i, seed)| Doctor {
                id: seed.id.to_string(),
                name: seed.name.to_string(),
                specialty: seed.specialty.to_string(),
                image: format!("https://picsum.photos/100/100?random={}", i + 1),
                availability: seed.availability.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        Self { doctors }
    }

    pub fn get(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn list(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}

/// Demo appointments placed around `today`: one scheduled today, one
/// pending tomorrow, one cancelled yesterday.
pub fn seed_appointments(today: NaiveDate) -> Vec<Appointment> {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);

    vec![
        Appointment {
            id: "a1".into(),
            patient_id: "p1".into(),
            patient_name: "John Doe".into(),
            doctor_id: "d1".into(),
            date: today,
            time: "09:00".into(),
            status: AppointmentStatus::Scheduled,
            notes: Some("Regular checkup".into()),
        },
        Appointment {
            id: "a2".into(),
            patient_id: "p2".into(),
            patient_name: "Jane Smith".into(),
            doctor_id: "d2".into(),
            date: tomorrow,
            time: "10:00".into(),
            status: AppointmentStatus::Pending,
            notes: Some("Skin rash consultation".into()),
        },
        Appointment {
            id: "a3".into(),
            patient_id: "p3".into(),
            patient_name: "Alice Johnson".into(),
            doctor_id: "d1".into(),
            date: yesterday,
            time: "14:00".into(),
            status: AppointmentStatus::Cancelled,
            notes: Some("Patient requested cancellation".into()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seeded_directory_has_unique_ids() {
        let dir = DoctorDirectory::seeded();
        assert_eq!(dir.len(), 8);
        let ids: HashSet<_> = dir.list().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), dir.len());
    }

    #[test]
    fn lookup_by_id() {
        let dir = DoctorDirectory::seeded();
        let d1 = dir.get("d1").expect("d1 seeded");
        assert_eq!(d1.specialty, "Cardiologist");
        assert!(d1.has_slot("09:00"));
        assert!(!d1.has_slot("09:30"));
        assert!(dir.get("d99").is_none());
    }

    #[test]
    fn every_doctor_has_slots() {
        for doctor in DoctorDirectory::seeded().list() {
            assert!(!doctor.availability.is_empty(), "{} has no slots", doctor.id);
        }
    }

    #[test]
    fn seed_appointments_reference_real_slots() {
        let dir = DoctorDirectory::seeded();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let seeded = seed_appointments(today);
        assert_eq!(seeded.len(), 3);
        for apt in &seeded {
            let doctor = dir.get(&apt.doctor_id).expect("seed doctor exists");
            assert!(doctor.has_slot(&apt.time));
        }
        assert_eq!(seeded[0].date, today);
        assert_eq!(seeded[1].date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(seeded[2].date, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
    }
}
