//! Appointment lifecycle engine.
//!
//! `AppointmentBook` owns the appointment collection. The only mutations are
//! `create` (always `pending`) and `update_status`, which checks the caller's
//! capability and the transition table before touching anything. A rejected
//! call leaves the book exactly as it was.
//!
//! Transitions:
//! - pending   → scheduled (admin approve)
//! - pending   → cancelled (admin, or owning patient)
//! - scheduled → cancelled (admin, or owning patient)
//! - scheduled → completed (external backend only)

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::DoctorDirectory;
use crate::error::CareError;
use crate::models::{Appointment, AppointmentStatus, User, UserRole};

const DATE_FORMAT: &str = "%Y-%m-%d";
const UNKNOWN_DOCTOR: &str = "Unknown doctor";

// ═══════════════════════════════════════════════════════════
// Capability
// ═══════════════════════════════════════════════════════════

/// Who is asking for a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A logged-in patient; may only cancel their own appointments.
    Patient { id: String },
    /// A logged-in admin; may approve or cancel anything.
    Admin,
    /// An external scheduling process; the only source of `completed`.
    Backend,
}

impl Actor {
    pub fn for_user(user: &User) -> Self {
        match user.role {
            UserRole::Admin => Self::Admin,
            UserRole::Patient => Self::Patient {
                id: user.id.clone(),
            },
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Patient { id } => format!("patient:{id}"),
            Self::Admin => "admin".to_string(),
            Self::Backend => "backend".to_string(),
        }
    }

    fn authorize(
        &self,
        appointment: &Appointment,
        next: AppointmentStatus,
    ) -> Result<(), CareError> {
        match self {
            Self::Backend => Ok(()),
            Self::Admin => match next {
                AppointmentStatus::Completed => Err(CareError::Unauthorized(
                    "completion is recorded by the scheduling backend".into(),
                )),
                AppointmentStatus::Pending => Err(CareError::Unauthorized(
                    "appointments cannot be returned to pending".into(),
                )),
                AppointmentStatus::Scheduled | AppointmentStatus::Cancelled => Ok(()),
            },
            Self::Patient { id } => {
                if next != AppointmentStatus::Cancelled {
                    return Err(CareError::Unauthorized(format!(
                        "patients cannot mark appointments as {next}"
                    )));
                }
                if !appointment.belongs_to(id) {
                    return Err(CareError::Unauthorized(
                        "appointment belongs to another patient".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Input and view types
// ═══════════════════════════════════════════════════════════

/// Raw booking input as submitted by the booking form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub doctor_id: String,
    pub date: String, // YYYY-MM-DD
    pub time: String,
    pub notes: Option<String>,
    pub patient_id: String,
    pub patient_name: String,
}

/// Per-status tallies for the admin summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentCounts {
    pub total: usize,
    pub scheduled: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub completed: usize,
}

/// One line of the admin table: appointment joined with its doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRow {
    pub appointment: Appointment,
    pub doctor_name: String,
    pub doctor_specialty: String,
    pub can_approve: bool,
    pub can_cancel: bool,
}

// ═══════════════════════════════════════════════════════════
// AppointmentBook
// ═══════════════════════════════════════════════════════════

/// Insertion-ordered appointment collection with an id index.
#[derive(Debug, Clone, Default)]
pub struct AppointmentBook {
    appointments: Vec<Appointment>,
    index: HashMap<String, usize>,
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from pre-existing records (seed data). Later duplicates
    /// of an id are dropped.
    pub fn from_records(records: Vec<Appointment>) -> Self {
        let mut book = Self::new();
        for record in records {
            if book.index.contains_key(&record.id) {
                tracing::warn!(id = %record.id, "Skipping duplicate seed appointment");
                continue;
            }
            book.push(record);
        }
        book
    }

    fn push(&mut self, appointment: Appointment) {
        self.index
            .insert(appointment.id.clone(), self.appointments.len());
        self.appointments.push(appointment);
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = format!("apt-{}", Uuid::new_v4());
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    // ── Commands ────────────────────────────────────────────

    /// Validate and record a new booking with status `pending`.
    pub fn create(
        &mut self,
        directory: &DoctorDirectory,
        request: NewAppointment,
    ) -> Result<Appointment, CareError> {
        let doctor_id = request.doctor_id.trim();
        if doctor_id.is_empty() {
            return Err(CareError::Validation("doctor is required".into()));
        }
        let doctor = directory
            .get(doctor_id)
            .ok_or_else(|| CareError::not_found("Doctor", doctor_id))?;

        let date = parse_date(&request.date)?;

        let time = request.time.trim();
        if time.is_empty() {
            return Err(CareError::Validation("time is required".into()));
        }
        if !doctor.has_slot(time) {
            return Err(CareError::Validation(format!(
                "{} has no {time} slot",
                doctor.name
            )));
        }

        let patient_id = request.patient_id.trim();
        let patient_name = request.patient_name.trim();
        if patient_id.is_empty() || patient_name.is_empty() {
            return Err(CareError::Validation("patient identity is required".into()));
        }

        let notes = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let appointment = Appointment {
            id: self.fresh_id(),
            patient_id: patient_id.to_string(),
            patient_name: patient_name.to_string(),
            doctor_id: doctor.id.clone(),
            date,
            time: time.to_string(),
            status: AppointmentStatus::Pending,
            notes,
        };
        self.push(appointment.clone());

        tracing::info!(
            id = %appointment.id,
            doctor = %appointment.doctor_id,
            date = %appointment.date,
            time = %appointment.time,
            "Appointment requested"
        );
        Ok(appointment)
    }

    /// Move an appointment to `next` on behalf of `actor`.
    ///
    /// Checks, in order: the id exists, the actor may request `next` on this
    /// appointment, the transition table allows it. Only `status` changes.
    pub fn update_status(
        &mut self,
        actor: &Actor,
        appointment_id: &str,
        next: AppointmentStatus,
    ) -> Result<Appointment, CareError> {
        let pos = *self
            .index
            .get(appointment_id)
            .ok_or_else(|| CareError::not_found("Appointment", appointment_id))?;
        let appointment = &mut self.appointments[pos];

        actor.authorize(appointment, next)?;

        let current = appointment.status;
        if !current.can_transition_to(next) {
            return Err(CareError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        appointment.status = next;
        tracing::info!(
            id = %appointment.id,
            actor = %actor.label(),
            from = %current,
            to = %next,
            "Appointment status changed"
        );
        Ok(appointment.clone())
    }

    pub fn approve(
        &mut self,
        actor: &Actor,
        appointment_id: &str,
    ) -> Result<Appointment, CareError> {
        self.update_status(actor, appointment_id, AppointmentStatus::Scheduled)
    }

    pub fn cancel(
        &mut self,
        actor: &Actor,
        appointment_id: &str,
    ) -> Result<Appointment, CareError> {
        self.update_status(actor, appointment_id, AppointmentStatus::Cancelled)
    }

    pub fn complete(
        &mut self,
        actor: &Actor,
        appointment_id: &str,
    ) -> Result<Appointment, CareError> {
        self.update_status(actor, appointment_id, AppointmentStatus::Completed)
    }

    /// Mark every scheduled appointment dated before `today` as completed.
    /// Returns the ids that changed.
    pub fn complete_elapsed(&mut self, today: NaiveDate) -> Vec<String> {
        let due: Vec<String> = self
            .appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled && a.date < today)
            .map(|a| a.id.clone())
            .collect();

        due.into_iter()
            .filter(|id| self.complete(&Actor::Backend, id).is_ok())
            .collect()
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn all(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, appointment_id: &str) -> Option<&Appointment> {
        self.index
            .get(appointment_id)
            .map(|&pos| &self.appointments[pos])
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Appointments owned by `patient_id`, in booking order.
    pub fn list_for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.belongs_to(patient_id))
            .cloned()
            .collect()
    }

    pub fn list_by_status(&self, status: AppointmentStatus) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect()
    }

    pub fn list_for_doctor(&self, doctor_id: &str) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════
// Derived views
// ═══════════════════════════════════════════════════════════

/// Count appointments by status. Empty input yields all zeros.
pub fn aggregate_counts(appointments: &[Appointment]) -> AppointmentCounts {
    appointments
        .iter()
        .fold(AppointmentCounts::default(), |mut counts, apt| {
            counts.total += 1;
            match apt.status {
                AppointmentStatus::Scheduled => counts.scheduled += 1,
                AppointmentStatus::Pending => counts.pending += 1,
                AppointmentStatus::Cancelled => counts.cancelled += 1,
                AppointmentStatus::Completed => counts.completed += 1,
            }
            counts
        })
}

/// Whether a patient is offered a cancel action for this status.
pub fn patient_cancellable(status: AppointmentStatus) -> bool {
    status.can_transition_to(AppointmentStatus::Cancelled)
}

/// Admin table rows, in booking order.
pub fn admin_rows(book: &AppointmentBook, directory: &DoctorDirectory) -> Vec<AppointmentRow> {
    book.all()
        .iter()
        .map(|apt| {
            let (doctor_name, doctor_specialty) = match directory.get(&apt.doctor_id) {
                Some(doctor) => (doctor.name.clone(), doctor.specialty.clone()),
                None => (UNKNOWN_DOCTOR.to_string(), String::new()),
            };
            AppointmentRow {
                doctor_name,
                doctor_specialty,
                can_approve: apt.status == AppointmentStatus::Pending,
                can_cancel: apt.status.can_transition_to(AppointmentStatus::Cancelled),
                appointment: apt.clone(),
            }
        })
        .collect()
}

fn parse_date(raw: &str) -> Result<NaiveDate, CareError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CareError::Validation("date is required".into()));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| CareError::Validation(format!("invalid date '{raw}', use YYYY-MM-DD")))
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
