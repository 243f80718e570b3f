//! Appointment commands.
//!
//! - `book_appointment`: patient books a slot (starts pending)
//! - `cancel_appointment`: owning patient or admin cancels
//! - `approve_appointment` / `update_appointment_status`: admin actions
//! - `list_my_appointments`, `list_all_appointments`, `admin_dashboard`: views
//! - `complete_elapsed_appointments`: entry point for the external scheduler

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::error::CareError;
use crate::lifecycle::{self, Actor, AppointmentCounts, AppointmentRow, NewAppointment};
use crate::models::{Appointment, AppointmentStatus};
use crate::notify::Notification;

use super::{reject, require_admin};

/// Booking form input. Patient identity comes from the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub doctor_id: String,
    pub date: String, // YYYY-MM-DD
    pub time: String,
    pub notes: Option<String>,
}

/// Admin summary: stat cards plus the appointment table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub counts: AppointmentCounts,
    pub rows: Vec<AppointmentRow>,
}

/// Book an appointment for the logged-in patient.
pub fn book_appointment(
    state: &CoreState,
    request: BookingRequest,
) -> Result<Appointment, String> {
    let user = state.current_user().map_err(|e| reject(state, e))?;
    if user.is_admin() {
        return Err(reject(
            state,
            CareError::Unauthorized("only patients can book appointments".into()),
        ));
    }

    let appointment = state
        .write_book()
        .map_err(|e| reject(state, e))?
        .create(
            state.directory(),
            NewAppointment {
                doctor_id: request.doctor_id,
                date: request.date,
                time: request.time,
                notes: request.notes,
                patient_id: user.id.clone(),
                patient_name: user.name.clone(),
            },
        )
        .map_err(|e| reject(state, e))?;

    state.log_action(&Actor::for_user(&user), "book", &appointment.id);
    state.notify(Notification::booking_sent(&user));
    Ok(appointment)
}

/// Cancel on behalf of the logged-in user (owner or admin).
pub fn cancel_appointment(
    state: &CoreState,
    appointment_id: &str,
) -> Result<Appointment, String> {
    let actor = state.current_actor().map_err(|e| reject(state, e))?;
    let appointment = state
        .write_book()
        .map_err(|e| reject(state, e))?
        .cancel(&actor, appointment_id)
        .map_err(|e| reject(state, e))?;

    state.log_action(&actor, "cancel", appointment_id);
    state.notify(Notification::cancelled());
    Ok(appointment)
}

/// Admin approval: pending → scheduled.
pub fn approve_appointment(
    state: &CoreState,
    appointment_id: &str,
) -> Result<Appointment, String> {
    set_status(state, appointment_id, AppointmentStatus::Scheduled)
}

/// Admin status override, by wire name (`"scheduled"`, `"cancelled"`, ...).
pub fn update_appointment_status(
    state: &CoreState,
    appointment_id: &str,
    status: &str,
) -> Result<Appointment, String> {
    let status: AppointmentStatus = status.trim().parse().map_err(|e| reject(state, e))?;
    set_status(state, appointment_id, status)
}

fn set_status(
    state: &CoreState,
    appointment_id: &str,
    status: AppointmentStatus,
) -> Result<Appointment, String> {
    let actor = require_admin(state).map_err(|e| reject(state, e))?;
    let appointment = state
        .write_book()
        .map_err(|e| reject(state, e))?
        .update_status(&actor, appointment_id, status)
        .map_err(|e| reject(state, e))?;

    state.log_action(&actor, status.as_str(), appointment_id);
    state.notify(Notification::status_changed(status));
    Ok(appointment)
}

/// The logged-in patient's appointments, in booking order.
pub fn list_my_appointments(state: &CoreState) -> Result<Vec<Appointment>, String> {
    let user = state.current_user().map_err(|e| reject(state, e))?;
    let book = state.read_book().map_err(|e| reject(state, e))?;
    Ok(book.list_for_patient(&user.id))
}

/// Every appointment (admin only).
pub fn list_all_appointments(state: &CoreState) -> Result<Vec<Appointment>, String> {
    require_admin(state).map_err(|e| reject(state, e))?;
    let book = state.read_book().map_err(|e| reject(state, e))?;
    Ok(book.all().to_vec())
}

pub fn admin_dashboard(state: &CoreState) -> Result<AdminDashboard, String> {
    require_admin(state).map_err(|e| reject(state, e))?;
    let book = state.read_book().map_err(|e| reject(state, e))?;
    Ok(AdminDashboard {
        counts: lifecycle::aggregate_counts(book.all()),
        rows: lifecycle::admin_rows(&book, state.directory()),
    })
}

/// Run by the scheduling backend, not by a logged-in user.
pub fn complete_elapsed_appointments(
    state: &CoreState,
    today: NaiveDate,
) -> Result<Vec<String>, String> {
    let completed = state
        .write_book()
        .map_err(|e| reject(state, e))?
        .complete_elapsed(today);
    for id in &completed {
        state.log_action(&Actor::Backend, "completed", id);
    }
    if !completed.is_empty() {
        tracing::info!(count = completed.len(), %today, "Marked elapsed appointments completed");
    }
    Ok(completed)
}
