//! Doctor directory queries.

use crate::core_state::CoreState;
use crate::error::CareError;
use crate::models::Doctor;

use super::reject;

pub fn list_doctors(state: &CoreState) -> Vec<Doctor> {
    state.directory().list().to_vec()
}

pub fn get_doctor(state: &CoreState, doctor_id: &str) -> Result<Doctor, String> {
    state
        .directory()
        .get(doctor_id)
        .cloned()
        .ok_or_else(|| reject(state, CareError::not_found("Doctor", doctor_id)))
}
