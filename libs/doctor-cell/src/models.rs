// libs/doctor-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::directory::DirectoryError;

// ==============================================================================
// DOCTOR SELECTION MODELS
// ==============================================================================

/// A patient's chosen doctor. One row per `(patient_id, doctor_id)`
/// pair; creating one is what moves the doctor's `current_patients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedDoctor {
    pub patient_id: String,
    pub doctor_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDoctorRequest {
    pub patient_id: String,
    pub doctor_id: String,
}

/// Outcome of the atomic pair-insert-plus-counter-increment commit.
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// Pair persisted and counter moved by exactly one.
    Committed(SelectedDoctor),
    /// Another writer advanced the counter since it was observed;
    /// nothing was persisted.
    Contended,
    /// The pair already existed; the counter was left untouched.
    DuplicatePair,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SelectionError {
    #[error("Doctor {0} does not exist")]
    DoctorNotFound(String),

    #[error("Patient {0} does not exist")]
    PatientNotFound(String),

    #[error("Patient {patient_id} has already selected doctor {doctor_id}")]
    AlreadyAssigned {
        patient_id: String,
        doctor_id: String,
    },

    #[error("Doctor {doctor_id} is at full capacity ({max_patients} patients)")]
    CapacityExceeded {
        doctor_id: String,
        max_patients: i32,
    },

    #[error("Storage error: {0}")]
    StoreFailure(String),
}

impl From<DirectoryError> for SelectionError {
    fn from(e: DirectoryError) -> Self {
        SelectionError::StoreFailure(e.to_string())
    }
}
