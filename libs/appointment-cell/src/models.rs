// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_models::directory::DirectoryError;

pub const DEFAULT_DESCRIPTION: &str = "Checkup";
pub const DEFAULT_DURATION_HOURS: i64 = 1;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub hospital_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Content fields only, id and timestamps excluded. This is the
    /// equality the duplicate check and the edit-changed-nothing check
    /// are defined over.
    pub fn same_content(&self, other: &Appointment) -> bool {
        self.content() == other.content()
    }

    pub fn matches(&self, new: &NewAppointment) -> bool {
        self.content() == *new
    }

    pub fn content(&self) -> NewAppointment {
        NewAppointment {
            doctor_id: self.doctor_id.clone(),
            patient_id: self.patient_id.clone(),
            hospital_id: self.hospital_id.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status.clone(),
            description: self.description.clone(),
        }
    }
}

/// A fully defaulted appointment body, ready for validation and
/// persistence. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: String,
    pub patient_id: String,
    pub hospital_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub description: String,
}

impl NewAppointment {
    pub fn into_appointment(self, id: String) -> Appointment {
        let now = Utc::now();
        Appointment {
            id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            hospital_id: self.hospital_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    OnHold,
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::OnHold => write!(f, "on_hold"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    pub patient_id: String,
    pub hospital_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
}

impl CreateAppointmentRequest {
    /// Apply the documented defaults: one-hour window, "Checkup"
    /// description, pending status.
    ///
    /// Appointments live within a single day. A start late enough that
    /// the defaulted end wraps past midnight produces an inverted
    /// window, which validation then rejects; callers wanting a slot
    /// that late must pass an explicit same-day end time.
    pub fn normalize(self) -> NewAppointment {
        let end_time = self
            .end_time
            .unwrap_or_else(|| self.start_time + Duration::hours(DEFAULT_DURATION_HOURS));

        NewAppointment {
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            hospital_id: self.hospital_id,
            date: self.date,
            start_time: self.start_time,
            end_time,
            status: AppointmentStatus::Pending,
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid appointment: {0}")]
    InvalidInput(String),

    #[error("{entity} {id} does not exist")]
    ReferenceNotFound { entity: &'static str, id: String },

    #[error("An identical appointment already exists")]
    AlreadyExists,

    #[error("Appointment not found")]
    NotFound,

    #[error("Edit left the appointment unchanged")]
    EditFailed,

    #[error("Storage error: {0}")]
    StoreFailure(String),
}

impl From<DirectoryError> for SchedulingError {
    fn from(e: DirectoryError) -> Self {
        SchedulingError::StoreFailure(e.to_string())
    }
}
