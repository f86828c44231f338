use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==============================================================================
// DIRECTORY ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialization: String,
    pub hospital_id: String,
    pub is_general: bool,
    pub max_patients: i32,
    pub current_patients: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn capacity(&self) -> DoctorCapacity {
        DoctorCapacity {
            doctor_id: self.id.clone(),
            max_patients: self.max_patients,
            current_patients: self.current_patients,
        }
    }

    pub fn has_free_slot(&self) -> bool {
        self.current_patients < self.max_patients
    }
}

/// The workload subset of a doctor row. `current_patients` is only ever
/// moved through the selection store's compare-and-swap commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorCapacity {
    pub doctor_id: String,
    pub max_patients: i32,
    pub current_patients: i32,
}

impl DoctorCapacity {
    pub fn has_free_slot(&self) -> bool {
        self.current_patients < self.max_patients
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// DIRECTORY PORTS
// ==============================================================================

#[derive(Error, Debug, Clone)]
pub enum DirectoryError {
    #[error("Directory lookup failed: {0}")]
    Lookup(String),
}

/// Read-only doctor lookups. The scheduling cells consume these ports;
/// the CRUD layer that owns the rows implements them.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DirectoryError>;

    async fn doctors_for_hospital(&self, hospital_id: &str)
        -> Result<Vec<Doctor>, DirectoryError>;
}

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn find_patient(&self, patient_id: &str) -> Result<Option<Patient>, DirectoryError>;
}

#[async_trait]
pub trait HospitalDirectory: Send + Sync {
    async fn find_hospital(&self, hospital_id: &str)
        -> Result<Option<Hospital>, DirectoryError>;
}

/// Convenience bound for services that need all three lookups.
pub trait ClinicDirectory: DoctorDirectory + PatientDirectory + HospitalDirectory {}

impl<T> ClinicDirectory for T where T: DoctorDirectory + PatientDirectory + HospitalDirectory {}
