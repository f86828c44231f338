use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, User};
use shared_models::directory::{
    Doctor, DoctorDirectory, DirectoryError, Hospital, HospitalDirectory, Patient,
    PatientDirectory,
};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            supabase_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let claims = JwtClaims {
            sub: user.id.clone(),
            exp: Some(exp.timestamp() as u64),
            email: Some(user.email.clone()),
            role: Some(user.role.clone()),
            iat: Some(now.timestamp() as u64),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("test token encoding failed")
    }

    pub fn auth_header(user: &TestUser, secret: &str) -> String {
        format!("Bearer {}", Self::create_test_token(user, secret, None))
    }
}

// ==============================================================================
// SAMPLE DIRECTORY RECORDS
// ==============================================================================

pub fn test_doctor(id: &str, hospital_id: &str, max_patients: i32, current_patients: i32) -> Doctor {
    Doctor {
        id: id.to_string(),
        first_name: "Greta".to_string(),
        last_name: "Hausmann".to_string(),
        email: format!("{}@clinic.example", id),
        specialization: "General Practice".to_string(),
        hospital_id: hospital_id.to_string(),
        is_general: true,
        max_patients,
        current_patients,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_patient(id: &str) -> Patient {
    Patient {
        id: id.to_string(),
        first_name: "Paula".to_string(),
        last_name: "Novak".to_string(),
        email: format!("{}@patients.example", id),
        date_of_birth: None,
        created_at: Utc::now(),
    }
}

pub fn test_hospital(id: &str) -> Hospital {
    Hospital {
        id: id.to_string(),
        name: "St. Anna Clinic".to_string(),
        address: Some("1 Clinic Way".to_string()),
        created_at: Utc::now(),
    }
}

pub fn doctor_json(doctor: &Doctor) -> serde_json::Value {
    serde_json::to_value(doctor).expect("doctor serializes")
}

pub fn patient_json(patient: &Patient) -> serde_json::Value {
    serde_json::to_value(patient).expect("patient serializes")
}

pub fn hospital_json(hospital: &Hospital) -> serde_json::Value {
    json!(hospital)
}

// ==============================================================================
// IN-MEMORY DIRECTORY FAKE
// ==============================================================================

/// Directory ports over plain maps, for exercising the scheduling cells
/// without a persistence layer.
#[derive(Default)]
pub struct InMemoryDirectory {
    doctors: RwLock<HashMap<String, Doctor>>,
    patients: RwLock<HashMap<String, Patient>>,
    hospitals: RwLock<HashMap<String, Hospital>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_doctor(&self, doctor: Doctor) {
        self.doctors.write().unwrap().insert(doctor.id.clone(), doctor);
    }

    pub fn add_patient(&self, patient: Patient) {
        self.patients.write().unwrap().insert(patient.id.clone(), patient);
    }

    pub fn add_hospital(&self, hospital: Hospital) {
        self.hospitals.write().unwrap().insert(hospital.id.clone(), hospital);
    }

    pub fn remove_doctor(&self, doctor_id: &str) {
        self.doctors.write().unwrap().remove(doctor_id);
    }

    pub fn remove_patient(&self, patient_id: &str) {
        self.patients.write().unwrap().remove(patient_id);
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDirectory {
    async fn find_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DirectoryError> {
        Ok(self.doctors.read().unwrap().get(doctor_id).cloned())
    }

    async fn doctors_for_hospital(
        &self,
        hospital_id: &str,
    ) -> Result<Vec<Doctor>, DirectoryError> {
        Ok(self
            .doctors
            .read()
            .unwrap()
            .values()
            .filter(|d| d.hospital_id == hospital_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PatientDirectory for InMemoryDirectory {
    async fn find_patient(&self, patient_id: &str) -> Result<Option<Patient>, DirectoryError> {
        Ok(self.patients.read().unwrap().get(patient_id).cloned())
    }
}

#[async_trait]
impl HospitalDirectory for InMemoryDirectory {
    async fn find_hospital(
        &self,
        hospital_id: &str,
    ) -> Result<Option<Hospital>, DirectoryError> {
        Ok(self.hospitals.read().unwrap().get(hospital_id).cloned())
    }
}
