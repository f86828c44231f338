use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use shared_models::directory::{
    Doctor, DoctorDirectory, DirectoryError, Hospital, HospitalDirectory, Patient,
    PatientDirectory,
};

use crate::supabase::SupabaseClient;

/// Directory ports backed by the Supabase CRUD tables. The token is
/// captured per request so row-level security applies to every lookup.
pub struct SupabaseDirectory {
    supabase: Arc<SupabaseClient>,
    auth_token: String,
}

impl SupabaseDirectory {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: &str) -> Self {
        Self {
            supabase,
            auth_token: auth_token.to_string(),
        }
    }

    async fn find_one<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Option<T>, DirectoryError> {
        let path = format!("/rest/v1/{}?id=eq.{}&select=*", table, urlencoding::encode(id));
        let mut rows: Vec<T> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| DirectoryError::Lookup(e.to_string()))?;

        if rows.is_empty() {
            debug!("No {} row for id {}", table, id);
            return Ok(None);
        }
        Ok(Some(rows.remove(0)))
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDirectory {
    async fn find_doctor(&self, doctor_id: &str) -> Result<Option<Doctor>, DirectoryError> {
        self.find_one("doctors", doctor_id).await
    }

    async fn doctors_for_hospital(
        &self,
        hospital_id: &str,
    ) -> Result<Vec<Doctor>, DirectoryError> {
        let path = format!(
            "/rest/v1/doctors?hospital_id=eq.{}&select=*",
            urlencoding::encode(hospital_id)
        );
        self.supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| DirectoryError::Lookup(e.to_string()))
    }
}

#[async_trait]
impl PatientDirectory for SupabaseDirectory {
    async fn find_patient(&self, patient_id: &str) -> Result<Option<Patient>, DirectoryError> {
        self.find_one("patients", patient_id).await
    }
}

#[async_trait]
impl HospitalDirectory for SupabaseDirectory {
    async fn find_hospital(
        &self,
        hospital_id: &str,
    ) -> Result<Option<Hospital>, DirectoryError> {
        self.find_one("hospitals", hospital_id).await
    }
}
