// libs/doctor-cell/src/services/store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::directory::{Doctor, DoctorCapacity};

use crate::models::{CommitOutcome, SelectedDoctor, SelectionError};

/// Persistence port for selected-doctor pairs and the capacity counter
/// that lives on the doctor row.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn find_capacity(
        &self,
        doctor_id: &str,
    ) -> Result<Option<DoctorCapacity>, SelectionError>;

    async fn pair_exists(
        &self,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<bool, SelectionError>;

    /// Persist the pair AND advance `current_patients` by exactly one,
    /// as a single atomic unit keyed on the counter value the caller
    /// observed. A stale observation yields `Contended` and persists
    /// nothing.
    async fn commit_selection(
        &self,
        patient_id: &str,
        doctor_id: &str,
        observed_patients: i32,
    ) -> Result<CommitOutcome, SelectionError>;

    async fn selections_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<SelectedDoctor>, SelectionError>;

    async fn selections_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<SelectedDoctor>, SelectionError>;
}

// ==============================================================================
// SUPABASE-BACKED STORE
// ==============================================================================

pub struct SupabaseSelectionStore {
    supabase: Arc<SupabaseClient>,
    auth_token: String,
}

impl SupabaseSelectionStore {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: &str) -> Self {
        Self {
            supabase,
            auth_token: auth_token.to_string(),
        }
    }

    /// Conditional counter update: only lands when `current_patients`
    /// still holds the expected value. Returns whether a row was hit.
    async fn swap_counter(
        &self,
        doctor_id: &str,
        expected: i32,
        next: i32,
    ) -> Result<bool, SelectionError> {
        let path = format!(
            "/rest/v1/doctors?id=eq.{}&current_patients=eq.{}",
            urlencoding::encode(doctor_id),
            expected
        );
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.auth_token),
                Some(json!({
                    "current_patients": next,
                    "updated_at": Utc::now().to_rfc3339(),
                })),
                return_representation(),
            )
            .await
            .map_err(|e| SelectionError::StoreFailure(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl SelectionStore for SupabaseSelectionStore {
    async fn find_capacity(
        &self,
        doctor_id: &str,
    ) -> Result<Option<DoctorCapacity>, SelectionError> {
        let path = format!(
            "/rest/v1/doctors?id=eq.{}&select=*",
            urlencoding::encode(doctor_id)
        );
        let rows: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SelectionError::StoreFailure(e.to_string()))?;

        Ok(rows.first().map(Doctor::capacity))
    }

    async fn pair_exists(
        &self,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<bool, SelectionError> {
        let path = format!(
            "/rest/v1/selected_doctors?patient_id=eq.{}&doctor_id=eq.{}&select=*",
            urlencoding::encode(patient_id),
            urlencoding::encode(doctor_id)
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SelectionError::StoreFailure(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn commit_selection(
        &self,
        patient_id: &str,
        doctor_id: &str,
        observed_patients: i32,
    ) -> Result<CommitOutcome, SelectionError> {
        // Reserve the slot first. Losing the swap means another request
        // moved the counter since it was read.
        if !self
            .swap_counter(doctor_id, observed_patients, observed_patients + 1)
            .await?
        {
            debug!("Capacity swap lost for doctor {}", doctor_id);
            return Ok(CommitOutcome::Contended);
        }

        let selection = SelectedDoctor {
            patient_id: patient_id.to_string(),
            doctor_id: doctor_id.to_string(),
            created_at: Utc::now(),
        };

        let insert = self
            .supabase
            .request_with_headers::<Vec<SelectedDoctor>>(
                Method::POST,
                "/rest/v1/selected_doctors",
                Some(&self.auth_token),
                Some(json!({
                    "patient_id": selection.patient_id,
                    "doctor_id": selection.doctor_id,
                    "created_at": selection.created_at.to_rfc3339(),
                })),
                return_representation(),
            )
            .await;

        match insert {
            Ok(mut rows) => Ok(CommitOutcome::Committed(
                rows.pop().unwrap_or(selection),
            )),
            Err(e) => {
                // The slot was reserved but the pair did not land; give
                // the slot back before reporting. The insert error is
                // what the caller hears, even when the rollback itself
                // misses or fails.
                match self
                    .swap_counter(doctor_id, observed_patients + 1, observed_patients)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => error!(
                        "Failed to roll back capacity counter for doctor {}",
                        doctor_id
                    ),
                    Err(rollback) => error!(
                        "Capacity counter rollback for doctor {} errored: {}",
                        doctor_id, rollback
                    ),
                }

                let message = e.to_string();
                if message.starts_with("Conflict") {
                    warn!(
                        "Selection pair ({}, {}) raced a duplicate insert",
                        patient_id, doctor_id
                    );
                    return Ok(CommitOutcome::DuplicatePair);
                }
                Err(SelectionError::StoreFailure(message))
            }
        }
    }

    async fn selections_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<SelectedDoctor>, SelectionError> {
        let path = format!(
            "/rest/v1/selected_doctors?patient_id=eq.{}&select=*",
            urlencoding::encode(patient_id)
        );
        self.supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SelectionError::StoreFailure(e.to_string()))
    }

    async fn selections_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<SelectedDoctor>, SelectionError> {
        let path = format!(
            "/rest/v1/selected_doctors?doctor_id=eq.{}&select=*",
            urlencoding::encode(doctor_id)
        );
        self.supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SelectionError::StoreFailure(e.to_string()))
    }
}
