// libs/appointment-cell/src/services/store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{Appointment, NewAppointment, SchedulingError};

/// Persistence port for appointments. One record per appointment, keyed
/// by id. List operations yield an empty vec, never an error, when
/// nothing matches.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Persist a new appointment. Rejects with `AlreadyExists` when a
    /// stored appointment matches the candidate field for field.
    async fn create(&self, new: NewAppointment) -> Result<Appointment, SchedulingError>;

    /// Full-field replace of an existing appointment. `NotFound` when
    /// the id is absent.
    async fn edit(&self, appointment: Appointment) -> Result<Appointment, SchedulingError>;

    /// `NotFound` when the id is absent.
    async fn delete(&self, id: &str) -> Result<bool, SchedulingError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>, SchedulingError>;

    /// Exact-match duplicate lookup over every content field. This is
    /// deliberately not an interval-overlap check.
    async fn find_duplicate(
        &self,
        new: &NewAppointment,
    ) -> Result<Option<Appointment>, SchedulingError>;

    async fn list_for_doctor(&self, doctor_id: &str)
        -> Result<Vec<Appointment>, SchedulingError>;

    async fn list_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    async fn list_for_doctor_on(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    async fn list_for_patient_on(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    async fn list_all(&self) -> Result<Vec<Appointment>, SchedulingError>;
}

// ==============================================================================
// SUPABASE-BACKED STORE
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
    auth_token: String,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>, auth_token: &str) -> Self {
        Self {
            supabase,
            auth_token: auth_token.to_string(),
        }
    }

    async fn list(&self, filters: &str) -> Result<Vec<Appointment>, SchedulingError> {
        let path = format!(
            "/rest/v1/appointments?{}&select=*&order=date.asc,start_time.asc",
            filters
        );
        self.supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SchedulingError::StoreFailure(e.to_string()))
    }

    fn appointment_body(appointment: &Appointment) -> Value {
        json!({
            "id": appointment.id,
            "doctor_id": appointment.doctor_id,
            "patient_id": appointment.patient_id,
            "hospital_id": appointment.hospital_id,
            "date": appointment.date.format("%Y-%m-%d").to_string(),
            "start_time": appointment.start_time.format("%H:%M:%S").to_string(),
            "end_time": appointment.end_time.format("%H:%M:%S").to_string(),
            "status": appointment.status.to_string(),
            "description": appointment.description,
            "created_at": appointment.created_at.to_rfc3339(),
            "updated_at": appointment.updated_at.to_rfc3339(),
        })
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, SchedulingError> {
        if let Some(existing) = self.find_duplicate(&new).await? {
            warn!(
                "Duplicate appointment rejected for doctor {} on {}",
                existing.doctor_id, existing.date
            );
            return Err(SchedulingError::AlreadyExists);
        }

        let appointment = new.into_appointment(Uuid::new_v4().to_string());
        debug!("Creating appointment {}", appointment.id);

        let mut rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(&self.auth_token),
                Some(Self::appointment_body(&appointment)),
                return_representation(),
            )
            .await
            .map_err(|e| SchedulingError::StoreFailure(e.to_string()))?;

        if rows.is_empty() {
            return Err(SchedulingError::StoreFailure(
                "insert returned no rows".to_string(),
            ));
        }
        Ok(rows.remove(0))
    }

    async fn edit(&self, mut appointment: Appointment) -> Result<Appointment, SchedulingError> {
        appointment.updated_at = Utc::now();
        let path = format!(
            "/rest/v1/appointments?id=eq.{}",
            urlencoding::encode(&appointment.id)
        );

        let mut rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(&self.auth_token),
                Some(Self::appointment_body(&appointment)),
                return_representation(),
            )
            .await
            .map_err(|e| SchedulingError::StoreFailure(e.to_string()))?;

        if rows.is_empty() {
            return Err(SchedulingError::NotFound);
        }
        Ok(rows.remove(0))
    }

    async fn delete(&self, id: &str) -> Result<bool, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(id));

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                Some(&self.auth_token),
                None,
                return_representation(),
            )
            .await
            .map_err(|e| SchedulingError::StoreFailure(e.to_string()))?;

        if rows.is_empty() {
            return Err(SchedulingError::NotFound);
        }
        Ok(true)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>, SchedulingError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select=*",
            urlencoding::encode(id)
        );
        let mut rows: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SchedulingError::StoreFailure(e.to_string()))?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.remove(0)))
    }

    async fn find_duplicate(
        &self,
        new: &NewAppointment,
    ) -> Result<Option<Appointment>, SchedulingError> {
        let filters = format!(
            "doctor_id=eq.{}&patient_id=eq.{}&hospital_id=eq.{}&date=eq.{}&start_time=eq.{}&end_time=eq.{}&status=eq.{}&description=eq.{}",
            urlencoding::encode(&new.doctor_id),
            urlencoding::encode(&new.patient_id),
            urlencoding::encode(&new.hospital_id),
            new.date.format("%Y-%m-%d"),
            new.start_time.format("%H:%M:%S"),
            new.end_time.format("%H:%M:%S"),
            new.status,
            urlencoding::encode(&new.description),
        );
        let mut rows = self.list(&filters).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.remove(0)))
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.list(&format!("doctor_id=eq.{}", urlencoding::encode(doctor_id)))
            .await
    }

    async fn list_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.list(&format!("patient_id=eq.{}", urlencoding::encode(patient_id)))
            .await
    }

    async fn list_for_doctor_on(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.list(&format!(
            "doctor_id=eq.{}&date=eq.{}",
            urlencoding::encode(doctor_id),
            date.format("%Y-%m-%d")
        ))
        .await
    }

    async fn list_for_patient_on(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.list(&format!(
            "patient_id=eq.{}&date=eq.{}",
            urlencoding::encode(patient_id),
            date.format("%Y-%m-%d")
        ))
        .await
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, SchedulingError> {
        let path = "/rest/v1/appointments?select=*&order=date.asc,start_time.asc";
        self.supabase
            .request(Method::GET, path, Some(&self.auth_token), None)
            .await
            .map_err(|e| SchedulingError::StoreFailure(e.to_string()))
    }
}
