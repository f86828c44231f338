// libs/appointment-cell/src/services/scheduling.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::directory::SupabaseDirectory;
use shared_database::supabase::SupabaseClient;
use shared_models::directory::ClinicDirectory;

use crate::models::{Appointment, CreateAppointmentRequest, SchedulingError};
use crate::services::store::{AppointmentStore, SupabaseAppointmentStore};
use crate::services::validation;

/// Orchestrates the directory ports, the pure validator and the
/// appointment store into the public scheduling operations.
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
    directory: Arc<dyn ClinicDirectory>,
}

impl AppointmentService {
    pub fn new(config: &AppConfig, auth_token: &str) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            store: Arc::new(SupabaseAppointmentStore::new(
                Arc::clone(&supabase),
                auth_token,
            )),
            directory: Arc::new(SupabaseDirectory::new(supabase, auth_token)),
        }
    }

    /// Wire the service onto explicit ports, used by tests and by any
    /// caller that owns its own persistence.
    pub fn with_ports(
        store: Arc<dyn AppointmentStore>,
        directory: Arc<dyn ClinicDirectory>,
    ) -> Self {
        Self { store, directory }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let new = request.normalize();
        info!(
            "Creating appointment for patient {} with doctor {} on {}",
            new.patient_id, new.doctor_id, new.date
        );

        // Empty ids are an input problem, not a lookup problem, so the
        // pure validator runs before the directory is consulted.
        validation::validate(&new, Utc::now().date_naive())
            .map_err(|e| SchedulingError::InvalidInput(e.to_string()))?;

        self.resolve_references(&new.doctor_id, &new.patient_id, &new.hospital_id)
            .await?;

        if self.store.find_duplicate(&new).await?.is_some() {
            warn!(
                "Rejecting duplicate appointment for patient {} with doctor {}",
                new.patient_id, new.doctor_id
            );
            return Err(SchedulingError::AlreadyExists);
        }

        let appointment = self.store.create(new).await?;
        info!("Appointment {} created", appointment.id);
        Ok(appointment)
    }

    /// Full-field replace. The appointment must already exist and the
    /// replacement must pass the same checks as a fresh appointment.
    /// A persisted edit that leaves the row unchanged is `EditFailed`.
    pub async fn edit_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Editing appointment {}", appointment.id);

        let current = self
            .store
            .get_by_id(&appointment.id)
            .await?
            .ok_or(SchedulingError::NotFound)?;

        validation::validate(&appointment.content(), Utc::now().date_naive())
            .map_err(|e| SchedulingError::InvalidInput(e.to_string()))?;

        let persisted = self.store.edit(appointment).await?;

        if persisted.same_content(&current) {
            warn!("Edit of appointment {} changed nothing", persisted.id);
            return Err(SchedulingError::EditFailed);
        }

        info!("Appointment {} edited", persisted.id);
        Ok(persisted)
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<bool, SchedulingError> {
        if self.store.get_by_id(id).await?.is_none() {
            return Err(SchedulingError::NotFound);
        }
        let deleted = self.store.delete(id).await?;
        info!("Appointment {} deleted", id);
        Ok(deleted)
    }

    pub async fn get_appointment(&self, id: &str) -> Result<Appointment, SchedulingError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(SchedulingError::NotFound)
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        match date {
            Some(date) => self.store.list_for_doctor_on(doctor_id, date).await,
            None => self.store.list_for_doctor(doctor_id).await,
        }
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        match date {
            Some(date) => self.store.list_for_patient_on(patient_id, date).await,
            None => self.store.list_for_patient(patient_id).await,
        }
    }

    pub async fn all_appointments(&self) -> Result<Vec<Appointment>, SchedulingError> {
        self.store.list_all().await
    }

    async fn resolve_references(
        &self,
        doctor_id: &str,
        patient_id: &str,
        hospital_id: &str,
    ) -> Result<(), SchedulingError> {
        if self.directory.find_doctor(doctor_id).await?.is_none() {
            return Err(SchedulingError::ReferenceNotFound {
                entity: "doctor",
                id: doctor_id.to_string(),
            });
        }
        if self.directory.find_patient(patient_id).await?.is_none() {
            return Err(SchedulingError::ReferenceNotFound {
                entity: "patient",
                id: patient_id.to_string(),
            });
        }
        if self.directory.find_hospital(hospital_id).await?.is_none() {
            return Err(SchedulingError::ReferenceNotFound {
                entity: "hospital",
                id: hospital_id.to_string(),
            });
        }
        Ok(())
    }
}
