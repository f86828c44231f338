// libs/doctor-cell/src/services/selection.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::directory::SupabaseDirectory;
use shared_database::supabase::SupabaseClient;
use shared_models::directory::{ClinicDirectory, Doctor, Patient};

use crate::models::{CommitOutcome, SelectedDoctor, SelectionError};
use crate::services::store::{SelectionStore, SupabaseSelectionStore};

/// Assigns doctors to patients against the capacity ceiling. The
/// check-then-increment on `current_patients` is the one read-modify-
/// write in the system that must be serialized per doctor; it runs as a
/// compare-and-swap commit in the store, retried here on contention.
pub struct DoctorSelectionService {
    store: Arc<dyn SelectionStore>,
    directory: Arc<dyn ClinicDirectory>,
}

impl DoctorSelectionService {
    pub fn new(config: &AppConfig, auth_token: &str) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            store: Arc::new(SupabaseSelectionStore::new(
                Arc::clone(&supabase),
                auth_token,
            )),
            directory: Arc::new(SupabaseDirectory::new(supabase, auth_token)),
        }
    }

    pub fn with_ports(
        store: Arc<dyn SelectionStore>,
        directory: Arc<dyn ClinicDirectory>,
    ) -> Self {
        Self { store, directory }
    }

    pub async fn assign_doctor(
        &self,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<SelectedDoctor, SelectionError> {
        debug!("Assigning doctor {} to patient {}", doctor_id, patient_id);

        if self.directory.find_patient(patient_id).await?.is_none() {
            return Err(SelectionError::PatientNotFound(patient_id.to_string()));
        }

        let mut attempt: u64 = 0;
        loop {
            if self.store.pair_exists(patient_id, doctor_id).await? {
                return Err(SelectionError::AlreadyAssigned {
                    patient_id: patient_id.to_string(),
                    doctor_id: doctor_id.to_string(),
                });
            }

            let capacity = self
                .store
                .find_capacity(doctor_id)
                .await?
                .ok_or_else(|| SelectionError::DoctorNotFound(doctor_id.to_string()))?;

            if !capacity.has_free_slot() {
                warn!(
                    "Doctor {} at capacity ({}/{})",
                    doctor_id, capacity.current_patients, capacity.max_patients
                );
                return Err(SelectionError::CapacityExceeded {
                    doctor_id: doctor_id.to_string(),
                    max_patients: capacity.max_patients,
                });
            }

            match self
                .store
                .commit_selection(patient_id, doctor_id, capacity.current_patients)
                .await?
            {
                CommitOutcome::Committed(selection) => {
                    info!(
                        "Patient {} assigned to doctor {} ({} of {} slots used)",
                        patient_id,
                        doctor_id,
                        capacity.current_patients + 1,
                        capacity.max_patients
                    );
                    return Ok(selection);
                }
                CommitOutcome::DuplicatePair => {
                    return Err(SelectionError::AlreadyAssigned {
                        patient_id: patient_id.to_string(),
                        doctor_id: doctor_id.to_string(),
                    });
                }
                CommitOutcome::Contended => {
                    // A lost swap means another assignment advanced the
                    // counter. That can happen at most max_patients
                    // times before the capacity check rejects, so the
                    // loop terminates.
                    attempt += 1;
                    debug!(
                        "Capacity contention for doctor {}, retry {}",
                        doctor_id, attempt
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(10 * attempt.min(5)))
                        .await;
                }
            }
        }
    }

    /// Doctors the patient has selected, resolved through the
    /// directory. Pairs whose doctor no longer resolves are stale and
    /// silently dropped.
    pub async fn selected_doctors_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Doctor>, SelectionError> {
        let pairs = self.store.selections_for_patient(patient_id).await?;

        let mut doctors = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match self.directory.find_doctor(&pair.doctor_id).await? {
                Some(doctor) => doctors.push(doctor),
                None => debug!("Dropping stale selection of doctor {}", pair.doctor_id),
            }
        }
        Ok(doctors)
    }

    /// Patients assigned to the doctor, stale pairs dropped the same
    /// way.
    pub async fn selected_patients_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<Patient>, SelectionError> {
        let pairs = self.store.selections_for_doctor(doctor_id).await?;

        let mut patients = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match self.directory.find_patient(&pair.patient_id).await? {
                Some(patient) => patients.push(patient),
                None => debug!("Dropping stale selection by patient {}", pair.patient_id),
            }
        }
        Ok(patients)
    }

    /// General-practice doctors of a hospital that can still take
    /// patients.
    pub async fn general_doctors_with_capacity(
        &self,
        hospital_id: &str,
    ) -> Result<Vec<Doctor>, SelectionError> {
        let doctors = self.directory.doctors_for_hospital(hospital_id).await?;
        Ok(doctors
            .into_iter()
            .filter(|d| d.is_general && d.has_free_slot())
            .collect())
    }
}
