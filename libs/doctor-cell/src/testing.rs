// libs/doctor-cell/src/testing.rs
//
// In-memory selection store. The commit is atomic under one lock, which
// is exactly the guarantee the real store provides through its
// conditional update.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use shared_models::directory::DoctorCapacity;

use crate::models::{CommitOutcome, SelectedDoctor, SelectionError};
use crate::services::store::SelectionStore;

#[derive(Default)]
struct State {
    capacities: HashMap<String, DoctorCapacity>,
    pairs: Vec<SelectedDoctor>,
}

#[derive(Default)]
pub struct InMemorySelectionStore {
    state: Mutex<State>,
}

impl InMemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctor(self, doctor_id: &str, max_patients: i32, current_patients: i32) -> Self {
        self.state.lock().unwrap().capacities.insert(
            doctor_id.to_string(),
            DoctorCapacity {
                doctor_id: doctor_id.to_string(),
                max_patients,
                current_patients,
            },
        );
        self
    }

    pub fn current_patients(&self, doctor_id: &str) -> Option<i32> {
        self.state
            .lock()
            .unwrap()
            .capacities
            .get(doctor_id)
            .map(|c| c.current_patients)
    }

    pub fn pair_count(&self) -> usize {
        self.state.lock().unwrap().pairs.len()
    }
}

#[async_trait]
impl SelectionStore for InMemorySelectionStore {
    async fn find_capacity(
        &self,
        doctor_id: &str,
    ) -> Result<Option<DoctorCapacity>, SelectionError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .capacities
            .get(doctor_id)
            .cloned())
    }

    async fn pair_exists(
        &self,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<bool, SelectionError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pairs
            .iter()
            .any(|p| p.patient_id == patient_id && p.doctor_id == doctor_id))
    }

    async fn commit_selection(
        &self,
        patient_id: &str,
        doctor_id: &str,
        observed_patients: i32,
    ) -> Result<CommitOutcome, SelectionError> {
        let mut state = self.state.lock().unwrap();

        if state
            .pairs
            .iter()
            .any(|p| p.patient_id == patient_id && p.doctor_id == doctor_id)
        {
            return Ok(CommitOutcome::DuplicatePair);
        }

        let capacity = state
            .capacities
            .get_mut(doctor_id)
            .ok_or_else(|| SelectionError::StoreFailure(format!("no doctor row {}", doctor_id)))?;

        if capacity.current_patients != observed_patients {
            return Ok(CommitOutcome::Contended);
        }

        capacity.current_patients += 1;
        let selection = SelectedDoctor {
            patient_id: patient_id.to_string(),
            doctor_id: doctor_id.to_string(),
            created_at: Utc::now(),
        };
        state.pairs.push(selection.clone());
        Ok(CommitOutcome::Committed(selection))
    }

    async fn selections_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<SelectedDoctor>, SelectionError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pairs
            .iter()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn selections_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<SelectedDoctor>, SelectionError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pairs
            .iter()
            .filter(|p| p.doctor_id == doctor_id)
            .cloned()
            .collect())
    }
}
