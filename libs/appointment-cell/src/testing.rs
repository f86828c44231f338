// libs/appointment-cell/src/testing.rs
//
// In-memory appointment store for exercising the scheduling service
// without a persistence layer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{Appointment, NewAppointment, SchedulingError};
use crate::services::store::AppointmentStore;

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    rows: Mutex<HashMap<String, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, new: NewAppointment) -> Result<Appointment, SchedulingError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|a| a.matches(&new)) {
            return Err(SchedulingError::AlreadyExists);
        }
        let appointment = new.into_appointment(Uuid::new_v4().to_string());
        rows.insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    async fn edit(&self, mut appointment: Appointment) -> Result<Appointment, SchedulingError> {
        let mut rows = self.rows.lock().unwrap();
        let existing = rows
            .get(&appointment.id)
            .ok_or(SchedulingError::NotFound)?;
        appointment.created_at = existing.created_at;
        appointment.updated_at = Utc::now();
        rows.insert(appointment.id.clone(), appointment.clone());
        Ok(appointment)
    }

    async fn delete(&self, id: &str) -> Result<bool, SchedulingError> {
        let mut rows = self.rows.lock().unwrap();
        rows.remove(id).ok_or(SchedulingError::NotFound)?;
        Ok(true)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>, SchedulingError> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn find_duplicate(
        &self,
        new: &NewAppointment,
    ) -> Result<Option<Appointment>, SchedulingError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|a| a.matches(new))
            .cloned())
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.filtered(|a| a.doctor_id == doctor_id))
    }

    async fn list_for_patient(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.filtered(|a| a.patient_id == patient_id))
    }

    async fn list_for_doctor_on(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.filtered(|a| a.doctor_id == doctor_id && a.date == date))
    }

    async fn list_for_patient_on(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.filtered(|a| a.patient_id == patient_id && a.date == date))
    }

    async fn list_all(&self) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.filtered(|_| true))
    }
}

impl InMemoryAppointmentStore {
    fn filtered(&self, keep: impl Fn(&Appointment) -> bool) -> Vec<Appointment> {
        let mut rows: Vec<Appointment> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| keep(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
        rows
    }
}
