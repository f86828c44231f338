// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{Appointment, CreateAppointmentRequest, SchedulingError};
use crate::services::scheduling::AppointmentService;

#[derive(Debug, Deserialize)]
pub struct DateFilter {
    pub date: Option<NaiveDate>,
}

fn map_scheduling_error(e: SchedulingError) -> AppError {
    match e {
        SchedulingError::InvalidInput(msg) => AppError::ValidationError(msg),
        SchedulingError::ReferenceNotFound { .. } => AppError::NotFound(e.to_string()),
        SchedulingError::AlreadyExists => AppError::Conflict(e.to_string()),
        SchedulingError::NotFound => AppError::NotFound(e.to_string()),
        SchedulingError::EditFailed => AppError::Conflict(e.to_string()),
        SchedulingError::StoreFailure(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!("User {} creating appointment", user.id);

    let service = AppointmentService::new(&state, auth.token());
    let appointment = service
        .create_appointment(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentService::new(&state, auth.token());
    let appointment = service
        .get_appointment(&appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn edit_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    Json(mut appointment): Json<Appointment>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!("User {} editing appointment {}", user.id, appointment_id);

    // The path owns the identity; the body carries the replacement.
    appointment.id = appointment_id;

    let service = AppointmentService::new(&state, auth.token());
    let appointment = service
        .edit_appointment(appointment)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("User {} deleting appointment {}", user.id, appointment_id);

    let service = AppointmentService::new(&state, auth.token());
    let deleted = service
        .delete_appointment(&appointment_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "deleted": deleted
    })))
}

#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<String>,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let service = AppointmentService::new(&state, auth.token());
    let appointments = service
        .appointments_for_doctor(&doctor_id, filter.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn patient_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(patient_id): Path<String>,
    Query(filter): Query<DateFilter>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let service = AppointmentService::new(&state, auth.token());
    let appointments = service
        .appointments_for_patient(&patient_id, filter.date)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let service = AppointmentService::new(&state, auth.token());
    let appointments = service
        .all_appointments()
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(appointments))
}
