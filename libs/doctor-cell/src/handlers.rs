// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::directory::{Doctor, Patient};
use shared_models::error::AppError;

use crate::models::{AssignDoctorRequest, SelectionError};
use crate::services::selection::DoctorSelectionService;

fn map_selection_error(e: SelectionError) -> AppError {
    match e {
        SelectionError::DoctorNotFound(_) | SelectionError::PatientNotFound(_) => {
            AppError::NotFound(e.to_string())
        }
        SelectionError::AlreadyAssigned { .. } => AppError::Conflict(e.to_string()),
        SelectionError::CapacityExceeded { .. } => AppError::Conflict(e.to_string()),
        SelectionError::StoreFailure(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn assign_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<AssignDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(
        "User {} assigning doctor {} to patient {}",
        user.id,
        request.doctor_id,
        request.patient_id
    );

    let service = DoctorSelectionService::new(&state, auth.token());
    let selection = service
        .assign_doctor(&request.patient_id, &request.doctor_id)
        .await
        .map_err(map_selection_error)?;

    Ok(Json(json!({
        "success": true,
        "selection": selection
    })))
}

#[axum::debug_handler]
pub async fn selected_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let service = DoctorSelectionService::new(&state, auth.token());
    let doctors = service
        .selected_doctors_for_patient(&patient_id)
        .await
        .map_err(map_selection_error)?;

    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn selected_patients(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let service = DoctorSelectionService::new(&state, auth.token());
    let patients = service
        .selected_patients_for_doctor(&doctor_id)
        .await
        .map_err(map_selection_error)?;

    Ok(Json(patients))
}

#[axum::debug_handler]
pub async fn general_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(hospital_id): Path<String>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let service = DoctorSelectionService::new(&state, auth.token());
    let doctors = service
        .general_doctors_with_capacity(&hospital_id)
        .await
        .map_err(map_selection_error)?;

    Ok(Json(doctors))
}
