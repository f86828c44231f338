// libs/doctor-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/selections", post(handlers::assign_doctor))
        .route("/selections/patients/{patient_id}", get(handlers::selected_doctors))
        .route("/selections/doctors/{doctor_id}", get(handlers::selected_patients))
        .route("/general/{hospital_id}", get(handlers::general_doctors))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
