use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    Appointment, AppointmentStatus, NewAppointment, SchedulingError,
};
use appointment_cell::services::store::{AppointmentStore, SupabaseAppointmentStore};
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::TestConfig;

fn sample_appointment(id: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        doctor_id: "doctor-1".to_string(),
        patient_id: "patient-1".to_string(),
        hospital_id: "hospital-1".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        status: AppointmentStatus::Pending,
        description: "Checkup".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn store_for(mock_server: &MockServer) -> SupabaseAppointmentStore {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    SupabaseAppointmentStore::new(Arc::new(SupabaseClient::new(&config)), "test-token")
}

#[tokio::test]
async fn get_by_id_parses_the_row() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    let row = sample_appointment("appt-1");
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.appt-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([serde_json::to_value(&row).unwrap()])),
        )
        .mount(&mock_server)
        .await;

    let fetched = store.get_by_id("appt-1").await.unwrap().unwrap();
    assert_eq!(fetched.id, "appt-1");
    assert_eq!(fetched.doctor_id, "doctor-1");
    assert_eq!(fetched.start_time, row.start_time);
    assert_eq!(fetched.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn get_by_id_is_none_when_no_row_matches() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert!(store.get_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn create_checks_for_duplicates_before_inserting() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    // Duplicate probe finds nothing.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let row = sample_appointment("appt-created");
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([serde_json::to_value(&row).unwrap()])),
        )
        .mount(&mock_server)
        .await;

    let created = store.create(row.content()).await.unwrap();
    assert_eq!(created.id, "appt-created");
}

#[tokio::test]
async fn create_rejects_field_for_field_duplicate() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    let row = sample_appointment("appt-existing");
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.doctor-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([serde_json::to_value(&row).unwrap()])),
        )
        .mount(&mock_server)
        .await;

    let duplicate: NewAppointment = row.content();
    assert_matches!(
        store.create(duplicate).await,
        Err(SchedulingError::AlreadyExists)
    );
}

#[tokio::test]
async fn delete_of_absent_row_is_not_found() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert_matches!(
        store.delete("missing").await,
        Err(SchedulingError::NotFound)
    );
}

#[tokio::test]
async fn edit_of_absent_row_is_not_found() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    assert_matches!(
        store.edit(sample_appointment("missing")).await,
        Err(SchedulingError::NotFound)
    );
}

#[tokio::test]
async fn persistence_failures_surface_as_store_failures() {
    let mock_server = MockServer::start().await;
    let store = store_for(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database on fire"))
        .mount(&mock_server)
        .await;

    assert_matches!(
        store.get_by_id("appt-1").await,
        Err(SchedulingError::StoreFailure(_))
    );
}
