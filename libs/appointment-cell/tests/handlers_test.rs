use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{
    doctor_json, hospital_json, patient_json, test_doctor, test_hospital, test_patient,
    JwtTestUtils, TestConfig, TestUser,
};

fn create_test_app(config: &TestConfig) -> Router {
    appointment_routes(config.to_arc())
}

async fn mount_directory_mocks(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            &test_doctor("doctor-1", "hospital-1", 10, 0)
        )])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([patient_json(&test_patient("patient-1"))])),
        )
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/hospitals"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([hospital_json(&test_hospital("hospital-1"))])),
        )
        .mount(mock_server)
        .await;
}

fn create_body(date: chrono::NaiveDate) -> serde_json::Value {
    json!({
        "doctor_id": "doctor-1",
        "patient_id": "patient-1",
        "hospital_id": "hospital-1",
        "date": date.format("%Y-%m-%d").to_string(),
        "start_time": "09:00:00",
        "end_time": "10:00:00"
    })
}

fn appointment_row(id: &str, date: chrono::NaiveDate) -> serde_json::Value {
    json!({
        "id": id,
        "doctor_id": "doctor-1",
        "patient_id": "patient-1",
        "hospital_id": "hospital-1",
        "date": date.format("%Y-%m-%d").to_string(),
        "start_time": "09:00:00",
        "end_time": "10:00:00",
        "status": "pending",
        "description": "Checkup",
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339()
    })
}

fn bearer(config: &TestConfig) -> String {
    let user = TestUser::patient("paula@patients.example");
    format!(
        "Bearer {}",
        JwtTestUtils::create_test_token(&user, &config.jwt_secret, None)
    )
}

#[tokio::test]
async fn create_appointment_succeeds_end_to_end() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());
    let app = create_test_app(&config);

    mount_directory_mocks(&mock_server).await;

    let date = Utc::now().date_naive() + Duration::days(2);

    // Duplicate probe finds nothing.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([appointment_row("appt-1", date)])),
        )
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", bearer(&config))
                .header("Content-Type", "application/json")
                .body(Body::from(create_body(date).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["appointment"]["id"], json!("appt-1"));
}

#[tokio::test]
async fn duplicate_appointment_returns_conflict() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());
    let app = create_test_app(&config);

    mount_directory_mocks(&mock_server).await;

    let date = Utc::now().date_naive() + Duration::days(2);

    // Duplicate probe hits an identical stored row.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([appointment_row("appt-existing", date)])),
        )
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", bearer(&config))
                .header("Content-Type", "application/json")
                .body(Body::from(create_body(date).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_window_returns_bad_request() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());
    let app = create_test_app(&config);

    mount_directory_mocks(&mock_server).await;

    let date = Utc::now().date_naive() + Duration::days(2);
    let mut body = create_body(date);
    body["start_time"] = json!("10:00:00");
    body["end_time"] = json!("09:00:00");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Authorization", bearer(&config))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_appointment_returns_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_base_url(&mock_server.uri());
    let app = create_test_app(&config);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/no-such-appointment")
                .header("Authorization", bearer(&config))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let config = TestConfig::default();
    let app = create_test_app(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/appt-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_tokens_are_unauthorized() {
    let config = TestConfig::default();
    let app = create_test_app(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/appt-1")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
