use std::sync::Arc;

use assert_matches::assert_matches;
use futures::future::join_all;

use doctor_cell::models::SelectionError;
use doctor_cell::services::selection::DoctorSelectionService;
use doctor_cell::testing::InMemorySelectionStore;
use shared_utils::test_utils::{test_doctor, test_hospital, test_patient, InMemoryDirectory};

fn directory_with_patients(patient_ids: &[&str]) -> Arc<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();
    directory.add_hospital(test_hospital("hospital-1"));
    directory.add_doctor(test_doctor("doctor-1", "hospital-1", 5, 0));
    for id in patient_ids {
        directory.add_patient(test_patient(id));
    }
    Arc::new(directory)
}

#[tokio::test]
async fn assign_persists_pair_and_increments_counter() {
    let store = Arc::new(InMemorySelectionStore::new().with_doctor("doctor-1", 5, 0));
    let service =
        DoctorSelectionService::with_ports(store.clone(), directory_with_patients(&["patient-a"]));

    let selection = service.assign_doctor("patient-a", "doctor-1").await.unwrap();

    assert_eq!(selection.patient_id, "patient-a");
    assert_eq!(selection.doctor_id, "doctor-1");
    assert_eq!(store.current_patients("doctor-1"), Some(1));
    assert_eq!(store.pair_count(), 1);
}

#[tokio::test]
async fn full_doctor_rejects_with_capacity_exceeded() {
    // maxPatients=1: the first selection fills the doctor, the second
    // patient is turned away.
    let store = Arc::new(InMemorySelectionStore::new().with_doctor("doctor-1", 1, 0));
    let service = DoctorSelectionService::with_ports(
        store.clone(),
        directory_with_patients(&["patient-a", "patient-b"]),
    );

    service.assign_doctor("patient-a", "doctor-1").await.unwrap();
    assert_eq!(store.current_patients("doctor-1"), Some(1));

    assert_matches!(
        service.assign_doctor("patient-b", "doctor-1").await,
        Err(SelectionError::CapacityExceeded { max_patients: 1, .. })
    );
    assert_eq!(store.current_patients("doctor-1"), Some(1));
    assert_eq!(store.pair_count(), 1);
}

#[tokio::test]
async fn repeated_assignment_of_same_pair_is_rejected() {
    let store = Arc::new(InMemorySelectionStore::new().with_doctor("doctor-1", 5, 0));
    let service =
        DoctorSelectionService::with_ports(store.clone(), directory_with_patients(&["patient-a"]));

    service.assign_doctor("patient-a", "doctor-1").await.unwrap();

    assert_matches!(
        service.assign_doctor("patient-a", "doctor-1").await,
        Err(SelectionError::AlreadyAssigned { .. })
    );
    assert_eq!(store.current_patients("doctor-1"), Some(1));
}

#[tokio::test]
async fn unknown_parties_are_rejected() {
    let store = Arc::new(InMemorySelectionStore::new().with_doctor("doctor-1", 5, 0));
    let service =
        DoctorSelectionService::with_ports(store.clone(), directory_with_patients(&["patient-a"]));

    assert_matches!(
        service.assign_doctor("ghost-patient", "doctor-1").await,
        Err(SelectionError::PatientNotFound(_))
    );
    assert_matches!(
        service.assign_doctor("patient-a", "ghost-doctor").await,
        Err(SelectionError::DoctorNotFound(_))
    );
}

#[tokio::test]
async fn concurrent_assignments_never_breach_the_ceiling() {
    // Ten racing patients against three free slots: exactly three may
    // win, everyone else gets CapacityExceeded.
    let patient_ids: Vec<String> = (0..10).map(|i| format!("patient-{}", i)).collect();
    let id_refs: Vec<&str> = patient_ids.iter().map(String::as_str).collect();

    let store = Arc::new(InMemorySelectionStore::new().with_doctor("doctor-1", 3, 0));
    let service = Arc::new(DoctorSelectionService::with_ports(
        store.clone(),
        directory_with_patients(&id_refs),
    ));

    let tasks = patient_ids.iter().cloned().map(|patient_id| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.assign_doctor(&patient_id, "doctor-1").await })
    });

    let results = join_all(tasks).await;

    let mut successes = 0;
    let mut capacity_rejections = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => successes += 1,
            Err(SelectionError::CapacityExceeded { .. }) => capacity_rejections += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 3);
    assert_eq!(capacity_rejections, 7);
    assert_eq!(store.current_patients("doctor-1"), Some(3));
    assert_eq!(store.pair_count(), 3);
}

#[tokio::test]
async fn stale_pairs_are_dropped_from_listings() {
    let directory = InMemoryDirectory::new();
    directory.add_hospital(test_hospital("hospital-1"));
    directory.add_doctor(test_doctor("doctor-1", "hospital-1", 5, 0));
    directory.add_doctor(test_doctor("doctor-2", "hospital-1", 5, 0));
    directory.add_patient(test_patient("patient-a"));
    let directory = Arc::new(directory);

    let store = Arc::new(
        InMemorySelectionStore::new()
            .with_doctor("doctor-1", 5, 0)
            .with_doctor("doctor-2", 5, 0),
    );
    let service = DoctorSelectionService::with_ports(store.clone(), directory.clone());

    service.assign_doctor("patient-a", "doctor-1").await.unwrap();
    service.assign_doctor("patient-a", "doctor-2").await.unwrap();

    // doctor-2 disappears from the directory; its pair goes stale.
    directory.remove_doctor("doctor-2");

    let doctors = service
        .selected_doctors_for_patient("patient-a")
        .await
        .unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, "doctor-1");

    // Stale patients are dropped the same way.
    directory.remove_patient("patient-a");
    let patients = service
        .selected_patients_for_doctor("doctor-1")
        .await
        .unwrap();
    assert!(patients.is_empty());
}

#[tokio::test]
async fn listings_are_empty_not_errors_when_nothing_matches() {
    let store = Arc::new(InMemorySelectionStore::new().with_doctor("doctor-1", 5, 0));
    let service =
        DoctorSelectionService::with_ports(store.clone(), directory_with_patients(&[]));

    assert!(service
        .selected_doctors_for_patient("nobody")
        .await
        .unwrap()
        .is_empty());
    assert!(service
        .selected_patients_for_doctor("doctor-1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn general_doctor_query_filters_on_flag_and_capacity() {
    let directory = InMemoryDirectory::new();
    directory.add_hospital(test_hospital("hospital-1"));

    let available = test_doctor("doctor-free", "hospital-1", 5, 2);
    directory.add_doctor(available);

    let mut full = test_doctor("doctor-full", "hospital-1", 3, 3);
    full.is_general = true;
    directory.add_doctor(full);

    let mut specialist = test_doctor("doctor-specialist", "hospital-1", 5, 0);
    specialist.is_general = false;
    specialist.specialization = "Cardiology".to_string();
    directory.add_doctor(specialist);

    directory.add_doctor(test_doctor("doctor-elsewhere", "hospital-2", 5, 0));

    let store = Arc::new(InMemorySelectionStore::new());
    let service = DoctorSelectionService::with_ports(store, Arc::new(directory));

    let doctors = service
        .general_doctors_with_capacity("hospital-1")
        .await
        .unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, "doctor-free");
}
