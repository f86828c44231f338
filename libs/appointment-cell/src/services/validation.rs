// libs/appointment-cell/src/services/validation.rs
//
// Pure appointment checks. No I/O: existence of the referenced entities
// is resolved by the caller, and `today` is passed in.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::NewAppointment;

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Missing reference: {0}")]
    MissingReference(String),
}

pub fn validate(new: &NewAppointment, today: NaiveDate) -> Result<(), ValidationError> {
    validate_references(&new.doctor_id, &new.patient_id, &new.hospital_id)?;
    validate_window(new.date, new.start_time, new.end_time, today)
}

pub fn validate_window(
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if date < today {
        return Err(ValidationError::InvalidWindow(format!(
            "date {} is in the past",
            date
        )));
    }
    if start_time >= end_time {
        return Err(ValidationError::InvalidWindow(format!(
            "start time {} is not before end time {}",
            start_time, end_time
        )));
    }
    Ok(())
}

pub fn validate_references(
    doctor_id: &str,
    patient_id: &str,
    hospital_id: &str,
) -> Result<(), ValidationError> {
    for (name, id) in [
        ("doctor_id", doctor_id),
        ("patient_id", patient_id),
        ("hospital_id", hospital_id),
    ] {
        if id.trim().is_empty() {
            return Err(ValidationError::MissingReference(format!(
                "{} must not be empty",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn accepts_well_formed_window() {
        let today = Utc::now().date_naive();
        assert!(validate_window(today, t(9, 0), t(10, 0), today).is_ok());
    }

    #[test]
    fn rejects_past_date() {
        let today = Utc::now().date_naive();
        let yesterday = today - Duration::days(1);
        assert!(matches!(
            validate_window(yesterday, t(9, 0), t(10, 0), today),
            Err(ValidationError::InvalidWindow(_))
        ));
    }

    #[test]
    fn rejects_inverted_and_empty_windows() {
        let today = Utc::now().date_naive();
        assert!(validate_window(today, t(10, 0), t(9, 0), today).is_err());
        assert!(validate_window(today, t(9, 0), t(9, 0), today).is_err());
    }

    #[test]
    fn today_is_a_valid_date() {
        let today = Utc::now().date_naive();
        assert!(validate_window(today, t(8, 0), t(8, 30), today).is_ok());
    }

    #[test]
    fn rejects_blank_reference_ids() {
        assert!(validate_references("", "p1", "h1").is_err());
        assert!(validate_references("d1", "  ", "h1").is_err());
        assert!(validate_references("d1", "p1", "").is_err());
        assert!(validate_references("d1", "p1", "h1").is_ok());
    }
}
