use super::common::*;
use crate::workflows::allocation::domain::HouseStatus;
use crate::workflows::allocation::intake::{IntakeGuard, ValidationError, MAX_APPLICANT_AGE};

#[test]
fn submission_text_is_trimmed_and_blank_contacts_dropped() {
    let mut raw = submission("  Ali Khan  ", 45, 5, 25_000.0);
    raw.contact.phone = " 0300-1234567 ".to_string();
    raw.contact.email = Some("   ".to_string());

    let checked = IntakeGuard::default()
        .check_submission(raw)
        .expect("valid submission");

    assert_eq!(checked.name, "Ali Khan");
    assert_eq!(checked.contact.phone, "0300-1234567");
    assert_eq!(checked.contact.email, None);
    assert_eq!(checked.contact.address.as_deref(), Some("12 Mall Road"));
}

#[test]
fn submission_requires_name_and_phone() {
    let guard = IntakeGuard::default();

    assert_eq!(
        guard.check_submission(submission("   ", 30, 2, 10_000.0)),
        Err(ValidationError::MissingName)
    );

    let mut no_phone = submission("Sara Ahmed", 30, 2, 10_000.0);
    no_phone.contact.phone = String::new();
    assert_eq!(
        guard.check_submission(no_phone),
        Err(ValidationError::MissingContact)
    );
}

#[test]
fn submission_numeric_ranges_are_enforced() {
    let guard = IntakeGuard::default();

    assert!(guard
        .check_submission(submission("Elder", MAX_APPLICANT_AGE, 1, 0.0))
        .is_ok());
    assert_eq!(
        guard.check_submission(submission("Too Old", MAX_APPLICANT_AGE + 1, 1, 0.0)),
        Err(ValidationError::AgeOutOfRange {
            age: MAX_APPLICANT_AGE + 1,
            max: MAX_APPLICANT_AGE,
        })
    );
    assert_eq!(
        guard.check_submission(submission("Nobody", 30, 0, 0.0)),
        Err(ValidationError::EmptyHousehold)
    );
    assert_eq!(
        guard.check_submission(submission("Negative", 30, 2, -1.0)),
        Err(ValidationError::InvalidIncome(-1.0))
    );
    assert!(matches!(
        guard.check_submission(submission("Infinite", 30, 2, f64::INFINITY)),
        Err(ValidationError::InvalidIncome(_))
    ));
}

#[test]
fn listing_defaults_facilities_and_normalises_type() {
    let house = IntakeGuard::default()
        .check_listing(listing(Some(" H-300 "), 3), base_time())
        .expect("valid listing");

    assert_eq!(house.code.as_deref(), Some("H-300"));
    assert_eq!(house.house_type, "house");
    assert_eq!(house.status, HouseStatus::Available);
    assert_eq!(house.facilities, vec!["Parking", "Water", "Electricity"]);
    assert_eq!(house.added_at, base_time());
}

#[test]
fn listing_rejects_malformed_fields() {
    let guard = IntakeGuard::default();

    assert_eq!(
        guard.check_listing(listing(Some("H 1"), 2), base_time()),
        Err(ValidationError::InvalidHouseCode("H 1".to_string()))
    );
    assert_eq!(
        guard.check_listing(listing(None, 0), base_time()),
        Err(ValidationError::NoBedrooms)
    );

    let mut no_address = listing(None, 2);
    no_address.address = "  ".to_string();
    assert_eq!(
        guard.check_listing(no_address, base_time()),
        Err(ValidationError::MissingAddress)
    );

    let mut bad_rent = listing(None, 2);
    bad_rent.monthly_rent = f64::NAN;
    assert!(matches!(
        guard.check_listing(bad_rent, base_time()),
        Err(ValidationError::InvalidRent(_))
    ));
}

#[test]
fn explicit_empty_facilities_are_kept_empty() {
    let mut bare = listing(None, 1);
    bare.facilities = Some(vec![" ".to_string()]);

    let house = IntakeGuard::default()
        .check_listing(bare, base_time())
        .expect("valid listing");

    assert!(house.facilities.is_empty());
}

#[test]
fn household_figures_are_range_checked_without_a_submission() {
    let guard = IntakeGuard::default();

    assert_eq!(guard.check_household(MAX_APPLICANT_AGE, 1, 0.0), Ok(()));
    assert_eq!(
        guard.check_household(500, 4, 12_000.0),
        Err(ValidationError::AgeOutOfRange {
            age: 500,
            max: MAX_APPLICANT_AGE
        })
    );
    assert_eq!(
        guard.check_household(40, 0, 12_000.0),
        Err(ValidationError::EmptyHousehold)
    );
    assert!(matches!(
        guard.check_household(40, 3, -5_000.0),
        Err(ValidationError::InvalidIncome(_))
    ));
    assert!(matches!(
        guard.check_household(40, 3, f64::INFINITY),
        Err(ValidationError::InvalidIncome(_))
    ));
}
