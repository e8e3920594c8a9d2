use chrono::{DateTime, Utc};

use super::domain::{
    ApplicationSubmission, ContactDetails, HouseId, HouseListing, HouseStatus, NewHouse,
    DEFAULT_FACILITIES,
};
use super::location::HouseLink;

/// Validation errors raised before anything is scored or stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("applicant name is required")]
    MissingName,
    #[error("a contact phone number is required")]
    MissingContact,
    #[error("age {age} is outside the accepted range (max {max})")]
    AgeOutOfRange { age: u32, max: u32 },
    #[error("family size must be at least one")]
    EmptyHousehold,
    #[error("monthly income must be a finite, non-negative amount (found {0})")]
    InvalidIncome(f64),
    #[error("house address is required")]
    MissingAddress,
    #[error("house type is required")]
    MissingHouseType,
    #[error("a house needs at least one bedroom")]
    NoBedrooms,
    #[error("monthly rent must be a finite, non-negative amount (found {0})")]
    InvalidRent(f64),
    #[error("house code '{0}' must be non-empty and contain no whitespace")]
    InvalidHouseCode(String),
    #[error("reference income must be a finite, positive amount (found {0})")]
    InvalidReferenceIncome(f64),
    #[error("distance must be a finite, non-negative amount (found {0})")]
    InvalidDistance(f64),
    #[error("a house cannot be linked to itself")]
    SelfLink,
}

pub const MAX_APPLICANT_AGE: u32 = 150;

/// Guard that normalises intake payloads and rejects malformed input.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    max_age: u32,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self {
            max_age: MAX_APPLICANT_AGE,
        }
    }
}

impl IntakeGuard {
    /// Trim text fields, drop blank optional contacts and check numeric ranges.
    pub fn check_submission(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationSubmission, ValidationError> {
        let name = submission.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let phone = submission.contact.phone.trim().to_string();
        if phone.is_empty() {
            return Err(ValidationError::MissingContact);
        }

        self.check_household(submission.age, submission.family_size, submission.monthly_income)?;

        Ok(ApplicationSubmission {
            name,
            contact: ContactDetails {
                phone,
                email: non_blank(submission.contact.email),
                address: non_blank(submission.contact.address),
            },
            ..submission
        })
    }

    /// Range checks on the figures that feed the priority rubric.
    pub fn check_household(
        &self,
        age: u32,
        family_size: u32,
        monthly_income: f64,
    ) -> Result<(), ValidationError> {
        if age > self.max_age {
            return Err(ValidationError::AgeOutOfRange {
                age,
                max: self.max_age,
            });
        }

        if family_size == 0 {
            return Err(ValidationError::EmptyHousehold);
        }

        if !monthly_income.is_finite() || monthly_income < 0.0 {
            return Err(ValidationError::InvalidIncome(monthly_income));
        }

        Ok(())
    }

    pub fn check_link(
        &self,
        from: HouseId,
        to: HouseId,
        distance: f64,
    ) -> Result<HouseLink, ValidationError> {
        if from == to {
            return Err(ValidationError::SelfLink);
        }
        check_distance(distance)?;
        Ok(HouseLink { from, to, distance })
    }

    /// Turn an administrator listing into a storable house in the `available` state.
    pub fn check_listing(
        &self,
        listing: HouseListing,
        added_at: DateTime<Utc>,
    ) -> Result<NewHouse, ValidationError> {
        let code = match listing.code {
            Some(code) => {
                let trimmed = code.trim();
                if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
                    return Err(ValidationError::InvalidHouseCode(code));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let address = listing.address.trim().to_string();
        if address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }

        let house_type = listing.house_type.trim().to_ascii_lowercase();
        if house_type.is_empty() {
            return Err(ValidationError::MissingHouseType);
        }

        if listing.bedrooms == 0 {
            return Err(ValidationError::NoBedrooms);
        }

        if !listing.monthly_rent.is_finite() || listing.monthly_rent < 0.0 {
            return Err(ValidationError::InvalidRent(listing.monthly_rent));
        }

        let facilities = match listing.facilities {
            Some(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            None => DEFAULT_FACILITIES.iter().map(|item| item.to_string()).collect(),
        };

        Ok(NewHouse {
            code,
            address,
            house_type,
            bedrooms: listing.bedrooms,
            size_sqft: listing.size_sqft,
            monthly_rent: listing.monthly_rent,
            facilities,
            status: HouseStatus::Available,
            added_at,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn check_distance(distance: f64) -> Result<f64, ValidationError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(ValidationError::InvalidDistance(distance));
    }
    Ok(distance)
}
