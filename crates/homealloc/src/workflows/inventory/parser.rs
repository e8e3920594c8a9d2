use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::allocation::{
    ApplicantStatus, ApplicationSubmission, ContactDetails, HouseListing, HouseStatus,
};

/// Header row occupies line 1, so the first data row is line 2.
const FIRST_DATA_LINE: usize = 2;

#[derive(Debug)]
pub(crate) enum RowError {
    Csv(csv::Error),
    Status { line: usize, value: String },
}

impl From<csv::Error> for RowError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A house row plus the state it should be left in after registration.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseRecord {
    pub line: usize,
    pub listing: HouseListing,
    pub status: HouseStatus,
}

/// An applicant row plus the review outcome to apply after submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRecord {
    pub line: usize,
    pub submission: ApplicationSubmission,
    pub status: ApplicantStatus,
}

pub(crate) fn parse_houses<R: Read>(reader: R) -> Result<Vec<HouseRecord>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<HouseRow>().enumerate() {
        let row = row?;
        let line = FIRST_DATA_LINE + index;
        let status = match row.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("available") => HouseStatus::Available,
            Some("maintenance") => HouseStatus::Maintenance,
            Some(other) => {
                return Err(RowError::Status {
                    line,
                    value: other.to_string(),
                })
            }
        };

        records.push(HouseRecord {
            line,
            listing: HouseListing {
                code: row.code,
                address: row.address,
                house_type: row.house_type,
                bedrooms: row.bedrooms,
                size_sqft: row.size,
                monthly_rent: row.rent,
                facilities: row.facilities.as_deref().map(split_facilities),
            },
            status,
        });
    }

    Ok(records)
}

pub(crate) fn parse_applicants<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<ApplicantRow>().enumerate() {
        let row = row?;
        let line = FIRST_DATA_LINE + index;
        let status = match row.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("pending") => ApplicantStatus::Pending,
            Some("approved") => ApplicantStatus::Approved,
            Some("rejected") => ApplicantStatus::Rejected,
            Some(other) => {
                return Err(RowError::Status {
                    line,
                    value: other.to_string(),
                })
            }
        };

        records.push(ApplicantRecord {
            line,
            submission: ApplicationSubmission {
                name: row.name,
                age: row.age,
                family_size: row.family_size,
                monthly_income: row.monthly_income,
                contact: ContactDetails {
                    phone: row.contact,
                    email: row.email,
                    address: row.address,
                },
            },
            status,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct HouseRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    code: Option<String>,
    address: String,
    #[serde(rename = "type")]
    house_type: String,
    bedrooms: u32,
    size: u32,
    rent: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    facilities: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    name: String,
    age: u32,
    family_size: u32,
    monthly_income: f64,
    contact: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
}

fn split_facilities(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
