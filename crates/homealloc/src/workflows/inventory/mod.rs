//! CSV import of housing stock and waiting-list applicants.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::workflows::allocation::{
    AdminPrincipal, AllocationService, AllocationServiceError, AllocationStore, ApplicantStatus,
    HouseStatus, ReviewAction,
};

pub use parser::{ApplicantRecord, HouseRecord};
use parser::RowError;

#[derive(Debug)]
pub enum InventoryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownStatus {
        line: usize,
        value: String,
    },
    Rejected {
        line: usize,
        source: AllocationServiceError,
    },
}

impl std::fmt::Display for InventoryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryImportError::Io(err) => write!(f, "failed to read inventory file: {}", err),
            InventoryImportError::Csv(err) => write!(f, "invalid inventory CSV data: {}", err),
            InventoryImportError::UnknownStatus { line, value } => {
                write!(f, "line {}: unsupported status '{}'", line, value)
            }
            InventoryImportError::Rejected { line, source } => {
                write!(f, "line {}: record rejected: {}", line, source)
            }
        }
    }
}

impl std::error::Error for InventoryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryImportError::Io(err) => Some(err),
            InventoryImportError::Csv(err) => Some(err),
            InventoryImportError::UnknownStatus { .. } => None,
            InventoryImportError::Rejected { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for InventoryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<RowError> for InventoryImportError {
    fn from(err: RowError) -> Self {
        match err {
            RowError::Csv(err) => Self::Csv(err),
            RowError::Status { line, value } => Self::UnknownStatus { line, value },
        }
    }
}

/// How many records an import put into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub houses: usize,
    pub applicants: usize,
}

pub struct InventoryImporter;

impl InventoryImporter {
    pub fn houses_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<HouseRecord>, InventoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::houses_from_reader(file)
    }

    pub fn houses_from_reader<R: Read>(reader: R) -> Result<Vec<HouseRecord>, InventoryImportError> {
        Ok(parser::parse_houses(reader)?)
    }

    pub fn applicants_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ApplicantRecord>, InventoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::applicants_from_reader(file)
    }

    pub fn applicants_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ApplicantRecord>, InventoryImportError> {
        Ok(parser::parse_applicants(reader)?)
    }

    /// Register houses and submit applicants through the service so every row
    /// goes through the same validation and scoring as live traffic.
    ///
    /// Stops at the first rejected row; rows before it stay imported.
    pub fn seed<S>(
        service: &AllocationService<S>,
        principal: &AdminPrincipal,
        houses: Vec<HouseRecord>,
        applicants: Vec<ApplicantRecord>,
    ) -> Result<ImportSummary, InventoryImportError>
    where
        S: AllocationStore + 'static,
    {
        let mut summary = ImportSummary::default();

        for record in houses {
            let line = record.line;
            let rejected = |source| InventoryImportError::Rejected { line, source };

            let house = service
                .register_house(principal, record.listing)
                .map_err(rejected)?;
            if record.status == HouseStatus::Maintenance {
                service
                    .set_house_maintenance(principal, house.id, true)
                    .map_err(rejected)?;
            }
            summary.houses += 1;
        }

        for record in applicants {
            let line = record.line;
            let rejected = |source| InventoryImportError::Rejected { line, source };

            let applicant = service
                .submit_application(record.submission)
                .map_err(rejected)?;
            let review = match record.status {
                ApplicantStatus::Approved => Some(ReviewAction::Approve),
                ApplicantStatus::Rejected => Some(ReviewAction::Reject),
                ApplicantStatus::Pending | ApplicantStatus::Allocated => None,
            };
            if let Some(action) = review {
                service
                    .review_application(principal, applicant.id, action)
                    .map_err(rejected)?;
            }
            summary.applicants += 1;
        }

        info!(
            admin = %principal.admin_id,
            houses = summary.houses,
            applicants = summary.applicants,
            "inventory imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::{AllocationConfig, InMemoryAllocationStore, ValidationError};
    use std::io::Cursor;
    use std::sync::Arc;

    const HOUSES: &str = "\
code, address, type, bedrooms, size, rent, status, facilities
H-101, 12 Gulberg Road, apartment, 2, 900, 15000, available, Parking; Water
 , 4 Model Town, house, 3, 1400, 22000, maintenance,
H-103, 9 Canal View, Studio, 1, 450, 8000, ,
";

    const APPLICANTS: &str = "\
name,age,family_size,monthly_income,contact,email,address,status
Ali Khan,45,5,25000,0300-1234567,ali@example.com,,approved
Fatima Bibi,62,3,8000,0301-7654321,,Lahore,
Usman Ali,33,2,30000,0302-1112223,,,rejected
";

    fn service() -> AllocationService<InMemoryAllocationStore> {
        AllocationService::new(
            Arc::new(InMemoryAllocationStore::new()),
            AllocationConfig::default(),
        )
        .expect("default config is valid")
    }

    #[test]
    fn parses_house_rows_with_optional_cells() {
        let houses = InventoryImporter::houses_from_reader(Cursor::new(HOUSES)).unwrap();

        assert_eq!(houses.len(), 3);
        assert_eq!(houses[0].line, 2);
        assert_eq!(houses[0].listing.code.as_deref(), Some("H-101"));
        assert_eq!(
            houses[0].listing.facilities,
            Some(vec!["Parking".to_string(), "Water".to_string()])
        );
        assert_eq!(houses[1].listing.code, None);
        assert_eq!(houses[1].status, HouseStatus::Maintenance);
        assert_eq!(houses[2].status, HouseStatus::Available);
        assert_eq!(houses[2].listing.facilities, None);
    }

    #[test]
    fn parses_applicant_rows_and_statuses() {
        let applicants =
            InventoryImporter::applicants_from_reader(Cursor::new(APPLICANTS)).unwrap();

        assert_eq!(applicants.len(), 3);
        assert_eq!(applicants[0].status, ApplicantStatus::Approved);
        assert_eq!(
            applicants[0].submission.contact.email.as_deref(),
            Some("ali@example.com")
        );
        assert_eq!(applicants[0].submission.contact.address, None);
        assert_eq!(applicants[1].status, ApplicantStatus::Pending);
        assert_eq!(applicants[2].status, ApplicantStatus::Rejected);
    }

    #[test]
    fn occupied_rows_are_refused() {
        let csv = "code,address,type,bedrooms,size,rent,status,facilities\n\
                   H-1,1 Road,flat,1,400,5000,occupied,\n";

        match InventoryImporter::houses_from_reader(Cursor::new(csv)) {
            Err(InventoryImportError::UnknownStatus { line: 2, value }) => {
                assert_eq!(value, "occupied");
            }
            other => panic!("expected unknown status, got {other:?}"),
        }
    }

    #[test]
    fn malformed_numbers_are_csv_errors() {
        let csv = "name,age,family_size,monthly_income,contact,email,address,status\n\
                   Ali,forty,5,25000,0300,,,\n";

        assert!(matches!(
            InventoryImporter::applicants_from_reader(Cursor::new(csv)),
            Err(InventoryImportError::Csv(_))
        ));
    }

    #[test]
    fn seeding_routes_rows_through_the_service() {
        let service = service();
        let principal = AdminPrincipal::new("importer");
        let houses = InventoryImporter::houses_from_reader(Cursor::new(HOUSES)).unwrap();
        let applicants =
            InventoryImporter::applicants_from_reader(Cursor::new(APPLICANTS)).unwrap();

        let summary = InventoryImporter::seed(&service, &principal, houses, applicants).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                houses: 3,
                applicants: 3
            }
        );
        let available = service.available_houses().unwrap();
        assert_eq!(available.len(), 2);
        assert_eq!(available[1].house_type, "studio");
        let eligible = service.eligible_applicants().unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "Ali Khan");
    }

    #[test]
    fn seeding_reports_the_rejected_line() {
        let service = service();
        let csv = "name,age,family_size,monthly_income,contact,email,address,status\n\
                   Ali Khan,45,5,25000,0300-1234567,,,\n\
                   Nobody,30,0,1000,0300-0000000,,,\n";
        let applicants = InventoryImporter::applicants_from_reader(Cursor::new(csv)).unwrap();

        match InventoryImporter::seed(&service, &AdminPrincipal::new("importer"), Vec::new(), applicants) {
            Err(InventoryImportError::Rejected {
                line: 3,
                source: AllocationServiceError::Validation(ValidationError::EmptyHousehold),
            }) => {}
            other => panic!("expected rejected row, got {other:?}"),
        }
        assert_eq!(service.waiting_list().unwrap().len(), 1);
    }
}
