use homealloc::workflows::allocation::AdminPrincipal;
use homealloc::workflows::inventory::{ApplicantRecord, HouseRecord, InventoryImportError, InventoryImporter};
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const SAMPLE_HOUSES: &str = "\
code,address,type,bedrooms,size,rent,status,facilities
H-101,\"123 Main Street, Karachi\",apartment,3,1200,15000,available,
H-102,\"456 Park Road, Lahore\",house,4,2000,25000,available,
H-103,\"789 Garden Avenue, Islamabad\",duplex,5,2500,35000,available,
H-104,\"321 Market Street, Karachi\",apartment,2,800,10000,maintenance,
H-105,\"654 Hill Road, Lahore\",house,3,1500,18000,available,
";

const SAMPLE_APPLICANTS: &str = "\
name,age,family_size,monthly_income,contact,email,address,status
Ali Khan,45,6,15000,+923001234567,ali@example.com,\"Current Address, Karachi\",approved
Sara Ahmed,38,4,12000,+923001234568,sara@example.com,\"Current Address, Lahore\",pending
Ahmed Raza,50,5,10000,+923001234569,ahmed@example.com,\"Current Address, Islamabad\",approved
Fatima Noor,42,3,18000,+923001234570,fatima@example.com,\"Current Address, Karachi\",pending
Bilal Khan,35,7,8000,+923001234571,bilal@example.com,\"Current Address, Lahore\",approved
";

/// Principal recorded against rows loaded at start-up.
pub(crate) fn seed_principal() -> AdminPrincipal {
    AdminPrincipal {
        display_name: Some("System Administrator".to_string()),
        ..AdminPrincipal::new("admin")
    }
}

pub(crate) fn sample_houses() -> Result<Vec<HouseRecord>, InventoryImportError> {
    InventoryImporter::houses_from_reader(Cursor::new(SAMPLE_HOUSES))
}

pub(crate) fn sample_applicants() -> Result<Vec<ApplicantRecord>, InventoryImportError> {
    InventoryImporter::applicants_from_reader(Cursor::new(SAMPLE_APPLICANTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use homealloc::workflows::allocation::{ApplicantStatus, HouseStatus};

    #[test]
    fn bundled_samples_parse() {
        let houses = sample_houses().expect("houses parse");
        let applicants = sample_applicants().expect("applicants parse");

        assert_eq!(houses.len(), 5);
        assert_eq!(houses[3].status, HouseStatus::Maintenance);
        assert_eq!(houses[0].listing.address, "123 Main Street, Karachi");
        assert_eq!(applicants.len(), 5);
        assert_eq!(
            applicants
                .iter()
                .filter(|record| record.status == ApplicantStatus::Approved)
                .count(),
            3
        );
    }
}
