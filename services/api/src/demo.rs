use crate::infra::{sample_applicants, sample_houses, seed_principal};
use clap::Args;
use homealloc::error::AppError;
use homealloc::workflows::allocation::scoring::PriorityScorer;
use homealloc::workflows::allocation::{
    AllocationConfig, AllocationService, AllocationServiceError, BatchAllocationReport, House,
    HouseId, InMemoryAllocationStore, IntakeGuard, NoEligibleMatch, SuggestionPreview,
    UnmatchedReason, WaitingListEntry, DEFAULT_REFERENCE_INCOME,
};
use homealloc::workflows::inventory::InventoryImporter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant age in years
    #[arg(long)]
    pub(crate) age: u32,
    /// Number of people in the household
    #[arg(long)]
    pub(crate) family_size: u32,
    /// Monthly household income
    #[arg(long)]
    pub(crate) income: f64,
    /// Income treated as a ratio of 1.0 (defaults to 20000)
    #[arg(long)]
    pub(crate) reference_income: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Houses CSV (code,address,type,bedrooms,size,rent,status,facilities). Defaults to bundled samples.
    #[arg(long)]
    pub(crate) houses_csv: Option<PathBuf>,
    /// Applicants CSV (name,age,family_size,monthly_income,contact,email,address,status). Defaults to bundled samples.
    #[arg(long)]
    pub(crate) applicants_csv: Option<PathBuf>,
    /// Minimum match score for a pairing to be accepted
    #[arg(long)]
    pub(crate) threshold: Option<u32>,
    /// Stop after printing suggestions; nothing is allocated
    #[arg(long)]
    pub(crate) preview_only: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let reference_income = args.reference_income.unwrap_or(DEFAULT_REFERENCE_INCOME);
    let scorer = PriorityScorer::new(reference_income).map_err(AllocationServiceError::from)?;
    IntakeGuard::default()
        .check_household(args.age, args.family_size, args.income)
        .map_err(AllocationServiceError::from)?;
    let breakdown = scorer.breakdown(args.age, args.family_size, args.income);

    println!("Priority score: {}/100", breakdown.total);
    for component in &breakdown.components {
        println!(
            "  {:<12} {:>3}  ({})",
            format!("{:?}", component.factor),
            component.points,
            component.notes
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        houses_csv,
        applicants_csv,
        threshold,
        preview_only,
    } = args;

    let mut config = AllocationConfig::default();
    if let Some(threshold) = threshold {
        config.batch = config.batch.with_threshold(threshold);
        config.suggestions = config.suggestions.with_threshold(threshold);
    }

    let houses = match houses_csv {
        Some(path) => InventoryImporter::houses_from_path(path)?,
        None => sample_houses()?,
    };
    let applicants = match applicants_csv {
        Some(path) => InventoryImporter::applicants_from_path(path)?,
        None => sample_applicants()?,
    };

    let service = AllocationService::new(Arc::new(InMemoryAllocationStore::new()), config)?;
    let principal = seed_principal();
    let summary = InventoryImporter::seed(&service, &principal, houses, applicants)?;

    println!("HomeAlloc allocation demo");
    println!(
        "Loaded {} house(s) and {} application(s)",
        summary.houses, summary.applicants
    );

    render_waiting_list(&service.waiting_list()?);

    let houses = service.available_houses()?;
    render_houses(&houses);

    let preview = service.preview_suggestions()?;
    render_suggestions(&preview, &houses);

    if preview_only {
        println!("\nPreview only: no allocations were committed.");
        return Ok(());
    }

    let report = service.run_batch_allocation(&principal)?;
    render_batch_report(&report);

    let stats = service.public_stats(chrono::Utc::now())?;
    println!(
        "\nTotals: {} application(s), {} pending, {} house(s) still available, {} allocated today",
        stats.total_applications,
        stats.pending_applications,
        stats.available_houses,
        stats.allocated_today
    );

    Ok(())
}

fn render_waiting_list(entries: &[WaitingListEntry]) {
    println!("\nWaiting list");
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }

    for entry in entries {
        println!(
            "  {:>2}. {} {:<20} priority {:>3}  family {:>2}  {}",
            entry.position,
            entry.reference,
            entry.name,
            entry.priority_score,
            entry.family_size,
            entry.status
        );
    }
}

fn render_houses(houses: &[House]) {
    println!("\nAvailable houses");
    if houses.is_empty() {
        println!("  (none)");
        return;
    }

    for house in houses {
        println!(
            "  {} {:<10} {} bed  {:>5} sq ft  {}",
            house.code, house.house_type, house.bedrooms, house.size_sqft, house.address
        );
    }
}

fn house_code(houses: &[House], pairing_house: HouseId) -> String {
    houses
        .iter()
        .find(|house| house.id == pairing_house)
        .map(|house| house.code.clone())
        .unwrap_or_else(|| pairing_house.to_string())
}

fn render_suggestions(preview: &SuggestionPreview, houses: &[House]) {
    println!(
        "\nSuggested pairings (threshold {})",
        preview.match_threshold
    );
    if preview.outcome.pairings.is_empty() {
        println!("  (none)");
    }
    for pairing in &preview.outcome.pairings {
        println!(
            "  {} -> {}  match {:>3}  priority {:>3}",
            pairing.applicant_id,
            house_code(houses, pairing.house_id),
            pairing.match_score,
            pairing.priority_score
        );
    }
    render_unmatched(&preview.outcome.unmatched);
    println!("  Total priority served: {}", preview.total_priority);
}

fn render_unmatched(unmatched: &[NoEligibleMatch]) {
    for miss in unmatched {
        match miss.reason {
            UnmatchedReason::BelowThreshold {
                best_score,
                threshold,
            } => println!(
                "  {} unmatched: best score {} below threshold {}",
                miss.applicant_id, best_score, threshold
            ),
            UnmatchedReason::NoHousesRemaining => {
                println!("  {} unmatched: no houses remaining", miss.applicant_id)
            }
        }
    }
}

fn render_batch_report(report: &BatchAllocationReport) {
    println!("\nBatch allocation run by {}", report.run_by);
    if report.committed.is_empty() {
        println!("  No allocations committed.");
    }
    for record in &report.committed {
        println!(
            "  {} allocated {} (match {})",
            record.applicant_id, record.house_id, record.match_score
        );
    }
    render_unmatched(&report.unmatched);
    for conflict in &report.conflicts {
        println!(
            "  {} / {} skipped: {}",
            conflict.applicant_id, conflict.house_id, conflict.reason
        );
    }
    println!("  Total priority served: {}", report.total_priority);
}
