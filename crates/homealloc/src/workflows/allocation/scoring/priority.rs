use serde::{Deserialize, Serialize};

use super::super::config::DEFAULT_REFERENCE_INCOME;
use super::super::intake::ValidationError;

pub const MAX_PRIORITY_SCORE: u8 = 100;

// Thresholds are checked in order; the first match wins.
const AGE_BUCKETS: [(u32, u8); 3] = [(60, 30), (50, 20), (40, 10)];
const FAMILY_BUCKETS: [(u32, u8); 3] = [(6, 30), (4, 20), (2, 10)];
const INCOME_RATIO_BUCKETS: [(f64, u8); 3] = [(0.5, 40), (0.75, 30), (1.0, 20)];
const INCOME_FLOOR_POINTS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityFactor {
    Age,
    FamilySize,
    IncomeRatio,
}

/// One factor's contribution to a priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityComponent {
    pub factor: PriorityFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub total: u8,
    pub components: Vec<PriorityComponent>,
}

/// Additive bucket rubric over age, household size and income.
///
/// Each factor is scored independently and the sum is capped at
/// [`MAX_PRIORITY_SCORE`]. The income factor always contributes at least
/// ten points, so the lowest reachable score is 10.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityScorer {
    reference_income: f64,
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self {
            reference_income: DEFAULT_REFERENCE_INCOME,
        }
    }
}

impl PriorityScorer {
    /// Fails unless `reference_income` is finite and positive.
    pub fn new(reference_income: f64) -> Result<Self, ValidationError> {
        if !reference_income.is_finite() || reference_income <= 0.0 {
            return Err(ValidationError::InvalidReferenceIncome(reference_income));
        }

        Ok(Self { reference_income })
    }

    pub fn reference_income(&self) -> f64 {
        self.reference_income
    }

    pub fn score(&self, age: u32, family_size: u32, monthly_income: f64) -> u8 {
        self.breakdown(age, family_size, monthly_income).total
    }

    pub fn breakdown(&self, age: u32, family_size: u32, monthly_income: f64) -> PriorityBreakdown {
        let age_points = bucket_at_least(age, &AGE_BUCKETS);
        let family_points = bucket_at_least(family_size, &FAMILY_BUCKETS);

        let ratio = monthly_income / self.reference_income;
        let income_points = INCOME_RATIO_BUCKETS
            .iter()
            .find(|(ceiling, _)| ratio <= *ceiling)
            .map(|(_, points)| *points)
            .unwrap_or(INCOME_FLOOR_POINTS);

        let components = vec![
            PriorityComponent {
                factor: PriorityFactor::Age,
                points: age_points,
                notes: format!("age {age}"),
            },
            PriorityComponent {
                factor: PriorityFactor::FamilySize,
                points: family_points,
                notes: format!("household of {family_size}"),
            },
            PriorityComponent {
                factor: PriorityFactor::IncomeRatio,
                points: income_points,
                notes: format!(
                    "income ratio {:.2} against reference {:.0}",
                    ratio, self.reference_income
                ),
            },
        ];

        let sum: u16 = components
            .iter()
            .map(|component| u16::from(component.points))
            .sum();
        let total = sum.min(u16::from(MAX_PRIORITY_SCORE)) as u8;

        PriorityBreakdown { total, components }
    }
}

fn bucket_at_least(value: u32, buckets: &[(u32, u8)]) -> u8 {
    buckets
        .iter()
        .find(|(floor, _)| value >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Score an applicant with the default reference income.
pub fn compute_priority_score(age: u32, family_size: u32, monthly_income: f64) -> u8 {
    PriorityScorer::default().score(age, family_size, monthly_income)
}
