use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::config::{AllocationConfig, SizeAdequacyConfig};
use super::super::domain::{Applicant, House};

pub const BASE_MATCH_SCORE: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactorKind {
    BedroomFit,
    SizeAdequacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchComponent {
    pub factor: MatchFactorKind,
    pub points: i32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub total: u32,
    pub components: Vec<MatchComponent>,
}

/// A single weighted criterion in the applicant/house fit.
pub trait MatchFactor: fmt::Debug + Send + Sync {
    fn evaluate(&self, applicant: &Applicant, house: &House) -> MatchComponent;
}

/// Bedrooms needed for a household: one per two members, rounded up.
pub fn ideal_bedrooms(family_size: u32) -> u32 {
    family_size / 2 + family_size % 2
}

/// Full points for the ideal bedroom count, minus a step per bedroom off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BedroomFit {
    pub full_points: i32,
    pub step_penalty: i32,
}

impl Default for BedroomFit {
    fn default() -> Self {
        Self {
            full_points: 30,
            step_penalty: 10,
        }
    }
}

impl MatchFactor for BedroomFit {
    fn evaluate(&self, applicant: &Applicant, house: &House) -> MatchComponent {
        let ideal = ideal_bedrooms(applicant.family_size);
        let diff = house.bedrooms.abs_diff(ideal);
        let penalty = i64::from(diff) * i64::from(self.step_penalty);
        let points = (i64::from(self.full_points) - penalty).max(0) as i32;

        MatchComponent {
            factor: MatchFactorKind::BedroomFit,
            points,
            notes: format!(
                "{} bedroom(s) against ideal {} for household of {}",
                house.bedrooms, ideal, applicant.family_size
            ),
        }
    }
}

/// Rewards floor area beyond a per-person minimum, up to a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeAdequacy {
    config: SizeAdequacyConfig,
}

impl SizeAdequacy {
    pub fn new(config: SizeAdequacyConfig) -> Self {
        Self { config }
    }
}

impl MatchFactor for SizeAdequacy {
    fn evaluate(&self, applicant: &Applicant, house: &House) -> MatchComponent {
        let required =
            u64::from(applicant.family_size) * u64::from(self.config.min_sqft_per_person);
        let size = u64::from(house.size_sqft);

        let points = if size >= required {
            let surplus_points = (size - required) / u64::from(self.config.sqft_per_point.max(1));
            surplus_points.min(u64::from(self.config.max_points)) as i32
        } else {
            0
        };

        MatchComponent {
            factor: MatchFactorKind::SizeAdequacy,
            points,
            notes: format!("{size} sq ft against required {required} sq ft"),
        }
    }
}

/// Base score plus the sum of every configured factor, floored at zero.
#[derive(Debug)]
pub struct MatchScorer {
    base: i32,
    factors: Vec<Box<dyn MatchFactor>>,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::standard()
    }
}

impl MatchScorer {
    pub fn new(base: i32) -> Self {
        Self {
            base,
            factors: Vec::new(),
        }
    }

    /// Base 50 with bedroom fit as the only factor.
    pub fn standard() -> Self {
        Self::new(BASE_MATCH_SCORE).with_factor(BedroomFit::default())
    }

    pub fn from_config(config: &AllocationConfig) -> Self {
        let scorer = Self::standard();
        match config.size_adequacy {
            Some(size) => scorer.with_factor(SizeAdequacy::new(size)),
            None => scorer,
        }
    }

    pub fn with_factor<F>(mut self, factor: F) -> Self
    where
        F: MatchFactor + 'static,
    {
        self.factors.push(Box::new(factor));
        self
    }

    pub fn score(&self, applicant: &Applicant, house: &House) -> u32 {
        self.evaluate(applicant, house).total
    }

    pub fn evaluate(&self, applicant: &Applicant, house: &House) -> MatchBreakdown {
        let components: Vec<MatchComponent> = self
            .factors
            .iter()
            .map(|factor| factor.evaluate(applicant, house))
            .collect();

        let sum = components
            .iter()
            .fold(i64::from(self.base), |acc, component| {
                acc + i64::from(component.points)
            });
        let total = sum.clamp(0, i64::from(u32::MAX)) as u32;

        MatchBreakdown { total, components }
    }
}

/// Score a pairing with the standard rubric.
pub fn compute_match_score(applicant: &Applicant, house: &House) -> u32 {
    MatchScorer::standard().score(applicant, house)
}
