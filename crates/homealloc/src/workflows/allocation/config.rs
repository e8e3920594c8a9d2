use serde::{Deserialize, Serialize};

pub const DEFAULT_REFERENCE_INCOME: f64 = 20_000.0;
pub const DEFAULT_MATCH_THRESHOLD: u32 = 70;

/// Tunables for scoring and selection. Defaults reproduce the published rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Monthly income that counts as a ratio of 1.0 in the priority rubric.
    pub reference_income: f64,
    /// Policy for runs that commit allocations.
    pub batch: SelectionPolicy,
    /// Policy for dry-run suggestion previews.
    pub suggestions: SelectionPolicy,
    /// Enables the floor-area factor in match scoring when present.
    pub size_adequacy: Option<SizeAdequacyConfig>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            reference_income: DEFAULT_REFERENCE_INCOME,
            batch: SelectionPolicy::batch(),
            suggestions: SelectionPolicy::suggestions(),
            size_adequacy: None,
        }
    }
}

/// Threshold and bounds applied by the selector on a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    pub match_threshold: u32,
    /// Cap on eligible applicants considered, taken in priority order.
    pub max_applicants: Option<usize>,
    /// Cap on remaining houses evaluated for each applicant, taken in pool order.
    pub max_houses_per_applicant: Option<usize>,
}

impl SelectionPolicy {
    pub const fn batch() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            max_applicants: None,
            max_houses_per_applicant: None,
        }
    }

    pub const fn suggestions() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            max_applicants: Some(5),
            max_houses_per_applicant: Some(3),
        }
    }

    pub const fn with_threshold(mut self, match_threshold: u32) -> Self {
        self.match_threshold = match_threshold;
        self
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::batch()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeAdequacyConfig {
    pub min_sqft_per_person: u32,
    pub max_points: u32,
    pub sqft_per_point: u32,
}

impl Default for SizeAdequacyConfig {
    fn default() -> Self {
        Self {
            min_sqft_per_person: 150,
            max_points: 20,
            sqft_per_point: 50,
        }
    }
}
