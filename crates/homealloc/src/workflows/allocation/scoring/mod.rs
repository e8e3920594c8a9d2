//! Pure scoring functions: applicant priority and applicant/house fit.

mod matching;
mod priority;

pub use matching::{
    compute_match_score, ideal_bedrooms, BedroomFit, MatchBreakdown, MatchComponent,
    MatchFactor, MatchFactorKind, MatchScorer, SizeAdequacy, BASE_MATCH_SCORE,
};
pub use priority::{
    compute_priority_score, PriorityBreakdown, PriorityComponent, PriorityFactor,
    PriorityScorer, MAX_PRIORITY_SCORE,
};
