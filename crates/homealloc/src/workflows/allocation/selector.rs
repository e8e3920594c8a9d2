use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use super::config::SelectionPolicy;
use super::domain::{Applicant, ApplicantId, House, HouseId};
use super::scoring::MatchScorer;

/// Accepted applicant/house pairing produced by a selection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub applicant_id: ApplicantId,
    pub house_id: HouseId,
    pub match_score: u32,
    pub priority_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnmatchedReason {
    BelowThreshold { best_score: u32, threshold: u32 },
    NoHousesRemaining,
}

/// An applicant the run could not place. Not a failure: they stay eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoEligibleMatch {
    pub applicant_id: ApplicantId,
    #[serde(flatten)]
    pub reason: UnmatchedReason,
}

impl NoEligibleMatch {
    pub fn best_score(&self) -> Option<u32> {
        match self.reason {
            UnmatchedReason::BelowThreshold { best_score, .. } => Some(best_score),
            UnmatchedReason::NoHousesRemaining => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionOutcome {
    pub pairings: Vec<Pairing>,
    pub unmatched: Vec<NoEligibleMatch>,
}

impl SelectionOutcome {
    pub fn total_priority(&self) -> u32 {
        self.pairings
            .iter()
            .map(|pairing| u32::from(pairing.priority_score))
            .sum()
    }
}

/// Waiting-list order: priority descending, then earliest submission, then id.
pub fn waiting_order(left: &Applicant, right: &Applicant) -> Ordering {
    right
        .priority_score
        .cmp(&left.priority_score)
        .then_with(|| left.submitted_at.cmp(&right.submitted_at))
        .then_with(|| left.id.cmp(&right.id))
}

/// Eligible applicants in waiting-list order, each id at most once.
pub fn rank_eligible(applicants: &[Applicant]) -> Vec<&Applicant> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<&Applicant> = applicants
        .iter()
        .filter(|applicant| applicant.is_eligible())
        .filter(|applicant| seen.insert(applicant.id))
        .collect();
    ranked.sort_by(|left, right| waiting_order(left, right));
    ranked
}

/// Greedy, threshold-gated matcher.
///
/// Applicants are visited in waiting-list order. Each takes the remaining
/// house with the highest match score (earliest house id on ties) provided the
/// score clears the policy threshold. A taken house leaves the pool at once.
#[derive(Debug, Clone, Copy)]
pub struct AllocationSelector<'s> {
    scorer: &'s MatchScorer,
    policy: SelectionPolicy,
}

impl<'s> AllocationSelector<'s> {
    pub fn new(scorer: &'s MatchScorer, policy: SelectionPolicy) -> Self {
        Self { scorer, policy }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn select(&self, applicants: &[Applicant], houses: &[House]) -> SelectionOutcome {
        let mut queue = rank_eligible(applicants);
        if let Some(limit) = self.policy.max_applicants {
            queue.truncate(limit);
        }

        let mut pool: Vec<&House> = houses.iter().filter(|house| house.is_available()).collect();
        pool.sort_by_key(|house| house.id);
        pool.dedup_by_key(|house| house.id);

        let mut outcome = SelectionOutcome::default();

        for applicant in queue {
            let window = self
                .policy
                .max_houses_per_applicant
                .unwrap_or(pool.len())
                .min(pool.len());

            let mut best: Option<(usize, u32)> = None;
            for (index, house) in pool[..window].iter().enumerate() {
                let score = self.scorer.score(applicant, house);
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((index, score));
                }
            }

            match best {
                Some((index, score)) if score >= self.policy.match_threshold => {
                    let house = pool.remove(index);
                    outcome.pairings.push(Pairing {
                        applicant_id: applicant.id,
                        house_id: house.id,
                        match_score: score,
                        priority_score: applicant.priority_score,
                    });
                }
                Some((_, score)) => outcome.unmatched.push(NoEligibleMatch {
                    applicant_id: applicant.id,
                    reason: UnmatchedReason::BelowThreshold {
                        best_score: score,
                        threshold: self.policy.match_threshold,
                    },
                }),
                None => outcome.unmatched.push(NoEligibleMatch {
                    applicant_id: applicant.id,
                    reason: UnmatchedReason::NoHousesRemaining,
                }),
            }
        }

        outcome
    }
}

/// Select pairings with the standard scorer and an unbounded batch policy.
pub fn run_batch_allocation(
    eligible_applicants: &[Applicant],
    available_houses: &[House],
) -> SelectionOutcome {
    let scorer = MatchScorer::standard();
    AllocationSelector::new(&scorer, SelectionPolicy::batch())
        .select(eligible_applicants, available_houses)
}
