use std::{cmp::Ordering, collections::BTreeSet};

use crate::planner::{
    error::{PlannerError, invalid_candidate, invalid_policy},
    types::{Candidate, Policy, ScoredCandidate},
};

/// Effort is expressed in days; 20 days maps to a factor of 1.0.
pub const EFFORT_DAYS_SCALE: f64 = 20.0;
pub const EFFORT_WEIGHT: f64 = 0.25;

pub fn validate_policy(policy: &Policy) -> Result<(), PlannerError> {
    if policy.budget == 0 {
        return Err(invalid_policy("policy.budget must be greater than zero"));
    }
    if policy.max_items == 0 {
        return Err(invalid_policy("policy.max_items must be greater than zero"));
    }
    if !is_probability(policy.max_risk) {
        return Err(invalid_policy(format!(
            "policy.max_risk must be within [0, 1], got {}",
            policy.max_risk
        )));
    }
    if !policy.min_roi.is_finite() || policy.min_roi < 0.0 {
        return Err(invalid_policy(format!(
            "policy.min_roi must be a non-negative number, got {}",
            policy.min_roi
        )));
    }
    if !policy.risk_penalty.is_finite() || policy.risk_penalty < 0.0 {
        return Err(invalid_policy(format!(
            "policy.risk_penalty must be a non-negative number, got {}",
            policy.risk_penalty
        )));
    }
    Ok(())
}

pub fn validate_candidates(candidates: &[Candidate]) -> Result<(), PlannerError> {
    let mut seen = BTreeSet::new();
    for candidate in candidates {
        if candidate.id.trim().is_empty() {
            return Err(invalid_candidate("candidate id cannot be empty"));
        }
        if !seen.insert(candidate.id.as_str()) {
            return Err(invalid_candidate(format!(
                "duplicate candidate id '{}'",
                candidate.id
            )));
        }
        // Probability-like inputs share the policy error kind.
        if !is_probability(candidate.risk) {
            return Err(invalid_policy(format!(
                "candidate '{}' risk must be within [0, 1], got {}",
                candidate.id, candidate.risk
            )));
        }
        if !is_probability(candidate.confidence) {
            return Err(invalid_policy(format!(
                "candidate '{}' confidence must be within [0, 1], got {}",
                candidate.id, candidate.confidence
            )));
        }
        if !candidate.benefit.is_finite() || candidate.benefit <= 0.0 {
            return Err(invalid_candidate(format!(
                "candidate '{}' benefit must be positive, got {}",
                candidate.id, candidate.benefit
            )));
        }
        if !candidate.effort_days.is_finite() || candidate.effort_days <= 0.0 {
            return Err(invalid_candidate(format!(
                "candidate '{}' effort_days must be positive, got {}",
                candidate.id, candidate.effort_days
            )));
        }
    }
    Ok(())
}

pub fn candidate_score(candidate: &Candidate, policy: &Policy) -> f64 {
    let effort_factor = candidate.effort_days / EFFORT_DAYS_SCALE;
    candidate.benefit * candidate.confidence
        - policy.risk_penalty * candidate.risk
        - EFFORT_WEIGHT * effort_factor
}

/// Scores every candidate and orders the result eligible-first, then by
/// descending score. Ties keep input order.
pub fn score_candidates(
    candidates: &[Candidate],
    policy: &Policy,
) -> Result<Vec<ScoredCandidate>, PlannerError> {
    validate_policy(policy)?;
    validate_candidates(candidates)?;
    Ok(score_validated(candidates, policy))
}

pub(crate) fn score_validated(candidates: &[Candidate], policy: &Policy) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            candidate: candidate.clone(),
            roi: candidate.roi(),
            score: candidate_score(candidate, policy),
            eligible: policy.admits(candidate),
        })
        .collect();

    scored.sort_by(|lhs, rhs| {
        rhs.eligible
            .cmp(&lhs.eligible)
            .then_with(|| rhs.score.partial_cmp(&lhs.score).unwrap_or(Ordering::Equal))
    });
    scored
}

pub fn count_eligible(candidates: &[Candidate], policy: &Policy) -> usize {
    candidates
        .iter()
        .filter(|candidate| policy.admits(candidate))
        .count()
}

fn is_probability(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
