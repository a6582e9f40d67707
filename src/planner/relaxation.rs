use crate::planner::{
    error::PlannerError,
    scorer::{count_eligible, validate_candidates, validate_policy},
    types::{
        Candidate, Policy, PolicyField, Recommendation, RecommendationStatus,
        RelaxationSuggestion,
    },
};

pub const MIN_TARGET_ELIGIBLE: usize = 3;
pub const MAX_TARGET_ELIGIBLE: usize = 8;

pub const MAX_RISK_STEPS: [f64; 4] = [0.05, 0.10, 0.15, 0.20];
pub const MAX_RISK_FLOOR: f64 = 0.05;
pub const MAX_RISK_CEILING: f64 = 0.95;

pub const MIN_ROI_STEPS: [f64; 4] = [0.10, 0.20, 0.30, 0.40];

pub fn target_eligible(policy: &Policy) -> usize {
    policy
        .max_items
        .clamp(MIN_TARGET_ELIGIBLE, MAX_TARGET_ELIGIBLE)
}

/// Greedy single-field search: each ladder starts from the caller's policy,
/// never from the other ladder's result.
pub fn suggest_relaxation(
    policy: &Policy,
    candidates: &[Candidate],
) -> Result<Recommendation, PlannerError> {
    validate_policy(policy)?;
    validate_candidates(candidates)?;
    Ok(search_validated(policy, candidates))
}

pub(crate) fn search_validated(policy: &Policy, candidates: &[Candidate]) -> Recommendation {
    let target = target_eligible(policy);
    let current = count_eligible(candidates, policy);

    if current >= target {
        return Recommendation {
            status: RecommendationStatus::Sufficient,
            target_eligible: target,
            current_eligible: current,
            message: "current policy already admits enough candidates".to_string(),
            suggestions: Vec::new(),
        };
    }

    let suggestions: Vec<RelaxationSuggestion> = [
        relax_max_risk(policy, candidates, target),
        relax_min_roi(policy, candidates, target),
    ]
    .into_iter()
    .flatten()
    .collect();

    tracing::debug!(
        target: "planner.relaxation",
        target_eligible = target,
        current_eligible = current,
        suggestion_count = suggestions.len(),
        "relaxation_searched"
    );

    if suggestions.is_empty() {
        return Recommendation {
            status: RecommendationStatus::Insufficient,
            target_eligible: target,
            current_eligible: current,
            message: "policy is too restrictive; relax max_risk and/or min_roi more aggressively"
                .to_string(),
            suggestions,
        };
    }

    Recommendation {
        status: RecommendationStatus::Fix,
        target_eligible: target,
        current_eligible: current,
        message: "apply one of these single-field adjustments to reach the target".to_string(),
        suggestions,
    }
}

fn relax_max_risk(
    policy: &Policy,
    candidates: &[Candidate],
    target: usize,
) -> Option<RelaxationSuggestion> {
    MAX_RISK_STEPS.iter().find_map(|step| {
        let max_risk = (policy.max_risk + step).clamp(MAX_RISK_FLOOR, MAX_RISK_CEILING);
        let probe = policy.with_max_risk(max_risk);
        let eligible = count_eligible(candidates, &probe);
        (eligible >= target).then(|| RelaxationSuggestion {
            field: PolicyField::MaxRisk,
            from: policy.max_risk,
            to: max_risk,
            eligible_count: eligible,
            rationale: format!(
                "with max_risk={max_risk:.2}, {eligible} candidates become eligible (target {target})"
            ),
        })
    })
}

fn relax_min_roi(
    policy: &Policy,
    candidates: &[Candidate],
    target: usize,
) -> Option<RelaxationSuggestion> {
    MIN_ROI_STEPS.iter().find_map(|step| {
        let min_roi = (policy.min_roi - step).max(0.0);
        let probe = policy.with_min_roi(min_roi);
        let eligible = count_eligible(candidates, &probe);
        (eligible >= target).then(|| RelaxationSuggestion {
            field: PolicyField::MinRoi,
            from: policy.min_roi,
            to: min_roi,
            eligible_count: eligible,
            rationale: format!(
                "with min_roi={min_roi:.2}, {eligible} candidates become eligible without touching risk"
            ),
        })
    })
}
