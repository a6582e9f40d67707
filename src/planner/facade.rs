use crate::planner::{
    error::PlannerError,
    relaxation::search_validated,
    scorer::{score_validated, validate_candidates, validate_policy},
    selector::{BoundedKnapsackSelector, SelectorConfig},
    types::{Candidate, Evaluation, Policy, RecommendationStatus},
};

/// One "what-if" cycle: score, select, then check whether the policy admits
/// enough candidates. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    selector: BoundedKnapsackSelector,
}

impl Planner {
    pub fn new(selector_config: SelectorConfig) -> Self {
        Self {
            selector: BoundedKnapsackSelector::new(selector_config),
        }
    }

    pub fn selector(&self) -> &BoundedKnapsackSelector {
        &self.selector
    }

    #[tracing::instrument(
        name = "planner_evaluate",
        target = "planner",
        skip(self, candidates, policy),
        fields(
            candidate_count = candidates.len(),
            budget = policy.budget,
            max_items = policy.max_items
        )
    )]
    pub fn evaluate(
        &self,
        candidates: &[Candidate],
        policy: &Policy,
    ) -> Result<Evaluation, PlannerError> {
        if let Err(err) = validate_policy(policy).and_then(|_| validate_candidates(candidates)) {
            tracing::warn!(
                target: "planner",
                kind = ?err.kind,
                error = %err,
                "evaluation_rejected"
            );
            return Err(err);
        }

        let scored = score_validated(candidates, policy);
        let selection = self
            .selector
            .select(&scored, policy.budget, policy.max_items)?;
        let recommendation = search_validated(policy, candidates);

        tracing::info!(
            target: "planner",
            eligible_count = selection.info.eligible_count,
            selected_count = selection.info.selected_count,
            selected_cost = selection.info.selected_cost,
            selected_score = selection.info.selected_score,
            note = ?selection.info.note,
            recommendation = ?recommendation.status,
            "evaluation_completed"
        );
        if recommendation.status == RecommendationStatus::Insufficient {
            tracing::warn!(
                target: "planner",
                target_eligible = recommendation.target_eligible,
                current_eligible = recommendation.current_eligible,
                "policy_too_restrictive"
            );
        }

        Ok(Evaluation {
            policy: *policy,
            scored,
            selection,
            recommendation,
        })
    }
}
