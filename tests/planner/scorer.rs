use decision_planner::planner::{
    Candidate, Policy, PlannerErrorKind, count_eligible, score_candidates,
};

use super::{candidate, policy};

#[test]
fn given_candidate_when_scored_then_score_follows_benefit_risk_effort_formula() {
    let policy = Policy {
        risk_penalty: 0.9,
        ..policy(100_000, 3)
    };
    let input = vec![Candidate::new("A01", 50_000, 2.0, 0.2, 10.0, 0.5)];

    let scored = score_candidates(&input, &policy).expect("scoring should succeed");

    // 2.0*0.5 - 0.9*0.2 - 0.25*(10/20)
    assert!((scored[0].score - 0.695).abs() < 1e-9, "got {}", scored[0].score);
    assert!((scored[0].roi - 4.0).abs() < 1e-9, "got {}", scored[0].roi);
}

#[test]
fn given_risk_or_roi_outside_bounds_when_scored_then_candidate_is_ineligible() {
    let policy = Policy {
        max_risk: 0.4,
        min_roi: 1.0,
        ..policy(100_000, 3)
    };
    let input = vec![
        candidate("ok", 100_000, 1.5, 0.4),
        candidate("risky", 100_000, 1.5, 0.41),
        candidate("low-roi", 100_000, 0.99, 0.1),
    ];

    let scored = score_candidates(&input, &policy).expect("scoring should succeed");
    let eligible_of = |id: &str| {
        scored
            .iter()
            .find(|candidate| candidate.id() == id)
            .map(|candidate| candidate.eligible)
            .expect("candidate should be present")
    };

    assert!(eligible_of("ok"));
    assert!(!eligible_of("risky"));
    assert!(!eligible_of("low-roi"));
    assert_eq!(count_eligible(&input, &policy), 1);
}

#[test]
fn given_mixed_candidates_when_scored_then_eligible_first_then_score_descending() {
    let policy = Policy {
        max_risk: 0.5,
        min_roi: 0.0,
        risk_penalty: 0.0,
        ..policy(100_000, 3)
    };
    let input = vec![
        candidate("ineligible-high", 100_000, 3.0, 0.9),
        candidate("low", 100_000, 1.0, 0.1),
        candidate("high", 100_000, 2.0, 0.1),
        candidate("low-twin", 100_000, 1.0, 0.1),
    ];

    let scored = score_candidates(&input, &policy).expect("scoring should succeed");
    let order: Vec<&str> = scored.iter().map(|candidate| candidate.id()).collect();

    assert_eq!(order, vec!["high", "low", "low-twin", "ineligible-high"]);
}

#[test]
fn given_zero_cost_candidate_when_scored_then_roi_clears_any_floor() {
    let policy = Policy {
        min_roi: 3.0,
        ..policy(100_000, 3)
    };
    let input = vec![candidate("free", 0, 0.5, 0.1)];

    let scored = score_candidates(&input, &policy).expect("scoring should succeed");

    assert!(scored[0].eligible);
    assert!(scored[0].roi.is_finite());
}

#[test]
fn given_empty_candidate_set_when_scored_then_result_is_empty() {
    let scored = score_candidates(&[], &policy(100_000, 3)).expect("empty input is valid");
    assert!(scored.is_empty());
}

#[test]
fn given_invalid_policy_when_scored_then_invalid_policy_error_is_returned() {
    let input = vec![candidate("A01", 10_000, 1.0, 0.1)];
    let invalid = [
        policy(0, 3),
        policy(100_000, 0),
        Policy {
            max_risk: 1.2,
            ..policy(100_000, 3)
        },
        Policy {
            min_roi: -0.1,
            ..policy(100_000, 3)
        },
        Policy {
            risk_penalty: f64::NAN,
            ..policy(100_000, 3)
        },
    ];

    for policy in invalid {
        let err = score_candidates(&input, &policy).expect_err("policy must be rejected");
        assert_eq!(err.kind, PlannerErrorKind::InvalidPolicy, "{policy:?}");
    }
}

#[test]
fn given_probability_outside_unit_interval_when_scored_then_invalid_policy_error_is_returned() {
    let input = vec![Candidate::new("A01", 10_000, 1.0, 0.1, 2.0, 1.3)];
    let err = score_candidates(&input, &policy(100_000, 3)).expect_err("confidence 1.3 is invalid");
    assert_eq!(err.kind, PlannerErrorKind::InvalidPolicy);
    assert!(err.message.contains("confidence"));

    let input = vec![candidate("A02", 10_000, 1.0, -0.01)];
    let err = score_candidates(&input, &policy(100_000, 3)).expect_err("risk -0.01 is invalid");
    assert_eq!(err.kind, PlannerErrorKind::InvalidPolicy);
}

#[test]
fn given_duplicate_or_malformed_candidate_when_scored_then_invalid_candidate_error_is_returned() {
    let duplicate = vec![
        candidate("A01", 10_000, 1.0, 0.1),
        candidate("A01", 20_000, 1.0, 0.1),
    ];
    let err = score_candidates(&duplicate, &policy(100_000, 3)).expect_err("duplicate id");
    assert_eq!(err.kind, PlannerErrorKind::InvalidCandidate);
    assert!(err.message.contains("A01"));

    let no_benefit = vec![candidate("A03", 10_000, 0.0, 0.1)];
    let err = score_candidates(&no_benefit, &policy(100_000, 3)).expect_err("zero benefit");
    assert_eq!(err.kind, PlannerErrorKind::InvalidCandidate);
}
