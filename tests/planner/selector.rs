use decision_planner::planner::{
    BoundedKnapsackSelector, PlannerErrorKind, ScoredCandidate, SelectionNote, SelectorConfig,
};

use super::{Lcg, scored};

fn unit_scale_selector() -> BoundedKnapsackSelector {
    BoundedKnapsackSelector::new(SelectorConfig {
        cost_bucket: 1_000,
        score_scale: 1.0,
    })
}

fn scaled_total(selector: &BoundedKnapsackSelector, chosen: &[ScoredCandidate]) -> i64 {
    chosen
        .iter()
        .map(|candidate| selector.config().scaled_score(candidate.score))
        .sum()
}

/// Exhaustive optimum over the discretized model, empty subset included.
fn brute_force_best(
    selector: &BoundedKnapsackSelector,
    pool: &[ScoredCandidate],
    budget: u64,
    max_items: usize,
) -> i64 {
    let eligible: Vec<&ScoredCandidate> = pool.iter().filter(|c| c.eligible).collect();
    let config = selector.config();
    let budget_units = config.budget_units(budget);
    let mut best = 0i64;
    for mask in 0u32..(1u32 << eligible.len()) {
        if mask.count_ones() as usize > max_items {
            continue;
        }
        let mut units = 0u64;
        let mut value = 0i64;
        for (index, candidate) in eligible.iter().enumerate() {
            if mask & (1 << index) != 0 {
                units += config.cost_units(candidate.candidate.cost);
                value += config.scaled_score(candidate.score);
            }
        }
        if units <= budget_units {
            best = best.max(value);
        }
    }
    best
}

fn random_pool(seed: u64, size: usize) -> Vec<ScoredCandidate> {
    let mut rng = Lcg::new(seed);
    (0..size)
        .map(|index| {
            let cost = rng.range(15, 120) * 1_000 + rng.range(0, 3) * 500;
            let score = rng.unit() * 3.0 - 0.5;
            let eligible = rng.range(0, 5) != 0;
            scored(&format!("A{index:02}"), cost, score, eligible)
        })
        .collect()
}

#[test]
fn given_five_candidates_when_budget_is_six_units_then_total_score_is_twenty_two() {
    let selector = unit_scale_selector();
    let pool: Vec<ScoredCandidate> = [10_000, 20_000, 30_000, 40_000, 50_000]
        .into_iter()
        .zip([5.0, 8.0, 11.0, 14.0, 17.0])
        .enumerate()
        .map(|(index, (cost, score))| scored(&format!("C{}", index + 1), cost, score, true))
        .collect();

    let selection = selector
        .select(&pool, 60_000, 2)
        .expect("selection should succeed");

    assert_eq!(selection.info.note, SelectionNote::Selected);
    assert_eq!(selection.info.selected_count, 2);
    assert_eq!(selection.info.selected_cost, 60_000);
    assert_eq!(scaled_total(&selector, &selection.selected), 22);

    let mut ids = selection.selected_ids();
    ids.sort();
    assert!(
        ids == vec!["C2", "C4"] || ids == vec!["C1", "C5"],
        "unexpected optimum {ids:?}"
    );
}

#[test]
fn given_tied_optima_when_selecting_then_first_subset_in_input_order_is_kept() {
    let selector = unit_scale_selector();
    let pool: Vec<ScoredCandidate> = [10_000, 20_000, 30_000, 40_000, 50_000]
        .into_iter()
        .zip([5.0, 8.0, 11.0, 14.0, 17.0])
        .enumerate()
        .map(|(index, (cost, score))| scored(&format!("C{}", index + 1), cost, score, true))
        .collect();

    let selection = selector
        .select(&pool, 60_000, 2)
        .expect("selection should succeed");

    assert_eq!(selection.selected_ids(), vec!["C4", "C2"]);
}

#[test]
fn given_random_pools_when_selecting_then_result_is_feasible_and_optimal() {
    let selector = BoundedKnapsackSelector::default();
    for seed in 1..=24u64 {
        let pool = random_pool(seed, 12);
        let budget = Lcg::new(seed + 100).range(40, 260) * 1_000;
        let max_items = (seed % 5 + 1) as usize;

        let selection = selector
            .select(&pool, budget, max_items)
            .expect("selection should succeed");

        assert!(selection.info.selected_cost <= budget, "seed {seed}");
        assert!(selection.selected.len() <= max_items, "seed {seed}");
        assert!(
            selection.selected.iter().all(|candidate| candidate.eligible),
            "seed {seed}"
        );
        assert_eq!(
            scaled_total(&selector, &selection.selected),
            brute_force_best(&selector, &pool, budget, max_items),
            "seed {seed}"
        );
    }
}

#[test]
fn given_identical_inputs_when_selecting_twice_then_results_match() {
    let selector = BoundedKnapsackSelector::default();
    let pool = random_pool(7, 18);

    let first = selector.select(&pool, 650_000, 5).expect("first run");
    let second = selector.select(&pool, 650_000, 5).expect("second run");

    assert_eq!(first, second);
}

#[test]
fn given_growing_budget_when_selecting_then_total_score_never_decreases() {
    let selector = BoundedKnapsackSelector::default();
    let pool = random_pool(11, 14);
    let mut previous = i64::MIN;

    for budget in (20_000..=400_000).step_by(20_000) {
        let selection = selector.select(&pool, budget, 4).expect("selection");
        let total = scaled_total(&selector, &selection.selected);
        assert!(total >= previous, "budget {budget}: {total} < {previous}");
        previous = total;
    }
}

#[test]
fn given_only_negative_scores_when_selecting_then_empty_baseline_wins() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("N1", 10_000, -0.4, true),
        scored("N2", 20_000, -0.1, true),
    ];

    let selection = selector.select(&pool, 100_000, 2).expect("selection");

    assert!(selection.is_empty());
    assert_eq!(selection.info.note, SelectionNote::NoFeasibleSelection);
    assert_eq!(selection.info.selected_score, 0.0);
    assert_eq!(selection.info.eligible_count, 2);
}

#[test]
fn given_negative_and_positive_scores_when_selecting_then_negative_items_are_left_out() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("P1", 10_000, 0.7, true),
        scored("N1", 10_000, -0.2, true),
    ];

    let selection = selector.select(&pool, 100_000, 2).expect("selection");

    assert_eq!(selection.selected_ids(), vec!["P1"]);
}

#[test]
fn given_no_eligible_candidates_when_selecting_then_note_reports_it() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![scored("X1", 10_000, 2.0, false)];

    let selection = selector.select(&pool, 100_000, 3).expect("selection");
    assert!(selection.is_empty());
    assert_eq!(selection.info.note, SelectionNote::NoEligibleCandidates);

    let selection = selector.select(&[], 100_000, 3).expect("selection");
    assert_eq!(selection.info.note, SelectionNote::NoEligibleCandidates);
}

#[test]
fn given_budget_below_every_cost_when_selecting_then_selection_is_empty() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("A1", 80_000, 1.0, true),
        scored("A2", 90_000, 2.0, true),
    ];

    let selection = selector.select(&pool, 50_000, 3).expect("selection");

    assert!(selection.is_empty());
    assert_eq!(selection.info.note, SelectionNote::NoFeasibleSelection);
}

#[test]
fn given_ineligible_top_scorer_when_selecting_then_it_is_never_chosen() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("blocked", 10_000, 9.0, false),
        scored("A1", 10_000, 1.0, true),
        scored("A2", 10_000, 0.5, true),
    ];

    let selection = selector.select(&pool, 100_000, 3).expect("selection");

    assert_eq!(selection.selected_ids(), vec!["A1", "A2"]);
    assert_eq!(selection.info.selected_cost, 20_000);
}

#[test]
fn given_costs_off_the_bucket_grid_when_selecting_then_real_budget_still_holds() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("H1", 1_500, 1.0, true),
        scored("H2", 1_500, 1.0, true),
        scored("H3", 1_500, 1.0, true),
    ];

    let selection = selector.select(&pool, 3_000, 3).expect("selection");

    assert!(selection.info.selected_cost <= 3_000);
    assert_eq!(selection.info.selected_count, 1);
}

#[test]
fn given_item_limit_when_selecting_then_count_is_bounded() {
    let selector = BoundedKnapsackSelector::default();
    let pool: Vec<ScoredCandidate> = (0..6)
        .map(|index| scored(&format!("A{index}"), 1_000, 1.0 + index as f64, true))
        .collect();

    let selection = selector.select(&pool, 1_000_000, 2).expect("selection");

    assert_eq!(selection.selected_ids(), vec!["A5", "A4"]);
    assert_eq!(selection.info.max_items, 2);
}

#[test]
fn given_zero_budget_or_item_limit_when_selecting_then_invalid_policy_is_returned() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![scored("A1", 1_000, 1.0, true)];

    let err = selector.select(&pool, 0, 2).expect_err("zero budget");
    assert_eq!(err.kind, PlannerErrorKind::InvalidPolicy);

    let err = selector.select(&pool, 10_000, 0).expect_err("zero max_items");
    assert_eq!(err.kind, PlannerErrorKind::InvalidPolicy);
}

#[test]
fn given_zero_cost_bucket_when_selecting_then_invalid_config_is_returned() {
    let selector = BoundedKnapsackSelector::new(SelectorConfig {
        cost_bucket: 0,
        score_scale: 1_000.0,
    });

    let err = selector
        .select(&[scored("A1", 1_000, 1.0, true)], 10_000, 2)
        .expect_err("zero bucket");
    assert_eq!(err.kind, PlannerErrorKind::InvalidConfig);
}

#[test]
fn given_scores_whose_sum_exceeds_i64_when_selecting_then_every_item_is_still_taken() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("B1", 10_000, 5.0e15, true),
        scored("B2", 10_000, 5.0e15, true),
        scored("B3", 10_000, 5.0e15, true),
    ];

    let selection = selector.select(&pool, 1_000_000, 3).expect("selection");

    assert_eq!(selection.info.selected_count, 3);
    assert_eq!(selection.selected_ids(), vec!["B1", "B2", "B3"]);
}

#[test]
fn given_score_beyond_integer_range_when_selecting_then_invalid_candidate_is_returned() {
    let selector = BoundedKnapsackSelector::default();
    let pool = vec![
        scored("A1", 10_000, 1.0, true),
        scored("huge", 10_000, 1.0e300, true),
    ];

    let err = selector
        .select(&pool, u64::MAX, usize::MAX)
        .expect_err("score cannot be represented after scaling");
    assert_eq!(err.kind, PlannerErrorKind::InvalidCandidate);
    assert!(err.message.contains("huge"));
}
