use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

use crate::planner::{
    error::{PlannerError, invalid_candidate, invalid_config, invalid_policy},
    types::{SELECTION_METHOD, ScoredCandidate, Selection, SelectionInfo, SelectionNote},
};

/// 2^63: scaled scores must stay strictly below this to be exact `i64`s.
const SCALED_SCORE_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn default_cost_bucket() -> u64 {
    1_000
}

fn default_score_scale() -> f64 {
    1_000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Currency units per discretized cost unit.
    #[serde(default = "default_cost_bucket")]
    pub cost_bucket: u64,
    /// Multiplier applied to scores before truncating them to integers.
    #[serde(default = "default_score_scale")]
    pub score_scale: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            cost_bucket: default_cost_bucket(),
            score_scale: default_score_scale(),
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.cost_bucket == 0 {
            return Err(invalid_config("selector.cost_bucket must be greater than zero"));
        }
        if !self.score_scale.is_finite() || self.score_scale <= 0.0 {
            return Err(invalid_config(format!(
                "selector.score_scale must be a positive number, got {}",
                self.score_scale
            )));
        }
        Ok(())
    }

    /// Item costs round up and the budget rounds down, so a selection that
    /// fits in bucket units always fits the real budget.
    pub fn cost_units(&self, cost: u64) -> u64 {
        cost.div_ceil(self.cost_bucket)
    }

    pub fn budget_units(&self, budget: u64) -> u64 {
        budget / self.cost_bucket
    }

    pub fn scaled_score(&self, score: f64) -> i64 {
        (score * self.score_scale).trunc() as i64
    }

    /// Like `scaled_score`, but `None` when the scaled value would saturate.
    pub fn checked_scaled_score(&self, score: f64) -> Option<i64> {
        let scaled = (score * self.score_scale).trunc();
        (scaled.is_finite() && scaled.abs() < SCALED_SCORE_LIMIT).then_some(scaled as i64)
    }
}

#[derive(Debug, Clone, Copy)]
struct Item {
    cost_units: u64,
    value: i128,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    value: i128,
    trail: Option<usize>,
}

/// Append-only record of "item taken on top of trail `prev`". Cells are
/// overwritten as better values appear, so back-pointers must reference
/// these immutable links rather than other cells.
#[derive(Debug, Clone, Copy)]
struct TrailLink {
    item: usize,
    prev: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct BestCell {
    count: usize,
    cost_units: u64,
    value: i128,
    trail: Option<usize>,
}

impl BestCell {
    fn beats(&self, other: &BestCell) -> bool {
        match self.value.cmp(&other.value) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => (self.cost_units, self.count) < (other.cost_units, other.count),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundedKnapsackSelector {
    config: SelectorConfig,
}

impl BoundedKnapsackSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn select(
        &self,
        scored: &[ScoredCandidate],
        budget: u64,
        max_items: usize,
    ) -> Result<Selection, PlannerError> {
        self.config.validate()?;
        if budget == 0 {
            return Err(invalid_policy("budget must be greater than zero"));
        }
        if max_items == 0 {
            return Err(invalid_policy("max_items must be greater than zero"));
        }

        let eligible: Vec<&ScoredCandidate> =
            scored.iter().filter(|candidate| candidate.eligible).collect();
        if eligible.is_empty() {
            tracing::debug!(
                target: "planner.selector",
                budget = budget,
                max_items = max_items,
                "no_eligible_candidates"
            );
            return Ok(self.empty_selection(
                budget,
                max_items,
                0,
                SelectionNote::NoEligibleCandidates,
            ));
        }

        let items = eligible
            .iter()
            .map(|candidate| self.item(candidate))
            .collect::<Result<Vec<_>, _>>()?;
        let budget_units = self.config.budget_units(budget);
        let max_count = max_items.min(items.len());

        let best = solve(&items, budget_units, max_count);
        let Some(best) = best else {
            tracing::debug!(
                target: "planner.selector",
                budget = budget,
                budget_units = budget_units,
                eligible_count = eligible.len(),
                "no_feasible_selection"
            );
            return Ok(self.empty_selection(
                budget,
                max_items,
                eligible.len(),
                SelectionNote::NoFeasibleSelection,
            ));
        };

        let mut selected: Vec<ScoredCandidate> = best
            .iter()
            .map(|&index| (*eligible[index]).clone())
            .collect();
        selected.sort_by(|lhs, rhs| rhs.score.partial_cmp(&lhs.score).unwrap_or(Ordering::Equal));

        let selected_cost = selected
            .iter()
            .fold(0u64, |acc, candidate| acc.saturating_add(candidate.candidate.cost));
        let selected_score: f64 = selected.iter().map(|candidate| candidate.score).sum();

        tracing::debug!(
            target: "planner.selector",
            budget = budget,
            budget_units = budget_units,
            eligible_count = eligible.len(),
            selected_count = selected.len(),
            selected_cost = selected_cost,
            selected_score = selected_score,
            "selection_completed"
        );

        Ok(Selection {
            info: SelectionInfo {
                method: SELECTION_METHOD.to_string(),
                note: SelectionNote::Selected,
                budget,
                max_items,
                cost_bucket: self.config.cost_bucket,
                eligible_count: eligible.len(),
                selected_count: selected.len(),
                selected_cost,
                selected_score,
            },
            selected,
        })
    }

    fn item(&self, candidate: &ScoredCandidate) -> Result<Item, PlannerError> {
        let value = self
            .config
            .checked_scaled_score(candidate.score)
            .ok_or_else(|| {
                invalid_candidate(format!(
                    "candidate '{}' score {} is out of range at score_scale {}",
                    candidate.id(),
                    candidate.score,
                    self.config.score_scale
                ))
            })?;
        Ok(Item {
            cost_units: self.config.cost_units(candidate.candidate.cost),
            value: i128::from(value),
        })
    }

    fn empty_selection(
        &self,
        budget: u64,
        max_items: usize,
        eligible_count: usize,
        note: SelectionNote,
    ) -> Selection {
        Selection {
            selected: Vec::new(),
            info: SelectionInfo {
                method: SELECTION_METHOD.to_string(),
                note,
                budget,
                max_items,
                cost_bucket: self.config.cost_bucket,
                eligible_count,
                selected_count: 0,
                selected_cost: 0,
                selected_score: 0.0,
            },
        }
    }
}

/// Sparse 0/1 knapsack with a cardinality bound. `states[k]` maps cost units
/// to the best value reachable with exactly `k` items. Returns item indices
/// in the order they were taken, or `None` when nothing beats the empty
/// selection. Values are summed in `i128`; each item fits in `i64`, so the
/// sum of at most `max_count` of them cannot overflow.
fn solve(items: &[Item], budget_units: u64, max_count: usize) -> Option<Vec<usize>> {
    let mut states: Vec<BTreeMap<u64, Cell>> = vec![BTreeMap::new(); max_count + 1];
    let mut trails: Vec<TrailLink> = Vec::new();
    states[0].insert(
        0,
        Cell {
            value: 0,
            trail: None,
        },
    );

    for (index, item) in items.iter().enumerate() {
        if item.cost_units > budget_units {
            continue;
        }
        for count in (0..max_count).rev() {
            let transitions: Vec<(u64, i128, Option<usize>)> = states[count]
                .iter()
                .filter_map(|(&cost_units, cell)| {
                    let next_cost = cost_units.checked_add(item.cost_units)?;
                    (next_cost <= budget_units).then_some((
                        next_cost,
                        cell.value + item.value,
                        cell.trail,
                    ))
                })
                .collect();

            for (next_cost, next_value, prev) in transitions {
                let improves = states[count + 1]
                    .get(&next_cost)
                    .is_none_or(|existing| next_value > existing.value);
                if !improves {
                    continue;
                }
                trails.push(TrailLink { item: index, prev });
                states[count + 1].insert(
                    next_cost,
                    Cell {
                        value: next_value,
                        trail: Some(trails.len() - 1),
                    },
                );
            }
        }
    }

    let mut best = BestCell {
        count: 0,
        cost_units: 0,
        value: 0,
        trail: None,
    };
    for (count, cells) in states.iter().enumerate().skip(1) {
        for (&cost_units, cell) in cells {
            let contender = BestCell {
                count,
                cost_units,
                value: cell.value,
                trail: cell.trail,
            };
            if contender.beats(&best) {
                best = contender;
            }
        }
    }

    if best.count == 0 {
        return None;
    }

    let mut chosen = Vec::with_capacity(best.count);
    let mut cursor = best.trail;
    while let Some(link) = cursor.and_then(|position| trails.get(position)) {
        chosen.push(link.item);
        cursor = link.prev;
    }
    chosen.reverse();
    Some(chosen)
}
