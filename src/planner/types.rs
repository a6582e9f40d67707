use serde::{Deserialize, Serialize};

pub type CandidateId = String;

/// Costs are divided by this before computing ROI, so ROI reads as
/// "benefit per 100k currency units".
pub const ROI_COST_NORMALIZER: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    /// Smallest currency unit.
    pub cost: u64,
    pub benefit: f64,
    pub risk: f64,
    pub effort_days: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Candidate {
    pub fn new(
        id: impl Into<CandidateId>,
        cost: u64,
        benefit: f64,
        risk: f64,
        effort_days: f64,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            cost,
            benefit,
            risk,
            effort_days,
            confidence,
            label: None,
            category: None,
        }
    }

    /// A zero-cost candidate reports `f64::MAX` so it clears any ROI floor
    /// while staying a finite JSON number.
    pub fn roi(&self) -> f64 {
        let normalized_cost = self.cost as f64 / ROI_COST_NORMALIZER;
        if normalized_cost <= 0.0 {
            return f64::MAX;
        }
        self.benefit / normalized_cost
    }
}

fn default_policy_budget() -> u64 {
    650_000
}

fn default_policy_max_risk() -> f64 {
    0.55
}

fn default_policy_min_roi() -> f64 {
    0.8
}

fn default_policy_max_items() -> usize {
    5
}

fn default_policy_risk_penalty() -> f64 {
    0.9
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default = "default_policy_budget")]
    pub budget: u64,
    #[serde(default = "default_policy_max_risk")]
    pub max_risk: f64,
    #[serde(default = "default_policy_min_roi")]
    pub min_roi: f64,
    #[serde(default = "default_policy_max_items")]
    pub max_items: usize,
    #[serde(default = "default_policy_risk_penalty")]
    pub risk_penalty: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            budget: default_policy_budget(),
            max_risk: default_policy_max_risk(),
            min_roi: default_policy_min_roi(),
            max_items: default_policy_max_items(),
            risk_penalty: default_policy_risk_penalty(),
        }
    }
}

impl Policy {
    pub fn with_max_risk(self, max_risk: f64) -> Self {
        Self { max_risk, ..self }
    }

    pub fn with_min_roi(self, min_roi: f64) -> Self {
        Self { min_roi, ..self }
    }

    pub fn admits(&self, candidate: &Candidate) -> bool {
        candidate.risk <= self.max_risk && candidate.roi() >= self.min_roi
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub roi: f64,
    pub score: f64,
    pub eligible: bool,
}

impl ScoredCandidate {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionNote {
    Selected,
    NoEligibleCandidates,
    NoFeasibleSelection,
}

pub const SELECTION_METHOD: &str = "bounded_knapsack";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionInfo {
    pub method: String,
    pub note: SelectionNote,
    pub budget: u64,
    pub max_items: usize,
    pub cost_bucket: u64,
    pub eligible_count: usize,
    pub selected_count: usize,
    pub selected_cost: u64,
    pub selected_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub selected: Vec<ScoredCandidate>,
    pub info: SelectionInfo,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.selected.iter().map(ScoredCandidate::id).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyField {
    MaxRisk,
    MinRoi,
}

impl PolicyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxRisk => "max_risk",
            Self::MinRoi => "min_roi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationSuggestion {
    pub field: PolicyField,
    pub from: f64,
    pub to: f64,
    pub eligible_count: usize,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Sufficient,
    Fix,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub status: RecommendationStatus,
    pub target_eligible: usize,
    pub current_eligible: usize,
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<RelaxationSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub policy: Policy,
    pub scored: Vec<ScoredCandidate>,
    pub selection: Selection,
    pub recommendation: Recommendation,
}
