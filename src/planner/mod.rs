pub mod error;
pub mod facade;
pub mod relaxation;
pub mod scorer;
pub mod selector;
pub mod types;

pub use error::{PlannerError, PlannerErrorKind};
pub use facade::Planner;
pub use relaxation::{suggest_relaxation, target_eligible};
pub use scorer::{count_eligible, score_candidates, validate_candidates, validate_policy};
pub use selector::{BoundedKnapsackSelector, SelectorConfig};
pub use types::{
    Candidate, CandidateId, Evaluation, Policy, PolicyField, Recommendation,
    RecommendationStatus, RelaxationSuggestion, ScoredCandidate, Selection, SelectionInfo,
    SelectionNote,
};
