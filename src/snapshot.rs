use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{OffsetDateTime, macros::format_description};
use uuid::Uuid;

use crate::planner::{
    Candidate, Evaluation, Policy, Recommendation, ScoredCandidate, Selection, SelectorConfig,
    error::{PlannerError, persistence_error},
};

pub const SNAPSHOT_VERSION: u64 = 1;
const SNAPSHOT_FILE_PREFIX: &str = "decision_snapshot";

/// Audit record of one evaluation cycle: inputs, outputs and a digest of the
/// inputs so two snapshots can be compared without diffing candidate lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSnapshot {
    pub version: u64,
    pub snapshot_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub input_digest: String,
    pub policy: Policy,
    pub selector: SelectorConfig,
    pub candidates: Vec<Candidate>,
    pub scored_top: Vec<ScoredCandidate>,
    pub selection: Selection,
    pub recommendation: Recommendation,
}

impl EvaluationSnapshot {
    pub fn capture(
        candidates: &[Candidate],
        selector: &SelectorConfig,
        evaluation: &Evaluation,
        scored_top: usize,
    ) -> Result<Self, PlannerError> {
        Ok(Self {
            version: SNAPSHOT_VERSION,
            snapshot_id: Uuid::now_v7().to_string(),
            generated_at: OffsetDateTime::now_utc(),
            input_digest: input_digest(&evaluation.policy, selector, candidates)?,
            policy: evaluation.policy,
            selector: *selector,
            candidates: candidates.to_vec(),
            scored_top: evaluation.scored.iter().take(scored_top).cloned().collect(),
            selection: evaluation.selection.clone(),
            recommendation: evaluation.recommendation.clone(),
        })
    }
}

/// Digest over everything that determines the evaluation outcome.
pub fn input_digest(
    policy: &Policy,
    selector: &SelectorConfig,
    candidates: &[Candidate],
) -> Result<String, PlannerError> {
    let policy_value = serde_json::to_value(policy)
        .map_err(|err| persistence_error(format!("failed to encode policy: {err}")))?;
    let selector_value = serde_json::to_value(selector)
        .map_err(|err| persistence_error(format!("failed to encode selector: {err}")))?;
    let candidates_value = serde_json::to_value(candidates)
        .map_err(|err| persistence_error(format!("failed to encode candidates: {err}")))?;

    let mut canonical = serde_json::Map::new();
    canonical.insert("candidates".to_string(), candidates_value);
    canonical.insert("policy".to_string(), policy_value);
    canonical.insert("selector".to_string(), selector_value);
    let canonical = canonicalize_json(&serde_json::Value::Object(canonical));

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

fn canonicalize_json(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys = map.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                if let Some(item) = map.get(&key) {
                    sorted.insert(key, canonicalize_json(item));
                }
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize_json).collect())
        }
        primitive => primitive.clone(),
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, snapshot: &EvaluationSnapshot) -> Result<PathBuf, PlannerError> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            persistence_error(format!(
                "failed to create snapshot directory '{}': {err}",
                self.dir.display()
            ))
        })?;

        let path = self.dir.join(snapshot_file_name(snapshot)?);
        let tmp_path = path.with_extension("tmp");
        let file = fs::File::create(&tmp_path).map_err(|err| {
            persistence_error(format!(
                "failed to create snapshot temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;
        {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, snapshot).map_err(|err| {
                persistence_error(format!(
                    "failed to serialize snapshot '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.write_all(b"\n").map_err(|err| {
                persistence_error(format!(
                    "failed to finalize snapshot '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.flush().map_err(|err| {
                persistence_error(format!(
                    "failed to flush snapshot '{}': {err}",
                    tmp_path.display()
                ))
            })?;
        }

        fs::rename(&tmp_path, &path).map_err(|err| {
            persistence_error(format!(
                "failed to move snapshot into place '{}': {err}",
                path.display()
            ))
        })?;

        tracing::info!(
            target: "snapshot",
            snapshot_id = %snapshot.snapshot_id,
            path = %path.display(),
            input_digest = %snapshot.input_digest,
            "snapshot_written"
        );
        Ok(path)
    }
}

fn snapshot_file_name(snapshot: &EvaluationSnapshot) -> Result<String, PlannerError> {
    let stamp = snapshot
        .generated_at
        .to_offset(time::UtcOffset::UTC)
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .map_err(|err| persistence_error(format!("failed to format snapshot file name: {err}")))?;
    // Trailing uuid v7 characters are random; leading ones repeat within a millisecond.
    let compact = snapshot.snapshot_id.replace('-', "");
    let suffix = &compact[compact.len().saturating_sub(8)..];
    Ok(format!("{SNAPSHOT_FILE_PREFIX}_{stamp}_{suffix}.json"))
}
