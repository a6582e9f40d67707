use std::{fs, path::Path};

use anyhow::{Context, Result};

use decision_planner::{
    cli::args_from_env,
    config::Config,
    logging::init_tracing,
    planner::{Candidate, Planner},
    snapshot::{EvaluationSnapshot, SnapshotWriter},
};

fn main() -> Result<()> {
    let args = args_from_env()?;
    let config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    let logging_guard = init_tracing(&config.logging)?;

    let candidates_path = args
        .candidates_path
        .unwrap_or_else(|| config.candidates_path.clone());
    let candidates = load_candidates(&candidates_path)?;
    tracing::info!(
        target: "main",
        run_id = %logging_guard.run_id(),
        candidates_path = %candidates_path.display(),
        candidate_count = candidates.len(),
        "candidates_loaded"
    );

    let planner = Planner::new(config.selector);
    let evaluation = planner
        .evaluate(&candidates, &config.policy)
        .context("evaluation failed")?;

    let rendered =
        serde_json::to_string_pretty(&evaluation).context("failed to render evaluation")?;
    println!("{rendered}");

    if config.snapshot.enabled {
        let snapshot = EvaluationSnapshot::capture(
            &candidates,
            planner.selector().config(),
            &evaluation,
            config.snapshot.scored_top,
        )
        .context("failed to capture snapshot")?;
        let path = SnapshotWriter::new(config.snapshot.dir.clone())
            .write(&snapshot)
            .context("failed to write snapshot")?;
        eprintln!("snapshot saved to {}", path.display());
    }

    Ok(())
}

fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse candidates {}", path.display()))
}
