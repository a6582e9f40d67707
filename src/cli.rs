use std::path::PathBuf;

use anyhow::{Result, anyhow};

const USAGE: &str = "usage: decision-planner [--config <path>] [--candidates <path>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    /// Overrides `candidates_path` from the config file.
    pub candidates_path: Option<PathBuf>,
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut candidates_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config_path = Some(PathBuf::from(value));
            }
            "--candidates" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --candidates"))?;
                candidates_path = Some(PathBuf::from(value));
            }
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    Ok(CliArgs {
        config_path: config_path.unwrap_or_else(|| PathBuf::from("./planner.jsonc")),
        candidates_path,
    })
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(std::env::args().skip(1))
}
