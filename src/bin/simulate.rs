use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use league_sim::config::LeagueConfig;
use league_sim::error::LeagueError;
use league_sim::logging;
use league_sim::season::Season;
use league_sim::store::SqliteStore;

fn main() -> Result<()> {
    logging::init();

    let mut cfg = LeagueConfig::from_env();
    if let Some(seed) = parse_arg("--seed") {
        cfg.seed = Some(seed.parse().with_context(|| format!("invalid --seed {seed}"))?);
    }
    if let Some(trials) = parse_arg("--trials") {
        let trials: usize = trials
            .parse()
            .with_context(|| format!("invalid --trials {trials}"))?;
        if trials == 0 {
            return Err(anyhow!("--trials must be positive"));
        }
        cfg.trials = trials;
    }

    let store = match parse_arg("--db").map(PathBuf::from).or(cfg.db_path.clone()) {
        Some(path) => SqliteStore::open(&path)?,
        None => SqliteStore::open_in_memory()?,
    };
    let mut season = Season::new(store, &cfg);

    if has_flag("--reset") {
        season.reset()?;
    }

    let json = if has_flag("--estimate") {
        serde_json::to_string_pretty(&season.probabilities()?)?
    } else if has_flag("--all") {
        let summary = season.play_all()?;
        if summary.weeks.is_empty() {
            tracing::info!("nothing left to play");
        }
        serde_json::to_string_pretty(&summary)?
    } else {
        match season.play_week() {
            Ok(outcome) => serde_json::to_string_pretty(&outcome)?,
            Err(LeagueError::SeasonEnded { final_week }) => {
                println!("Season has ended after week {final_week}");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    };
    println!("{json}");
    Ok(())
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

fn parse_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
