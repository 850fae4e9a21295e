use std::path::PathBuf;

use anyhow::{Context, Result};

use league_sim::config::LeagueConfig;
use league_sim::logging;
use league_sim::season::Season;
use league_sim::store::SqliteStore;

fn main() -> Result<()> {
    logging::init();

    let match_id: u32 = required_arg("--match")?;
    let home_goals: u32 = required_arg("--home")?;
    let away_goals: u32 = required_arg("--away")?;

    let cfg = LeagueConfig::from_env();
    let db_path = parse_arg("--db")
        .map(PathBuf::from)
        .or(cfg.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let store = SqliteStore::open(&db_path)?;
    let mut season = Season::new(store, &cfg);

    let outcome = season.correct_result(match_id, home_goals, away_goals)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn required_arg<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = parse_arg(name).with_context(|| format!("missing {name}"))?;
    raw.parse::<T>()
        .with_context(|| format!("invalid {name} {raw}"))
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
