use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::estimator::EstimatorConfig;

pub const SEASON_WEEKS: u32 = 6;
pub const MIN_WEEKS_FOR_ESTIMATE: u32 = 3;
pub const DEFAULT_TRIALS: usize = 15_000;

const CACHE_DIR: &str = "league_sim";
const DB_FILE: &str = "league.sqlite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueConfig {
    pub season_weeks: u32,
    pub min_weeks_for_estimate: u32,
    pub trials: usize,
    pub parallelism: usize,
    pub seed: Option<u64>,
    pub db_path: Option<PathBuf>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            season_weeks: SEASON_WEEKS,
            min_weeks_for_estimate: MIN_WEEKS_FOR_ESTIMATE,
            trials: DEFAULT_TRIALS,
            parallelism: default_parallelism(),
            seed: None,
            db_path: default_db_path(),
        }
    }
}

impl LeagueConfig {
    /// Reads `.env.local` / `.env` if present, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let d = Self::default();
        Self {
            season_weeks: env_parse("SEASON_WEEKS")
                .unwrap_or(d.season_weeks)
                .clamp(1, 52),
            min_weeks_for_estimate: env_parse("MIN_WEEKS_FOR_ESTIMATE")
                .unwrap_or(d.min_weeks_for_estimate),
            trials: env_parse("SIM_TRIALS")
                .unwrap_or(d.trials)
                .clamp(1, 1_000_000),
            parallelism: env_parse("SIM_PARALLELISM")
                .unwrap_or(d.parallelism)
                .clamp(1, 64),
            seed: env_parse("SIM_SEED"),
            db_path: env::var("LEAGUE_DB_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .or(d.db_path),
        }
    }

    pub fn estimator(&self) -> EstimatorConfig {
        EstimatorConfig {
            trials: self.trials,
            season_weeks: self.season_weeks,
            parallelism: self.parallelism,
            seed: self.seed,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}
