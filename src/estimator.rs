use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use crate::config::{DEFAULT_TRIALS, SEASON_WEEKS, default_parallelism};
use crate::model::{Match, Team};
use crate::standings::leader_id;
use crate::week::play_week_simulation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub trials: usize,
    pub season_weeks: u32,
    /// Number of independent random streams the trials are split across.
    pub parallelism: usize,
    /// Fixed seed for reproducible runs; stream `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            season_weeks: SEASON_WEEKS,
            parallelism: default_parallelism(),
            seed: None,
        }
    }
}

impl EstimatorConfig {
    pub fn seeded(trials: usize, seed: u64) -> Self {
        Self {
            trials,
            seed: Some(seed),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionshipOdds {
    pub current_week: u32,
    pub trials: usize,
    pub tallies: BTreeMap<u32, usize>,
    /// Percentages rounded to three decimals.
    pub probabilities: BTreeMap<u32, f64>,
}

impl ChampionshipOdds {
    pub fn probability(&self, team_id: u32) -> f64 {
        self.probabilities.get(&team_id).copied().unwrap_or(0.0)
    }

    pub fn favourite(&self) -> Option<u32> {
        self.tallies
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(id, _)| *id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbabilityReport {
    NotEnoughWeeks { played: u32, required: u32 },
    Ready(ChampionshipOdds),
}

impl ProbabilityReport {
    pub fn odds(&self) -> Option<&ChampionshipOdds> {
        match self {
            ProbabilityReport::Ready(odds) => Some(odds),
            ProbabilityReport::NotEnoughWeeks { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProbabilityReport::NotEnoughWeeks { played, required } => format!(
                "Not enough weeks played to calculate championship probabilities ({played}/{required})"
            ),
            ProbabilityReport::Ready(odds) => format!(
                "Championship probabilities after week {} ({} trials)",
                odds.current_week, odds.trials
            ),
        }
    }
}

/// An estimator that keeps its worker pool between runs.
pub struct Estimator {
    cfg: EstimatorConfig,
    pool: Option<ThreadPool>,
}

impl Estimator {
    pub fn new(cfg: EstimatorConfig) -> Self {
        let pool = build_sim_pool(cfg.parallelism.max(1));
        Self { cfg, pool }
    }

    pub fn estimate(&self, teams: &[Team], matches: &[Match], current_week: u32) -> ChampionshipOdds {
        estimate_on(self.pool.as_ref(), teams, matches, current_week, &self.cfg)
    }

    pub fn report(
        &self,
        teams: &[Team],
        matches: &[Match],
        current_week: u32,
        min_weeks: u32,
    ) -> ProbabilityReport {
        match gate(current_week, min_weeks) {
            Some(blocked) => blocked,
            None => ProbabilityReport::Ready(self.estimate(teams, matches, current_week)),
        }
    }
}

impl fmt::Debug for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Estimator")
            .field("cfg", &self.cfg)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}

fn gate(current_week: u32, min_weeks: u32) -> Option<ProbabilityReport> {
    (current_week < min_weeks).then_some(ProbabilityReport::NotEnoughWeeks {
        played: current_week,
        required: min_weeks,
    })
}

/// Runs the estimator only once `min_weeks` have been played.
pub fn probability_report(
    teams: &[Team],
    matches: &[Match],
    current_week: u32,
    min_weeks: u32,
    cfg: &EstimatorConfig,
) -> ProbabilityReport {
    match gate(current_week, min_weeks) {
        Some(blocked) => blocked,
        None => ProbabilityReport::Ready(estimate_championship_probabilities(
            teams,
            matches,
            current_week,
            cfg,
        )),
    }
}

/// Completes the remaining season `cfg.trials` times from the given snapshot
/// and reports how often each team finished first.
///
/// Inputs are never mutated. Every team in `teams` appears in the result,
/// including teams that never led. A week at or past the season length
/// simulates nothing and crowns the current leader.
pub fn estimate_championship_probabilities(
    teams: &[Team],
    matches: &[Match],
    current_week: u32,
    cfg: &EstimatorConfig,
) -> ChampionshipOdds {
    let pool = build_sim_pool(cfg.parallelism.max(1).min(cfg.trials.max(1)));
    estimate_on(pool.as_ref(), teams, matches, current_week, cfg)
}

fn estimate_on(
    pool: Option<&ThreadPool>,
    teams: &[Team],
    matches: &[Match],
    current_week: u32,
    cfg: &EstimatorConfig,
) -> ChampionshipOdds {
    let streams = cfg.parallelism.max(1).min(cfg.trials.max(1));
    let chunk_sizes = split_trials(cfg.trials, streams);

    let run = || {
        chunk_sizes
            .par_iter()
            .enumerate()
            .map(|(stream, &n)| {
                let mut rng = stream_rng(cfg.seed, stream);
                run_trials(teams, matches, current_week, cfg.season_weeks, n, &mut rng)
            })
            .reduce(HashMap::new, merge_tallies)
    };
    let counts = match pool {
        Some(pool) => pool.install(run),
        None => run(),
    };

    let mut tallies = BTreeMap::new();
    let mut probabilities = BTreeMap::new();
    for team in teams {
        let count = counts.get(&team.id).copied().unwrap_or(0);
        tallies.insert(team.id, count);
        probabilities.insert(team.id, to_percent(count, cfg.trials));
    }

    tracing::debug!(
        current_week,
        trials = cfg.trials,
        streams,
        "championship probabilities estimated"
    );

    ChampionshipOdds {
        current_week,
        trials: cfg.trials,
        tallies,
        probabilities,
    }
}

/// One worker's share of the trials. Scratch copies are restored from the
/// snapshot before every trial so no trial sees another's results.
fn run_trials(
    base_teams: &[Team],
    base_matches: &[Match],
    current_week: u32,
    season_weeks: u32,
    trials: usize,
    rng: &mut StdRng,
) -> HashMap<u32, usize> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    let mut teams: Vec<Team> = Vec::with_capacity(base_teams.len());
    let mut matches: Vec<Match> = Vec::with_capacity(base_matches.len());

    for _ in 0..trials {
        base_teams.clone_into(&mut teams);
        base_matches.clone_into(&mut matches);

        for week in current_week.saturating_add(1)..=season_weeks {
            play_week_simulation(week, &mut teams, &mut matches, rng);
        }

        if let Some(id) = leader_id(&teams) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

fn split_trials(trials: usize, streams: usize) -> Vec<usize> {
    let base = trials / streams;
    let extra = trials % streams;
    (0..streams)
        .map(|i| base + usize::from(i < extra))
        .collect()
}

fn stream_rng(seed: Option<u64>, stream: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream as u64)),
        None => StdRng::from_entropy(),
    }
}

fn merge_tallies(mut a: HashMap<u32, usize>, b: HashMap<u32, usize>) -> HashMap<u32, usize> {
    for (id, n) in b {
        *a.entry(id).or_insert(0) += n;
    }
    a
}

fn to_percent(count: usize, trials: usize) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    let raw = count as f64 / trials as f64 * 100.0;
    (raw * 1000.0).round() / 1000.0
}

fn build_sim_pool(threads: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(err) => {
            tracing::warn!(%err, threads, "sim pool unavailable; using the global pool");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_covers_every_trial() {
        assert_eq!(split_trials(10, 3), vec![4, 3, 3]);
        assert_eq!(split_trials(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_trials(0, 1), vec![0]);
    }

    #[test]
    fn percent_is_rounded_to_three_places() {
        assert_eq!(to_percent(1, 3), 33.333);
        assert_eq!(to_percent(2, 3), 66.667);
        assert_eq!(to_percent(0, 0), 0.0);
    }

    #[test]
    fn finished_season_always_crowns_current_leader() {
        let mut a = Team::new(1, "A", 10);
        let b = Team::new(2, "B", 90);
        a.apply_result(3, 0);
        let odds = estimate_championship_probabilities(
            &[a, b],
            &[],
            6,
            &EstimatorConfig::seeded(500, 7),
        );
        assert_eq!(odds.tallies[&1], 500);
        assert_eq!(odds.tallies[&2], 0);
        assert_eq!(odds.probability(1), 100.0);
        assert_eq!(odds.probability(2), 0.0);
        assert_eq!(odds.favourite(), Some(1));
    }

    #[test]
    fn gate_blocks_early_weeks() {
        let report = probability_report(&[], &[], 2, 3, &EstimatorConfig::seeded(10, 1));
        assert_eq!(
            report,
            ProbabilityReport::NotEnoughWeeks {
                played: 2,
                required: 3
            }
        );
        assert!(report.odds().is_none());
    }
}
