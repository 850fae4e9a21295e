use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::LeagueConfig;
use crate::correction::{CorrectionOutcome, correct_match_result};
use crate::error::{LeagueError, LeagueResult};
use crate::estimator::{Estimator, ProbabilityReport};
use crate::model::{Match, Team, WeeklyResult, last_played_week};
use crate::standings::sorted_standings;
use crate::store::LeagueStore;
use crate::week::play_week_simulation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekOutcome {
    pub week: u32,
    pub standings: Vec<Team>,
    pub probabilities: ProbabilityReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub weeks: Vec<WeeklyResult>,
    pub probabilities: BTreeMap<u32, ProbabilityReport>,
}

/// Drives the real season on top of a store: one week at a time, all at
/// once, corrections and resets. Taking `&mut self` keeps corrections from
/// interleaving.
pub struct Season<S: LeagueStore> {
    store: S,
    season_weeks: u32,
    min_weeks_for_estimate: u32,
    estimator: Estimator,
    rng: StdRng,
}

impl<S: LeagueStore> Season<S> {
    pub fn new(store: S, cfg: &LeagueConfig) -> Self {
        let rng = match cfg.seed {
            // Keep the live-season stream apart from the estimator streams.
            Some(seed) => StdRng::seed_from_u64(seed ^ 0x5EA5_0000_0000_0000),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            season_weeks: cfg.season_weeks,
            min_weeks_for_estimate: cfg.min_weeks_for_estimate,
            estimator: Estimator::new(cfg.estimator()),
            rng,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn season_weeks(&self) -> u32 {
        self.season_weeks
    }

    pub fn teams(&self) -> LeagueResult<Vec<Team>> {
        self.store.load_teams().map_err(LeagueError::storage)
    }

    pub fn matches(&self) -> LeagueResult<Vec<Match>> {
        self.store.load_matches().map_err(LeagueError::storage)
    }

    pub fn standings(&self) -> LeagueResult<Vec<Team>> {
        Ok(sorted_standings(&self.teams()?))
    }

    pub fn current_week(&self) -> LeagueResult<u32> {
        Ok(last_played_week(&self.matches()?))
    }

    /// Plays the next week of the real season and persists it.
    pub fn play_week(&mut self) -> LeagueResult<WeekOutcome> {
        let mut teams = self.teams()?;
        let mut matches = self.matches()?;

        let current = last_played_week(&matches);
        let mut played_week = None;
        // A week with nothing playable would otherwise stall the season.
        for week in current.saturating_add(1)..=self.season_weeks {
            let summary = play_week_simulation(week, &mut teams, &mut matches, &mut self.rng);
            for orphan in &summary.orphans {
                tracing::warn!(%orphan, week, "fixture skipped");
            }
            if summary.played > 0 {
                played_week = Some((week, summary.played));
                break;
            }
        }
        let Some((week, played)) = played_week else {
            tracing::info!(final_week = current, "season has ended");
            return Err(LeagueError::SeasonEnded {
                final_week: current,
            });
        };

        self.store
            .save(&teams, &matches)
            .map_err(LeagueError::storage)?;
        tracing::info!(week, played, "week played");

        let probabilities = self.report(&teams, &matches, week);
        Ok(WeekOutcome {
            week,
            standings: sorted_standings(&teams),
            probabilities,
        })
    }

    /// Plays every remaining week. Stops on `SeasonEnded`; any other error
    /// is returned.
    pub fn play_all(&mut self) -> LeagueResult<SeasonSummary> {
        let mut weeks = Vec::new();
        let mut probabilities = BTreeMap::new();
        loop {
            match self.play_week() {
                Ok(outcome) => {
                    weeks.push(WeeklyResult {
                        week: outcome.week,
                        standings: outcome.standings,
                    });
                    probabilities.insert(outcome.week, outcome.probabilities);
                }
                Err(LeagueError::SeasonEnded { .. }) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(SeasonSummary {
            weeks,
            probabilities,
        })
    }

    pub fn reset(&mut self) -> LeagueResult<()> {
        let mut teams = self.teams()?;
        let mut matches = self.matches()?;
        for team in &mut teams {
            team.reset_stats();
        }
        for m in &mut matches {
            m.result = Default::default();
        }
        self.store
            .save(&teams, &matches)
            .map_err(LeagueError::storage)?;
        tracing::info!("season reset");
        Ok(())
    }

    pub fn correct_result(
        &mut self,
        match_id: u32,
        home_goals: u32,
        away_goals: u32,
    ) -> LeagueResult<CorrectionOutcome> {
        let mut teams = self.teams()?;
        let mut matches = self.matches()?;
        let correction =
            correct_match_result(&mut matches, &mut teams, match_id, home_goals, away_goals)?;
        self.store
            .save(&teams, &matches)
            .map_err(LeagueError::storage)?;
        let probabilities = self.report(&teams, &matches, last_played_week(&matches));
        Ok(CorrectionOutcome {
            correction,
            standings: sorted_standings(&teams),
            probabilities,
        })
    }

    pub fn probabilities(&self) -> LeagueResult<ProbabilityReport> {
        let teams = self.teams()?;
        let matches = self.matches()?;
        let week = last_played_week(&matches);
        Ok(self.report(&teams, &matches, week))
    }

    fn report(&self, teams: &[Team], matches: &[Match], week: u32) -> ProbabilityReport {
        self.estimator
            .report(teams, matches, week, self.min_weeks_for_estimate)
    }
}
