use thiserror::Error;

/// Failures surfaced by the league engine and its boundary services.
///
/// Callers branch on the variant. `SeasonEnded` in particular is a normal
/// stop signal for "play until done" loops, not a fatal condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeagueError {
    #[error("season has ended after week {final_week}")]
    SeasonEnded { final_week: u32 },

    #[error("match {match_id} not found")]
    MatchNotFound { match_id: u32 },

    /// A fixture points at a team that is not in the team set. The simulator
    /// skips such fixtures; this variant exists for reporting.
    #[error("match {match_id} references unknown team {team_id}")]
    OrphanReference { match_id: u32, team_id: u32 },

    #[error("match {match_id}: score {home_goals}-{away_goals} is out of range")]
    InvalidScore {
        match_id: u32,
        home_goals: u32,
        away_goals: u32,
    },

    #[error("storage: {0}")]
    Storage(String),
}

impl LeagueError {
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

pub type LeagueResult<T> = std::result::Result<T, LeagueError>;
