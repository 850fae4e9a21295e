use serde::Serialize;

use crate::error::{LeagueError, LeagueResult};
use crate::estimator::{EstimatorConfig, ProbabilityReport, probability_report};
use crate::model::{MAX_GOALS, Match, Team, last_played_week, team_index};
use crate::standings::sorted_standings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub match_id: u32,
    pub week: u32,
    pub previous_goals: Option<(u32, u32)>,
    pub home_goals: u32,
    pub away_goals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionOutcome {
    pub correction: Correction,
    pub standings: Vec<Team>,
    pub probabilities: ProbabilityReport,
}

/// Replaces the recorded score of one match and moves team totals with it.
///
/// An earlier result is taken back out of both teams' totals before the new
/// one is applied, so re-recording the same score is a no-op on the table.
/// An unknown match id, or a side above [`MAX_GOALS`], fails before anything
/// is touched.
pub fn correct_match_result(
    matches: &mut [Match],
    teams: &mut [Team],
    match_id: u32,
    home_goals: u32,
    away_goals: u32,
) -> LeagueResult<Correction> {
    let Some(m) = matches.iter_mut().find(|m| m.id == match_id) else {
        return Err(LeagueError::MatchNotFound { match_id });
    };
    if home_goals > MAX_GOALS || away_goals > MAX_GOALS {
        return Err(LeagueError::InvalidScore {
            match_id,
            home_goals,
            away_goals,
        });
    }

    let home_idx = team_index(teams, m.home_team_id);
    let away_idx = team_index(teams, m.away_team_id);
    if home_idx.is_none() || away_idx.is_none() {
        tracing::warn!(
            match_id,
            home_team_id = m.home_team_id,
            away_team_id = m.away_team_id,
            "correcting a match with an unknown side; only known sides are updated"
        );
    }

    let previous_goals = m.record(home_goals, away_goals).goals();

    if let Some((old_home, old_away)) = previous_goals {
        if let Some(i) = home_idx {
            teams[i].revert_result(old_home, old_away);
        }
        if let Some(i) = away_idx {
            teams[i].revert_result(old_away, old_home);
        }
    }
    if let Some(i) = home_idx {
        teams[i].apply_result(home_goals, away_goals);
    }
    if let Some(i) = away_idx {
        teams[i].apply_result(away_goals, home_goals);
    }

    tracing::info!(
        match_id,
        week = m.week,
        ?previous_goals,
        home_goals,
        away_goals,
        "match result corrected"
    );

    Ok(Correction {
        match_id,
        week: m.week,
        previous_goals,
        home_goals,
        away_goals,
    })
}

/// Applies a correction, then rebuilds the table and, once enough weeks are
/// in, fresh title odds from the corrected state.
pub fn correct_and_estimate(
    matches: &mut [Match],
    teams: &mut [Team],
    match_id: u32,
    home_goals: u32,
    away_goals: u32,
    min_weeks: u32,
    cfg: &EstimatorConfig,
) -> LeagueResult<CorrectionOutcome> {
    let correction = correct_match_result(matches, teams, match_id, home_goals, away_goals)?;
    let current_week = last_played_week(matches);
    let probabilities = probability_report(teams, matches, current_week, min_weeks, cfg);
    Ok(CorrectionOutcome {
        correction,
        standings: sorted_standings(teams),
        probabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Vec<Team>, Vec<Match>) {
        let teams = vec![Team::new(1, "Home", 60), Team::new(2, "Away", 55)];
        let matches = vec![Match::fixture(10, 1, &teams[0], &teams[1])];
        (teams, matches)
    }

    #[test]
    fn unknown_match_touches_nothing() {
        let (mut teams, mut matches) = pair();
        let before = (teams.clone(), matches.clone());
        let err = correct_match_result(&mut matches, &mut teams, 99, 1, 0).unwrap_err();
        assert_eq!(err, LeagueError::MatchNotFound { match_id: 99 });
        assert_eq!((teams, matches), before);
    }

    #[test]
    fn first_entry_applies_without_revert() {
        let (mut teams, mut matches) = pair();
        let c = correct_match_result(&mut matches, &mut teams, 10, 1, 1).unwrap();
        assert_eq!(c.previous_goals, None);
        assert_eq!(teams[0].points, 1);
        assert_eq!(teams[1].points, 1);
        assert_eq!(matches[0].goals(), Some((1, 1)));
    }

    #[test]
    fn same_score_twice_is_stable() {
        let (mut teams, mut matches) = pair();
        correct_match_result(&mut matches, &mut teams, 10, 3, 2).unwrap();
        let after_first = teams.clone();
        correct_match_result(&mut matches, &mut teams, 10, 3, 2).unwrap();
        assert_eq!(teams, after_first);
    }

    #[test]
    fn orphan_side_only_updates_known_team() {
        let (mut teams, mut matches) = pair();
        matches[0].away_team_id = 77;
        correct_match_result(&mut matches, &mut teams, 10, 2, 0).unwrap();
        assert_eq!(teams[0].wins, 1);
        assert_eq!(teams[1].matches_played(), 0);
    }
}
