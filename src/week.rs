use rand::Rng;

use crate::error::LeagueError;
use crate::model::{Match, Team, team_index};
use crate::outcome::simulate_match;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSummary {
    pub week: u32,
    pub played: usize,
    /// Fixtures left unplayed because a side is missing from the team set.
    pub orphans: Vec<LeagueError>,
}

/// Plays every unplayed fixture of `week` and folds the scores into `teams`.
///
/// Fixtures that reference an unknown team are skipped and reported in the
/// summary; they never abort the week.
pub fn play_week_simulation(
    week: u32,
    teams: &mut [Team],
    matches: &mut [Match],
    rng: &mut impl Rng,
) -> WeekSummary {
    let mut summary = WeekSummary {
        week,
        ..WeekSummary::default()
    };

    for m in matches.iter_mut() {
        if m.week != week || m.is_played() {
            continue;
        }
        let Some(home_idx) = team_index(teams, m.home_team_id) else {
            summary.orphans.push(LeagueError::OrphanReference {
                match_id: m.id,
                team_id: m.home_team_id,
            });
            continue;
        };
        let Some(away_idx) = team_index(teams, m.away_team_id) else {
            summary.orphans.push(LeagueError::OrphanReference {
                match_id: m.id,
                team_id: m.away_team_id,
            });
            continue;
        };

        let (home_goals, away_goals) =
            simulate_match(teams[home_idx].strength, teams[away_idx].strength, rng);

        m.record(home_goals, away_goals);
        teams[home_idx].apply_result(home_goals, away_goals);
        teams[away_idx].apply_result(away_goals, home_goals);
        summary.played += 1;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchResult;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn league() -> (Vec<Team>, Vec<Match>) {
        let teams = vec![
            Team::new(1, "A", 70),
            Team::new(2, "B", 60),
            Team::new(3, "C", 50),
            Team::new(4, "D", 40),
        ];
        let matches = vec![
            Match::fixture(1, 1, &teams[0], &teams[1]),
            Match::fixture(2, 1, &teams[2], &teams[3]),
            Match::fixture(3, 2, &teams[0], &teams[2]),
        ];
        (teams, matches)
    }

    #[test]
    fn plays_only_requested_week() {
        let (mut teams, mut matches) = league();
        let mut rng = StdRng::seed_from_u64(11);
        let summary = play_week_simulation(1, &mut teams, &mut matches, &mut rng);

        assert_eq!(summary.played, 2);
        assert!(matches[0].is_played());
        assert!(matches[1].is_played());
        assert!(!matches[2].is_played());
        for team in &teams {
            assert_eq!(team.matches_played(), 1);
            assert!(team.is_consistent());
        }
    }

    #[test]
    fn already_played_fixture_is_left_alone() {
        let (mut teams, mut matches) = league();
        matches[0].result = MatchResult::Played {
            home_goals: 5,
            away_goals: 5,
        };
        let mut rng = StdRng::seed_from_u64(2);
        let summary = play_week_simulation(1, &mut teams, &mut matches, &mut rng);

        assert_eq!(summary.played, 1);
        assert_eq!(matches[0].goals(), Some((5, 5)));
        assert_eq!(teams[0].matches_played(), 0);
    }

    #[test]
    fn orphan_fixture_is_skipped() {
        let (mut teams, mut matches) = league();
        matches[1].away_team_id = 99;
        let mut rng = StdRng::seed_from_u64(5);
        let summary = play_week_simulation(1, &mut teams, &mut matches, &mut rng);

        assert_eq!(summary.played, 1);
        assert_eq!(
            summary.orphans,
            vec![LeagueError::OrphanReference {
                match_id: 2,
                team_id: 99
            }]
        );
        assert!(!matches[1].is_played());
        assert_eq!(teams[2].matches_played(), 0);
    }

    #[test]
    fn goals_are_mirrored_between_sides() {
        let (mut teams, mut matches) = league();
        let mut rng = StdRng::seed_from_u64(8);
        play_week_simulation(1, &mut teams, &mut matches, &mut rng);

        let (h, a) = matches[0].goals().unwrap();
        assert_eq!(teams[0].goals_for, h as i32);
        assert_eq!(teams[0].goals_against, a as i32);
        assert_eq!(teams[1].goals_for, a as i32);
        assert_eq!(teams[1].goals_against, h as i32);
    }
}
