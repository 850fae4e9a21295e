use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub strength: u32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub goals_for: i32,
    #[serde(default)]
    pub goals_against: i32,
    #[serde(default)]
    pub goal_diff: i32,
    #[serde(default)]
    pub wins: i32,
    #[serde(default)]
    pub draws: i32,
    #[serde(default)]
    pub losses: i32,
}

impl Team {
    pub fn new(id: u32, name: impl Into<String>, strength: u32) -> Self {
        Self {
            id,
            name: name.into(),
            strength,
            points: 0,
            goals_for: 0,
            goals_against: 0,
            goal_diff: 0,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }

    /// Folds one result into the season totals. `goals_for` is always this
    /// team's own tally, whichever end it played at.
    pub fn apply_result(&mut self, goals_for: u32, goals_against: u32) {
        self.goals_for = self.goals_for.saturating_add(goal_count(goals_for));
        self.goals_against = self.goals_against.saturating_add(goal_count(goals_against));
        self.goal_diff = self.goals_for.saturating_sub(self.goals_against);

        match SideResult::for_side(goals_for, goals_against) {
            SideResult::Won => {
                self.wins += 1;
                self.points += 3;
            }
            SideResult::Lost => self.losses += 1,
            SideResult::Drawn => {
                self.draws += 1;
                self.points += 1;
            }
        }
    }

    /// Exact inverse of [`Team::apply_result`] for the same score line.
    pub fn revert_result(&mut self, goals_for: u32, goals_against: u32) {
        self.goals_for = self.goals_for.saturating_sub(goal_count(goals_for));
        self.goals_against = self.goals_against.saturating_sub(goal_count(goals_against));
        self.goal_diff = self.goals_for.saturating_sub(self.goals_against);

        match SideResult::for_side(goals_for, goals_against) {
            SideResult::Won => {
                self.wins -= 1;
                self.points -= 3;
            }
            SideResult::Lost => self.losses -= 1,
            SideResult::Drawn => {
                self.draws -= 1;
                self.points -= 1;
            }
        }
    }

    pub fn reset_stats(&mut self) {
        *self = Self::new(self.id, std::mem::take(&mut self.name), self.strength);
    }

    pub fn matches_played(&self) -> i32 {
        self.wins + self.draws + self.losses
    }

    pub fn is_consistent(&self) -> bool {
        self.goal_diff == self.goals_for.saturating_sub(self.goals_against)
            && self.points == 3 * self.wins + self.draws
    }
}

/// Largest goal count a single side may record in one match.
pub const MAX_GOALS: u32 = 999;

fn goal_count(goals: u32) -> i32 {
    i32::try_from(goals).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideResult {
    Won,
    Drawn,
    Lost,
}

impl SideResult {
    fn for_side(goals_for: u32, goals_against: u32) -> Self {
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => SideResult::Won,
            std::cmp::Ordering::Equal => SideResult::Drawn,
            std::cmp::Ordering::Less => SideResult::Lost,
        }
    }
}

/// Result of a score line from the perspective of the first-named side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub fn from_score(home_goals: u32, away_goals: u32) -> Self {
        if home_goals > away_goals {
            Outcome::HomeWin
        } else if home_goals < away_goals {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchResult {
    #[default]
    Unplayed,
    Played { home_goals: u32, away_goals: u32 },
}

impl MatchResult {
    pub fn goals(self) -> Option<(u32, u32)> {
        match self {
            MatchResult::Unplayed => None,
            MatchResult::Played {
                home_goals,
                away_goals,
            } => Some((home_goals, away_goals)),
        }
    }

    pub fn outcome(self) -> Option<Outcome> {
        self.goals().map(|(h, a)| Outcome::from_score(h, a))
    }
}

/// A fixture between two teams in a given week.
///
/// On the wire this is the flat record the store owns (nullable goals plus a
/// `played` flag); in memory the result is a [`MatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MatchRecord", into = "MatchRecord")]
pub struct Match {
    pub id: u32,
    pub name_home: String,
    pub name_away: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub week: u32,
    pub result: MatchResult,
}

impl Match {
    pub fn fixture(id: u32, week: u32, home: &Team, away: &Team) -> Self {
        Self {
            id,
            name_home: home.name.clone(),
            name_away: away.name.clone(),
            home_team_id: home.id,
            away_team_id: away.id,
            week,
            result: MatchResult::Unplayed,
        }
    }

    pub fn is_played(&self) -> bool {
        matches!(self.result, MatchResult::Played { .. })
    }

    pub fn goals(&self) -> Option<(u32, u32)> {
        self.result.goals()
    }

    /// Stores a final score and hands back whatever was recorded before.
    pub fn record(&mut self, home_goals: u32, away_goals: u32) -> MatchResult {
        std::mem::replace(
            &mut self.result,
            MatchResult::Played {
                home_goals,
                away_goals,
            },
        )
    }
}

/// Flat persisted shape of a [`Match`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u32,
    #[serde(default)]
    pub name_home: String,
    #[serde(default)]
    pub name_away: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
    pub week: u32,
    #[serde(default)]
    pub played: bool,
}

impl From<MatchRecord> for Match {
    fn from(rec: MatchRecord) -> Self {
        // Played iff both goals are present; the flag alone is not trusted.
        let result = match (rec.home_goals, rec.away_goals) {
            (Some(home_goals), Some(away_goals)) => MatchResult::Played {
                home_goals,
                away_goals,
            },
            _ => MatchResult::Unplayed,
        };
        Match {
            id: rec.id,
            name_home: rec.name_home,
            name_away: rec.name_away,
            home_team_id: rec.home_team_id,
            away_team_id: rec.away_team_id,
            week: rec.week,
            result,
        }
    }
}

impl From<Match> for MatchRecord {
    fn from(m: Match) -> Self {
        let goals = m.result.goals();
        MatchRecord {
            id: m.id,
            name_home: m.name_home,
            name_away: m.name_away,
            home_team_id: m.home_team_id,
            away_team_id: m.away_team_id,
            home_goals: goals.map(|(h, _)| h),
            away_goals: goals.map(|(_, a)| a),
            week: m.week,
            played: goals.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyResult {
    pub week: u32,
    pub standings: Vec<Team>,
}

pub fn find_team(teams: &[Team], id: u32) -> Option<&Team> {
    teams.iter().find(|t| t.id == id)
}

pub fn team_index(teams: &[Team], id: u32) -> Option<usize> {
    teams.iter().position(|t| t.id == id)
}

/// Highest week that has at least one played match, 0 before kickoff.
pub fn last_played_week(matches: &[Match]) -> u32 {
    matches
        .iter()
        .filter(|m| m.is_played())
        .map(|m| m.week)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_goal_counts_saturate_instead_of_wrapping() {
        let mut team = Team::new(1, "Home", 70);
        team.apply_result(3_000_000_000, 0);
        assert_eq!(team.goals_for, i32::MAX);
        assert_eq!(team.wins, 1);
        team.apply_result(5, 1);
        assert_eq!(team.goals_for, i32::MAX);
        assert!(team.goal_diff > 0);
    }

    #[test]
    fn result_is_read_from_this_sides_goals() {
        let mut away = Team::new(2, "Away", 60);
        away.apply_result(3, 1);
        assert_eq!((away.wins, away.losses, away.points), (1, 0, 3));
        away.apply_result(0, 2);
        assert_eq!((away.wins, away.losses, away.points), (1, 1, 3));
    }

    #[test]
    fn apply_then_revert_is_identity() {
        let mut team = Team::new(1, "Home", 70);
        team.apply_result(3, 1);
        team.apply_result(0, 0);
        let before = team.clone();

        for (gf, ga) in [(2, 0), (1, 1), (0, 4)] {
            team.apply_result(gf, ga);
            assert!(team.is_consistent());
            team.revert_result(gf, ga);
            assert_eq!(team, before);
        }
    }

    #[test]
    fn draw_gives_one_point_each_way() {
        let mut team = Team::new(1, "A", 50);
        team.apply_result(2, 2);
        assert_eq!(team.points, 1);
        assert_eq!(team.draws, 1);
        assert_eq!(team.goal_diff, 0);
    }

    #[test]
    fn record_with_missing_goal_is_unplayed() {
        let raw = r#"{"id":7,"home_team_id":1,"away_team_id":2,"home_goals":3,"away_goals":null,"week":2,"played":true}"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert_eq!(m.result, MatchResult::Unplayed);
        assert!(!m.is_played());
    }

    #[test]
    fn match_serializes_to_flat_record() {
        let home = Team::new(1, "Lions", 80);
        let away = Team::new(2, "Wolves", 60);
        let mut m = Match::fixture(3, 1, &home, &away);
        let before = m.record(2, 1);
        assert_eq!(before, MatchResult::Unplayed);

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["home_goals"], 2);
        assert_eq!(json["away_goals"], 1);
        assert_eq!(json["played"], true);
        assert_eq!(json["name_home"], "Lions");

        let back: Match = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn last_played_week_ignores_unplayed() {
        let a = Team::new(1, "A", 50);
        let b = Team::new(2, "B", 50);
        let mut m1 = Match::fixture(1, 1, &a, &b);
        m1.record(1, 0);
        let m2 = Match::fixture(2, 2, &b, &a);
        assert_eq!(last_played_week(&[m1, m2]), 1);
        assert_eq!(last_played_week(&[]), 0);
    }
}
