use crate::model::{Match, Team};

pub fn default_teams() -> Vec<Team> {
    vec![
        Team::new(1, "Manchester City", 90),
        Team::new(2, "Liverpool", 85),
        Team::new(3, "Arsenal", 80),
        Team::new(4, "Chelsea", 75),
    ]
}

/// Double round-robin by the circle method: every pair meets once at each
/// ground, one fixture per team per week. With an odd count one team rests
/// each week. Four teams give six weeks.
pub fn double_round_robin(teams: &[Team]) -> Vec<Match> {
    let mut slots: Vec<Option<&Team>> = teams.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }
    let rounds = (n - 1) as u32;

    let mut first_leg: Vec<(u32, &Team, &Team)> = Vec::new();
    for round in 0..rounds {
        for i in 0..n / 2 {
            let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) else {
                continue;
            };
            // Alternate the fixed slot's venue so nobody hosts every week.
            let (home, away) = if i == 0 && round % 2 == 1 {
                (b, a)
            } else {
                (a, b)
            };
            first_leg.push((round + 1, home, away));
        }
        slots[1..].rotate_right(1);
    }

    let mut out = Vec::with_capacity(first_leg.len() * 2);
    let mut next_id = 1u32;
    for (week, home, away) in &first_leg {
        out.push(Match::fixture(next_id, *week, home, away));
        next_id += 1;
    }
    for (week, home, away) in &first_leg {
        out.push(Match::fixture(next_id, *week + rounds, away, home));
        next_id += 1;
    }
    out
}

pub fn default_league() -> (Vec<Team>, Vec<Match>) {
    let teams = default_teams();
    let matches = double_round_robin(&teams);
    (teams, matches)
}
