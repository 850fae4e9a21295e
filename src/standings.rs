use std::cmp::Ordering;

use crate::model::Team;

fn rank_key(team: &Team) -> (i32, i32, i32) {
    (team.points, team.goal_diff, team.goals_for)
}

/// Table order: points, then goal difference, then goals scored, all
/// descending. Returns `Less` when `a` ranks above `b`.
pub fn compare_standings(a: &Team, b: &Team) -> Ordering {
    rank_key(b).cmp(&rank_key(a))
}

/// The first team that no later team strictly beats. Full ties keep whichever
/// came first in `teams`.
pub fn find_leader(teams: &[Team]) -> Option<&Team> {
    let mut leader: Option<&Team> = None;
    for team in teams {
        match leader {
            Some(best) if compare_standings(team, best) != Ordering::Less => {}
            _ => leader = Some(team),
        }
    }
    leader
}

pub fn leader_id(teams: &[Team]) -> Option<u32> {
    find_leader(teams).map(|t| t.id)
}

pub fn sorted_standings(teams: &[Team]) -> Vec<Team> {
    let mut table = teams.to_vec();
    table.sort_by(compare_standings);
    table
}
