use league_sim::model::MatchResult;
use league_sim::seed::default_league;
use league_sim::store::{LeagueStore, SqliteStore};

#[test]
fn fresh_database_is_seeded_once() {
    let mut store = SqliteStore::open_in_memory().expect("sqlite");
    let teams = store.load_teams().expect("teams");
    let matches = store.load_matches().expect("matches");
    assert_eq!(teams.len(), 4);
    assert_eq!(matches.len(), 12);
    assert!(matches.iter().all(|m| m.result == MatchResult::Unplayed));

    assert!(!store.seed_if_empty().expect("reseed"));
    assert_eq!(store.load_teams().expect("teams").len(), 4);
}

#[test]
fn saved_results_round_trip() {
    let mut store = SqliteStore::open_in_memory().expect("sqlite");
    let (mut teams, mut matches) = default_league();
    matches[0].record(3, 1);
    teams[0].apply_result(3, 1);
    store.save(&teams, &matches).expect("save");

    assert_eq!(store.load_teams().expect("teams"), teams);
    let loaded = store.load_matches().expect("matches");
    let first = loaded.iter().find(|m| m.id == matches[0].id).expect("match");
    assert_eq!(first.goals(), Some((3, 1)));
    assert_eq!(loaded.iter().filter(|m| m.is_played()).count(), 1);
}

#[test]
fn matches_load_in_week_order() {
    let store = SqliteStore::open_in_memory().expect("sqlite");
    let weeks: Vec<u32> = store
        .load_matches()
        .expect("matches")
        .iter()
        .map(|m| m.week)
        .collect();
    let mut sorted = weeks.clone();
    sorted.sort_unstable();
    assert_eq!(weeks, sorted);
}

#[test]
fn file_database_keeps_state_between_opens() {
    let dir = std::env::temp_dir().join(format!("league_sim_store_{}", std::process::id()));
    let path = dir.join("league.sqlite");
    let _ = std::fs::remove_dir_all(&dir);

    {
        let mut store = SqliteStore::open(&path).expect("open");
        let (teams, mut matches) = default_league();
        matches[1].record(0, 2);
        store.save(&teams, &matches).expect("save");
    }
    let store = SqliteStore::open(&path).expect("reopen");
    let matches = store.load_matches().expect("matches");
    assert_eq!(matches.iter().filter(|m| m.is_played()).count(), 1);

    drop(store);
    let _ = std::fs::remove_dir_all(&dir);
}
