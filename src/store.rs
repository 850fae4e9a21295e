use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, Transaction, params};

use crate::model::{Match, MatchRecord, Team};
use crate::seed;

/// Read/write access to the persisted league. The engine itself only ever
/// sees the vectors this hands out.
pub trait LeagueStore {
    fn load_teams(&self) -> Result<Vec<Team>>;
    fn load_matches(&self) -> Result<Vec<Match>>;
    /// Writes teams and matches together; either all rows land or none do.
    fn save(&mut self, teams: &[Team], matches: &[Match]) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
}

impl MemoryStore {
    pub fn new(teams: Vec<Team>, matches: Vec<Match>) -> Self {
        Self { teams, matches }
    }

    pub fn with_default_league() -> Self {
        let (teams, matches) = seed::default_league();
        Self::new(teams, matches)
    }
}

impl LeagueStore for MemoryStore {
    fn load_teams(&self) -> Result<Vec<Team>> {
        Ok(self.teams.clone())
    }

    fn load_matches(&self) -> Result<Vec<Match>> {
        Ok(self.matches.clone())
    }

    fn save(&mut self, teams: &[Team], matches: &[Match]) -> Result<()> {
        self.teams = teams.to_vec();
        self.matches = matches.to_vec();
        Ok(())
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        let mut store = Self { conn };
        store.seed_if_empty()?;
        Ok(store)
    }

    pub fn seed_if_empty(&mut self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))
            .context("count teams")?;
        if count > 0 {
            return Ok(false);
        }
        let (teams, matches) = seed::default_league();
        self.save(&teams, &matches)?;
        tracing::info!(
            teams = teams.len(),
            matches = matches.len(),
            "seeded default league"
        );
        Ok(true)
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            strength INTEGER NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            goals_for INTEGER NOT NULL DEFAULT 0,
            goals_against INTEGER NOT NULL DEFAULT 0,
            goal_diff INTEGER NOT NULL DEFAULT 0,
            wins INTEGER NOT NULL DEFAULT 0,
            draws INTEGER NOT NULL DEFAULT 0,
            losses INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            name_home TEXT NOT NULL,
            name_away TEXT NOT NULL,
            home_team_id INTEGER NOT NULL,
            away_team_id INTEGER NOT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL,
            week INTEGER NOT NULL,
            played INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_week ON matches(week);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl LeagueStore for SqliteStore {
    fn load_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT id, name, strength, points, goals_for, goals_against,
                       goal_diff, wins, draws, losses
                FROM teams
                ORDER BY id ASC
                "#,
            )
            .context("prepare load teams query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    strength: row.get(2)?,
                    points: row.get(3)?,
                    goals_for: row.get(4)?,
                    goals_against: row.get(5)?,
                    goal_diff: row.get(6)?,
                    wins: row.get(7)?,
                    draws: row.get(8)?,
                    losses: row.get(9)?,
                })
            })
            .context("query load teams")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode team row")?);
        }
        Ok(out)
    }

    fn load_matches(&self) -> Result<Vec<Match>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT id, name_home, name_away, home_team_id, away_team_id,
                       home_goals, away_goals, week, played
                FROM matches
                ORDER BY week ASC, id ASC
                "#,
            )
            .context("prepare load matches query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(MatchRecord {
                    id: row.get(0)?,
                    name_home: row.get(1)?,
                    name_away: row.get(2)?,
                    home_team_id: row.get(3)?,
                    away_team_id: row.get(4)?,
                    home_goals: row.get(5)?,
                    away_goals: row.get(6)?,
                    week: row.get(7)?,
                    played: row.get::<_, i64>(8)? != 0,
                })
            })
            .context("query load matches")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(Match::from(row.context("decode match row")?));
        }
        Ok(out)
    }

    fn save(&mut self, teams: &[Team], matches: &[Match]) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().context("begin save transaction")?;
        for team in teams {
            upsert_team(&tx, team, &updated_at)?;
        }
        for m in matches {
            upsert_match(&tx, m, &updated_at)?;
        }
        tx.commit().context("commit save transaction")?;
        Ok(())
    }
}

fn upsert_team(tx: &Transaction<'_>, team: &Team, updated_at: &str) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO teams (id, name, strength, points, goals_for, goals_against,
                           goal_diff, wins, draws, losses, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            strength = excluded.strength,
            points = excluded.points,
            goals_for = excluded.goals_for,
            goals_against = excluded.goals_against,
            goal_diff = excluded.goal_diff,
            wins = excluded.wins,
            draws = excluded.draws,
            losses = excluded.losses,
            updated_at = excluded.updated_at
        "#,
        params![
            team.id,
            team.name,
            team.strength,
            team.points,
            team.goals_for,
            team.goals_against,
            team.goal_diff,
            team.wins,
            team.draws,
            team.losses,
            updated_at
        ],
    )
    .with_context(|| format!("upsert team {}", team.id))?;
    Ok(())
}

fn upsert_match(tx: &Transaction<'_>, m: &Match, updated_at: &str) -> Result<()> {
    let goals = m.goals();
    tx.execute(
        r#"
        INSERT INTO matches (id, name_home, name_away, home_team_id, away_team_id,
                             home_goals, away_goals, week, played, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            name_home = excluded.name_home,
            name_away = excluded.name_away,
            home_team_id = excluded.home_team_id,
            away_team_id = excluded.away_team_id,
            home_goals = excluded.home_goals,
            away_goals = excluded.away_goals,
            week = excluded.week,
            played = excluded.played,
            updated_at = excluded.updated_at
        "#,
        params![
            m.id,
            m.name_home,
            m.name_away,
            m.home_team_id,
            m.away_team_id,
            goals.map(|(h, _)| h),
            goals.map(|(_, a)| a),
            m.week,
            goals.is_some() as i64,
            updated_at
        ],
    )
    .with_context(|| format!("upsert match {}", m.id))?;
    Ok(())
}
