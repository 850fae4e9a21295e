use std::collections::VecDeque;

use crate::estimator::ProbabilityReport;
use crate::model::{Match, Team};
use crate::standings::sorted_standings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDraft {
    pub match_id: u32,
    pub home_goals: u32,
    pub away_goals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSide {
    Home,
    Away,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    pub current_week: u32,
    pub season_weeks: u32,
    pub probabilities: Option<ProbabilityReport>,
    pub selected: usize,
    pub draft: Option<ScoreDraft>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(season_weeks: u32) -> Self {
        Self {
            teams: Vec::new(),
            matches: Vec::new(),
            current_week: 0,
            season_weeks,
            probabilities: None,
            selected: 0,
            draft: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    /// Replaces the cached league. The selection is clamped, and a draft for
    /// a match that no longer exists is dropped.
    pub fn refresh(&mut self, teams: Vec<Team>, matches: Vec<Match>, current_week: u32) {
        self.teams = teams;
        self.matches = matches;
        self.current_week = current_week;
        if self.selected >= self.matches.len() {
            self.selected = self.matches.len().saturating_sub(1);
        }
        if let Some(draft) = self.draft {
            if !self.matches.iter().any(|m| m.id == draft.match_id) {
                self.draft = None;
            }
        }
    }

    pub fn standings(&self) -> Vec<Team> {
        sorted_standings(&self.teams)
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.matches.len() - 1);
        self.draft = None;
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.draft = None;
    }

    /// Moves one side of the draft score, starting the draft from the
    /// selected match's recorded score (0-0 if unplayed).
    pub fn bump_draft(&mut self, side: DraftSide, delta: i32) {
        let Some(m) = self.selected_match() else {
            return;
        };
        let mut draft = match self.draft {
            Some(d) if d.match_id == m.id => d,
            _ => {
                let (home_goals, away_goals) = m.goals().unwrap_or((0, 0));
                ScoreDraft {
                    match_id: m.id,
                    home_goals,
                    away_goals,
                }
            }
        };
        let slot = match side {
            DraftSide::Home => &mut draft.home_goals,
            DraftSide::Away => &mut draft.away_goals,
        };
        *slot = slot.saturating_add_signed(delta).min(99);
        self.draft = Some(draft);
    }

    pub fn take_draft(&mut self) -> Option<ScoreDraft> {
        self.draft.take()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn season_over(&self) -> bool {
        self.current_week >= self.season_weeks
    }
}
