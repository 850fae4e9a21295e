use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use league_sim::config::LeagueConfig;
use league_sim::error::LeagueError;
use league_sim::estimator::ProbabilityReport;
use league_sim::export::export_season_report;
use league_sim::model::last_played_week;
use league_sim::season::Season;
use league_sim::state::{AppState, DraftSide};
use league_sim::store::SqliteStore;

struct App {
    state: AppState,
    season: Season<SqliteStore>,
    export_path: PathBuf,
    should_quit: bool,
}

impl App {
    fn new(season: Season<SqliteStore>) -> Self {
        let export_path = std::env::var("EXPORT_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("league_report.xlsx"));
        let mut app = Self {
            state: AppState::new(season.season_weeks()),
            season,
            export_path,
            should_quit: false,
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        match (self.season.teams(), self.season.matches()) {
            (Ok(teams), Ok(matches)) => {
                let week = last_played_week(&matches);
                self.state.refresh(teams, matches, week);
            }
            (Err(err), _) | (_, Err(err)) => {
                self.state.push_log(format!("[WARN] Load failed: {err}"));
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('w') => self.play_week(),
            KeyCode::Char('a') => self.play_all(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('p') => self.refresh_probabilities(),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.state.bump_draft(DraftSide::Home, 1),
            KeyCode::Char('-') => self.state.bump_draft(DraftSide::Home, -1),
            KeyCode::Char('>') | KeyCode::Char('.') => self.state.bump_draft(DraftSide::Away, 1),
            KeyCode::Char('<') | KeyCode::Char(',') => self.state.bump_draft(DraftSide::Away, -1),
            KeyCode::Char('c') | KeyCode::Enter => self.commit_draft(),
            KeyCode::Esc => self.state.draft = None,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn play_week(&mut self) {
        match self.season.play_week() {
            Ok(outcome) => {
                self.state
                    .push_log(format!("[INFO] Week {} played", outcome.week));
                self.state
                    .push_log(format!("[INFO] {}", outcome.probabilities.message()));
                self.state.probabilities = Some(outcome.probabilities);
            }
            Err(LeagueError::SeasonEnded { final_week }) => {
                self.state
                    .push_log(format!("[INFO] Season has ended (week {final_week})"));
            }
            Err(err) => self.state.push_log(format!("[WARN] Play week failed: {err}")),
        }
        self.reload();
    }

    fn play_all(&mut self) {
        match self.season.play_all() {
            Ok(summary) => {
                self.state.push_log(format!(
                    "[INFO] Played {} week(s) to the end of the season",
                    summary.weeks.len()
                ));
                if let Some((_, last)) = summary.probabilities.into_iter().next_back() {
                    self.state.probabilities = Some(last);
                }
            }
            Err(err) => self.state.push_log(format!("[WARN] Play all failed: {err}")),
        }
        self.reload();
    }

    fn reset(&mut self) {
        match self.season.reset() {
            Ok(()) => {
                self.state.probabilities = None;
                self.state.draft = None;
                self.state.push_log("[INFO] Season reset");
            }
            Err(err) => self.state.push_log(format!("[WARN] Reset failed: {err}")),
        }
        self.reload();
    }

    fn refresh_probabilities(&mut self) {
        match self.season.probabilities() {
            Ok(report) => {
                self.state.push_log(format!("[INFO] {}", report.message()));
                self.state.probabilities = Some(report);
            }
            Err(err) => self
                .state
                .push_log(format!("[WARN] Probabilities failed: {err}")),
        }
    }

    fn commit_draft(&mut self) {
        let Some(draft) = self.state.take_draft() else {
            self.state
                .push_log("[INFO] Adjust a score with +/- and </> first");
            return;
        };
        match self
            .season
            .correct_result(draft.match_id, draft.home_goals, draft.away_goals)
        {
            Ok(outcome) => {
                let c = &outcome.correction;
                let before = c
                    .previous_goals
                    .map(|(h, a)| format!("{h}-{a}"))
                    .unwrap_or_else(|| "unplayed".to_string());
                self.state.push_log(format!(
                    "[INFO] Match {} corrected: {} -> {}-{}",
                    c.match_id, before, c.home_goals, c.away_goals
                ));
                self.state.probabilities = Some(outcome.probabilities);
            }
            Err(err) => self.state.push_log(format!("[WARN] Correction failed: {err}")),
        }
        self.reload();
    }

    fn export(&mut self) {
        let odds = self
            .state
            .probabilities
            .as_ref()
            .and_then(ProbabilityReport::odds);
        match export_season_report(
            &self.export_path,
            &self.state.teams,
            &self.state.matches,
            odds,
        ) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} teams, {} matches to {}",
                report.teams,
                report.matches,
                self.export_path.display()
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cfg = LeagueConfig::from_env();
    let store = match cfg.db_path.as_deref() {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_in_memory()?,
    };
    let season = Season::new(store, &cfg);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(season);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(8)])
        .split(columns[0]);

    let table = Paragraph::new(standings_text(&app.state))
        .block(Block::default().title("Standings").borders(Borders::ALL));
    frame.render_widget(table, left[0]);
    render_probabilities(frame, left[1], &app.state);
    render_fixtures(frame, columns[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "w Week | a All | r Reset | p Odds | j/k Select | +/- Home | </> Away | c Commit | x Export | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let status = if state.season_over() {
        "season complete".to_string()
    } else {
        format!("week {}/{}", state.current_week, state.season_weeks)
    };
    let line1 = format!("  .-.  LEAGUE SIM | {status}");
    let line2 = " (   )".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn standings_text(state: &AppState) -> String {
    let mut lines = vec![format!(
        "{:>3}  {:<18}{:>3}{:>3}{:>3}{:>3}{:>4}{:>4}{:>5}{:>5}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    )];
    for (pos, t) in state.standings().iter().enumerate() {
        lines.push(format!(
            "{:>3}  {:<18}{:>3}{:>3}{:>3}{:>3}{:>4}{:>4}{:>+5}{:>5}",
            pos + 1,
            truncate(&t.name, 17),
            t.matches_played(),
            t.wins,
            t.draws,
            t.losses,
            t.goals_for,
            t.goals_against,
            t.goal_diff,
            t.points
        ));
    }
    lines.join("\n")
}

fn render_probabilities(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Championship Odds")
        .borders(Borders::ALL);
    let odds = match state.probabilities.as_ref() {
        Some(ProbabilityReport::Ready(odds)) => odds,
        Some(report) => {
            let p = Paragraph::new(report.message())
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(p, area);
            return;
        }
        None => {
            let p = Paragraph::new("Press p to estimate")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(p, area);
            return;
        }
    };

    let bars: Vec<Bar> = state
        .standings()
        .iter()
        .map(|t| {
            let pct = odds.probability(t.id);
            Bar::default()
                .value(pct.round() as u64)
                .label(Line::from(truncate(&t.name, 12)))
                .text_value(format!("{pct:.1}%"))
                .style(Style::default().fg(Color::Green))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100);
    frame.render_widget(chart, area);
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Fixtures").borders(Borders::ALL);
    if state.matches.is_empty() {
        let empty = Paragraph::new("No fixtures")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(state.selected, state.matches.len(), visible);

    let mut lines = Vec::with_capacity(end - start);
    for idx in start..end {
        let m = &state.matches[idx];
        let selected = idx == state.selected;
        let draft = state.draft.filter(|d| selected && d.match_id == m.id);
        let score = match (draft, m.goals()) {
            (Some(d), _) => format!("{}-{}*", d.home_goals, d.away_goals),
            (None, Some((h, a))) => format!("{h}-{a}"),
            (None, None) => "v".to_string(),
        };
        let text = format!(
            "W{} {:>14} {:^6} {:<14}",
            m.week,
            truncate(&m.name_home, 14),
            score,
            truncate(&m.name_away, 14)
        );
        let style = if selected {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else if m.is_played() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "League Sim - Help",
        "",
        "Season:",
        "  w            Play next week",
        "  a            Play remaining weeks",
        "  r            Reset season",
        "  p            Re-estimate championship odds",
        "  x            Export report (.xlsx)",
        "",
        "Results:",
        "  j/k or ↑/↓   Select match",
        "  + / -        Home goals",
        "  > / <        Away goals",
        "  c / Enter    Commit corrected score",
        "  Esc          Discard draft",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
