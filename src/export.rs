use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::estimator::ChampionshipOdds;
use crate::model::{Match, Team, find_team};
use crate::standings::sorted_standings;

pub struct ExportReport {
    pub teams: usize,
    pub matches: usize,
    pub probabilities: usize,
}

pub fn export_season_report(
    path: &Path,
    teams: &[Team],
    matches: &[Match],
    odds: Option<&ChampionshipOdds>,
) -> Result<ExportReport> {
    let mut standings_rows = vec![vec![
        "Pos".to_string(),
        "Team".to_string(),
        "P".to_string(),
        "W".to_string(),
        "D".to_string(),
        "L".to_string(),
        "GF".to_string(),
        "GA".to_string(),
        "GD".to_string(),
        "Pts".to_string(),
        "Strength".to_string(),
    ]];
    let table = sorted_standings(teams);
    for (pos, team) in table.iter().enumerate() {
        standings_rows.push(vec![
            (pos + 1).to_string(),
            team.name.clone(),
            team.matches_played().to_string(),
            team.wins.to_string(),
            team.draws.to_string(),
            team.losses.to_string(),
            team.goals_for.to_string(),
            team.goals_against.to_string(),
            team.goal_diff.to_string(),
            team.points.to_string(),
            team.strength.to_string(),
        ]);
    }

    let mut match_rows = vec![vec![
        "Match ID".to_string(),
        "Week".to_string(),
        "Home".to_string(),
        "Away".to_string(),
        "Score".to_string(),
    ]];
    for m in matches {
        let score = m
            .goals()
            .map(|(h, a)| format!("{h}-{a}"))
            .unwrap_or_default();
        match_rows.push(vec![
            m.id.to_string(),
            m.week.to_string(),
            m.name_home.clone(),
            m.name_away.clone(),
            score,
        ]);
    }

    let mut prob_rows = vec![vec![
        "Team ID".to_string(),
        "Team".to_string(),
        "Title %".to_string(),
        "Trials Won".to_string(),
    ]];
    if let Some(odds) = odds {
        for (team_id, pct) in &odds.probabilities {
            let name = find_team(teams, *team_id)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            let won = odds.tallies.get(team_id).copied().unwrap_or(0);
            prob_rows.push(vec![
                team_id.to_string(),
                name,
                format!("{pct:.3}"),
                won.to_string(),
            ]);
        }
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &standings_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_rows(sheet, &match_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Probabilities")?;
        write_rows(sheet, &prob_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        teams: standings_rows.len() - 1,
        matches: match_rows.len() - 1,
        probabilities: prob_rows.len() - 1,
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{EstimatorConfig, estimate_championship_probabilities};
    use crate::seed::default_league;

    #[test]
    fn writes_all_three_sheets() {
        let (teams, mut matches) = default_league();
        matches[0].record(1, 0);
        let odds =
            estimate_championship_probabilities(&teams, &matches, 1, &EstimatorConfig::seeded(50, 1));

        let path = std::env::temp_dir().join(format!("league_export_{}.xlsx", std::process::id()));
        let report = export_season_report(&path, &teams, &matches, Some(&odds)).unwrap();
        assert_eq!(report.teams, 4);
        assert_eq!(report.matches, 12);
        assert_eq!(report.probabilities, 4);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn probabilities_sheet_is_empty_without_odds() {
        let (teams, matches) = default_league();
        let path = std::env::temp_dir().join(format!("league_export_none_{}.xlsx", std::process::id()));
        let report = export_season_report(&path, &teams, &matches, None).unwrap();
        assert_eq!(report.probabilities, 0);
        let _ = std::fs::remove_file(&path);
    }
}
