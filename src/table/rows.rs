use serde::Serialize;
use std::collections::BTreeMap;

use super::{SortKey, SortValue};
use crate::aggregator::calendar::short_date_label;
use crate::aggregator::TeamMap;
use crate::scorestream::{Game, FINAL_SEGMENT_ID};
use crate::settlement::{has_real_score, SettlementTier, NO_SCORE_GRADE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Final,
    #[serde(rename = "In Progress")]
    InProgress,
    Scheduled,
}

impl GameStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Final => "Final",
            GameStatus::InProgress => "In Progress",
            GameStatus::Scheduled => "Scheduled",
        }
    }
}

/// Display-ready projection of one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRow {
    pub game_id: i64,
    pub date: String,
    pub home: String,
    pub home_mascot: Option<String>,
    pub away: String,
    pub away_mascot: Option<String>,
    /// "H - A", or "Upcoming" before a real score exists
    pub score: String,
    pub status: GameStatus,
    pub margin: Option<i64>,
    pub grade: Option<i32>,
    pub tier: SettlementTier,
    pub tier_color: &'static str,
    /// Confidence bar fill in percent; zero while the grade is null or the sentinel
    pub bar_width: i32,
    pub url: Option<String>,
    /// Per-column sort projections so a renderer can re-sort without
    /// re-deriving them
    pub sort_keys: BTreeMap<&'static str, SortValue>,
}

impl GameRow {
    pub fn new(game: &Game, teams: &TeamMap) -> Self {
        let grade = game.last_score.as_ref().and_then(|s| s.confidence_grade);
        let tier = SettlementTier::from_grade(grade);
        let scored = game.last_score.as_ref().filter(|_| has_real_score(grade));

        // Final is checked on the raw segment, even for a sentinel grade.
        let status = if game
            .last_score
            .as_ref()
            .is_some_and(|s| s.game_segment_id == FINAL_SEGMENT_ID)
        {
            GameStatus::Final
        } else if scored.is_some() {
            GameStatus::InProgress
        } else {
            GameStatus::Scheduled
        };

        let (home, home_mascot) = team_label(teams, game.home_team_id);
        let (away, away_mascot) = team_label(teams, game.away_team_id);

        GameRow {
            game_id: game.game_id,
            date: short_date_label(&game.start_date_time),
            home,
            home_mascot,
            away,
            away_mascot,
            score: scored
                .map(|s| format!("{} - {}", s.home_team_score, s.away_team_score))
                .unwrap_or_else(|| "Upcoming".to_string()),
            status,
            margin: scored
                .map(|s| (i64::from(s.home_team_score) - i64::from(s.away_team_score)).abs()),
            grade,
            tier,
            tier_color: tier.color(),
            bar_width: match grade {
                Some(g) if g != NO_SCORE_GRADE => g.clamp(0, 100),
                _ => 0,
            },
            url: Some(game.url.clone()).filter(|u| !u.is_empty()),
            sort_keys: SortKey::ALL
                .iter()
                .map(|k| (k.as_str(), k.value(game, teams)))
                .collect(),
        }
    }

    pub fn grade_label(&self) -> String {
        match self.grade {
            Some(g) if g != NO_SCORE_GRADE => g.to_string(),
            _ => "—".to_string(),
        }
    }

    pub fn margin_label(&self) -> String {
        self.margin
            .map(|m| m.to_string())
            .unwrap_or_else(|| "—".to_string())
    }
}

fn team_label(teams: &TeamMap, id: i64) -> (String, Option<String>) {
    match teams.get(&id) {
        Some(t) => (
            t.team_name.clone(),
            Some(t.mascot.clone()).filter(|m| !m.is_empty()),
        ),
        None => (format!("#{}", id), None),
    }
}

pub fn build_rows(games: &[Game], teams: &TeamMap) -> Vec<GameRow> {
    games.iter().map(|g| GameRow::new(g, teams)).collect()
}
