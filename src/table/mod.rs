pub mod rows;

pub use rows::GameRow;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::aggregator::calendar::parse_api_datetime;
use crate::aggregator::TeamMap;
use crate::scorestream::Game;

/// Stand-in for a value a game doesn't have yet (no score, no segment).
const MISSING: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Home,
    Away,
    Score,
    Margin,
    Confidence,
    Period,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn flipped(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDir::Asc => "↑",
            SortDir::Desc => "↓",
        }
    }
}

/// Comparable projection of a game for one sort key. A key always yields
/// the same variant, so the derived ordering never mixes them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum SortValue {
    Int(i64),
    Text(String),
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Date,
        SortKey::Home,
        SortKey::Away,
        SortKey::Score,
        SortKey::Margin,
        SortKey::Confidence,
        SortKey::Period,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Home => "home",
            SortKey::Away => "away",
            SortKey::Score => "score",
            SortKey::Margin => "margin",
            SortKey::Confidence => "confidence",
            SortKey::Period => "period",
        }
    }

    pub fn value(&self, game: &Game, teams: &TeamMap) -> SortValue {
        let score = game.last_score.as_ref();
        match self {
            SortKey::Date => SortValue::Int(
                parse_api_datetime(&game.start_date_time)
                    .map(|dt| dt.and_utc().timestamp())
                    .unwrap_or(i64::MIN),
            ),
            SortKey::Home => SortValue::Text(team_name_key(teams, game.home_team_id)),
            SortKey::Away => SortValue::Text(team_name_key(teams, game.away_team_id)),
            SortKey::Score => SortValue::Int(
                score
                    .map(|s| i64::from(s.home_team_score) + i64::from(s.away_team_score))
                    .unwrap_or(MISSING),
            ),
            SortKey::Margin => SortValue::Int(
                score
                    .map(|s| (i64::from(s.home_team_score) - i64::from(s.away_team_score)).abs())
                    .unwrap_or(MISSING),
            ),
            SortKey::Confidence => {
                SortValue::Int(
                score
                    .and_then(|s| s.confidence_grade)
                    .map(i64::from)
                    .unwrap_or(MISSING),
            )
            }
            SortKey::Period => {
                SortValue::Int(score.map(|s| s.game_segment_id as i64).unwrap_or(MISSING))
            }
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn team_name_key(teams: &TeamMap, id: i64) -> String {
    teams
        .get(&id)
        .map(|t| t.team_name.to_lowercase())
        .unwrap_or_default()
}

/// Active column and direction of the games table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub dir: SortDir,
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            key: SortKey::Date,
            dir: SortDir::Desc,
        }
    }
}

impl SortState {
    /// Clicking the active column flips it; a new column starts descending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            SortState {
                key,
                dir: self.dir.flipped(),
            }
        } else {
            SortState {
                key,
                dir: SortDir::Desc,
            }
        }
    }

    pub fn compare(&self, a: &Game, b: &Game, teams: &TeamMap) -> Ordering {
        let ord = self.key.value(a, teams).cmp(&self.key.value(b, teams));
        match self.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    }
}

/// Stable sort; ties keep their fetch order.
pub fn sort_games(games: &mut [Game], teams: &TeamMap, state: SortState) {
    games.sort_by(|a, b| state.compare(a, b, teams));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_team_map;
    use crate::scorestream::models::LastScore;
    use crate::scorestream::Team;

    fn game(id: i64, grade: Option<i32>, home: i32, away: i32, start: &str) -> Game {
        Game {
            game_id: id,
            home_team_id: id * 10,
            away_team_id: id * 10 + 1,
            start_date_time: start.into(),
            last_score: grade.map(|g| LastScore {
                home_team_score: home,
                away_team_score: away,
                confidence_grade: Some(g),
                game_segment_id: 3,
            }),
            total_posts: 0,
            total_pictures: 0,
            total_videos: 0,
            url: String::new(),
        }
    }

    fn team(id: i64, name: &str) -> Team {
        Team {
            team_id: id,
            team_name: name.into(),
            mascot: String::new(),
            image_url: String::new(),
            city: String::new(),
            state: "OH".into(),
        }
    }

    fn ids(games: &[Game]) -> Vec<i64> {
        games.iter().map(|g| g.game_id).collect()
    }

    const T: &str = "2026-01-09 19:30:00";

    #[test]
    fn test_confidence_sort_puts_unscored_lowest() {
        let mut games = vec![
            game(2, Some(60), 1, 0, T),
            game(1, None, 0, 0, T),
            game(3, Some(90), 1, 0, T),
        ];
        let teams = TeamMap::new();

        let asc = SortState { key: SortKey::Confidence, dir: SortDir::Asc };
        sort_games(&mut games, &teams, asc);
        assert_eq!(ids(&games), vec![1, 2, 3]);

        sort_games(&mut games, &teams, asc.toggle(SortKey::Confidence));
        assert_eq!(ids(&games), vec![3, 2, 1]);
    }

    #[test]
    fn test_toggle_state_machine() {
        let s = SortState::default();
        assert_eq!(s, SortState { key: SortKey::Date, dir: SortDir::Desc });
        let s = s.toggle(SortKey::Date);
        assert_eq!(s.dir, SortDir::Asc);
        let s = s.toggle(SortKey::Margin);
        assert_eq!(s, SortState { key: SortKey::Margin, dir: SortDir::Desc });
        let s = s.toggle(SortKey::Margin).toggle(SortKey::Margin);
        assert_eq!(s.dir, SortDir::Desc);
    }

    #[test]
    fn test_score_and_margin() {
        let mut games = vec![
            game(1, Some(90), 50, 48, T), // total 98, margin 2
            game(2, Some(90), 70, 40, T), // total 110, margin 30
            game(3, None, 0, 0, T),
        ];
        let teams = TeamMap::new();
        sort_games(&mut games, &teams, SortState { key: SortKey::Score, dir: SortDir::Desc });
        assert_eq!(ids(&games), vec![2, 1, 3]);
        sort_games(&mut games, &teams, SortState { key: SortKey::Margin, dir: SortDir::Asc });
        assert_eq!(ids(&games), vec![3, 1, 2]);
    }

    #[test]
    fn test_date_sort_with_unparseable_date_lowest() {
        let mut games = vec![
            game(1, None, 0, 0, "2026-01-10 12:00:00"),
            game(2, None, 0, 0, "TBD"),
            game(3, None, 0, 0, "2026-01-08 18:00:00"),
        ];
        sort_games(&mut games, &TeamMap::new(), SortState::default());
        assert_eq!(ids(&games), vec![1, 3, 2]);
    }

    #[test]
    fn test_team_name_sort_is_case_insensitive_and_unknown_first() {
        let mut games = vec![
            game(1, None, 0, 0, T),
            game(2, None, 0, 0, T),
            game(3, None, 0, 0, T),
        ];
        // home team ids are 10, 20, 30; 30 is unknown
        let teams = build_team_map(vec![team(10, "west Geauga"), team(20, "Chardon")]);
        sort_games(&mut games, &teams, SortState { key: SortKey::Home, dir: SortDir::Asc });
        assert_eq!(ids(&games), vec![3, 2, 1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut games = vec![
            game(5, Some(70), 1, 0, T),
            game(4, Some(70), 1, 0, T),
            game(6, Some(70), 1, 0, T),
        ];
        let teams = TeamMap::new();
        sort_games(&mut games, &teams, SortState { key: SortKey::Confidence, dir: SortDir::Desc });
        assert_eq!(ids(&games), vec![5, 4, 6]);
    }
}
