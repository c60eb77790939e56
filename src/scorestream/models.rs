use serde::{Deserialize, Serialize};

/// Latest score snapshot attached to a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastScore {
    #[serde(default)]
    pub home_team_score: i32,
    #[serde(default)]
    pub away_team_score: i32,
    /// Upstream trust metric; `2` means no real score yet, null means no grade
    #[serde(default)]
    pub confidence_grade: Option<i32>,
    /// Game-clock segment; `19999` marks a finished game
    #[serde(default)]
    pub game_segment_id: i32,
}

/// A game as returned by `games.search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: i64,
    #[serde(default)]
    pub home_team_id: i64,
    #[serde(default)]
    pub away_team_id: i64,
    /// "YYYY-MM-DD HH:MM:SS" in the venue's local time
    #[serde(alias = "dateTime", default)]
    pub start_date_time: String,
    #[serde(default)]
    pub last_score: Option<LastScore>,
    #[serde(default)]
    pub total_posts: i64,
    #[serde(default)]
    pub total_pictures: i64,
    #[serde(default)]
    pub total_videos: i64,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: i64,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub mascot: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Squad {
    pub squad_id: i64,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub level: String,
}

/// One submitted score record for a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScore {
    pub game_score_id: i64,
    #[serde(default)]
    pub game_id: i64,
    #[serde(default)]
    pub home_team_score: i32,
    #[serde(default)]
    pub away_team_score: i32,
    #[serde(default)]
    pub confidence_grade: i32,
    #[serde(default)]
    pub influencer_score: f64,
    /// "master" for the canonical record, anything else is an alternate
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub creator_user_id: i64,
    #[serde(default)]
    pub date_created: String,
}

/// User supplement returned alongside score submissions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUser {
    pub user_id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub game_score_trust_level_id: i64,
    #[serde(default)]
    pub user_rank_id: i64,
}

/// `{ "list": [...] }` wrapper used by every upstream collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection { list: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesCollections {
    #[serde(default)]
    pub game_collection: Collection<Game>,
    #[serde(default)]
    pub team_collection: Collection<Team>,
    #[serde(default)]
    pub squad_collection: Collection<Squad>,
}

/// `result` member of a `games.search` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamesSearchResult {
    #[serde(default)]
    pub game_ids: Vec<i64>,
    #[serde(default)]
    pub collections: GamesCollections,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresCollections {
    #[serde(default)]
    pub game_score_collection: Option<Collection<GameScore>>,
    #[serde(default)]
    pub user_collection: Option<Collection<ScoreUser>>,
}

/// `result` member of a `games.scores.search` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresSearchResult {
    #[serde(default)]
    pub game_score_ids: Vec<i64>,
    #[serde(default)]
    pub collections: Option<ScoresCollections>,
    #[serde(default)]
    pub total: u32,
}

/// JSON-RPC 2.0 response envelope. Either `result` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope<T> {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}
