//! Per-game score submission view.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, info};

use crate::gateway::{GamesGateway, GatewayQuery};
use crate::scorestream::models::{RpcEnvelope, ScoresSearchResult};
use crate::scorestream::{GameScore, ScoreUser};
use crate::settlement::SettlementTier;

pub const DETAIL_PAGE_SIZE: u32 = 50;
pub const MASTER_BRANCH: &str = "master";

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRow {
    pub game_score_id: i64,
    /// "H - A"
    pub score: String,
    pub grade: i32,
    pub grade_color: &'static str,
    pub influencer_score: f64,
    pub branch: String,
    pub is_master: bool,
    pub submitter: String,
    pub created: String,
}

impl SubmissionRow {
    pub fn new(score: &GameScore, users: &HashMap<i64, ScoreUser>) -> Self {
        SubmissionRow {
            game_score_id: score.game_score_id,
            score: format!("{} - {}", score.home_team_score, score.away_team_score),
            grade: score.confidence_grade,
            grade_color: SettlementTier::from_range(score.confidence_grade).color(),
            influencer_score: score.influencer_score,
            branch: score.branch_name.clone(),
            is_master: score.branch_name == MASTER_BRANCH,
            submitter: submitter_label(score.creator_user_id, users.get(&score.creator_user_id)),
            created: score.date_created.clone(),
        }
    }
}

pub fn submitter_label(user_id: i64, user: Option<&ScoreUser>) -> String {
    match user {
        Some(u) => format!(
            "{} {} (Trust: {}, Rank: {})",
            u.first_name, u.last_name, u.game_score_trust_level_id, u.user_rank_id
        ),
        None => format!("User #{}", user_id),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreDetail {
    pub game_id: i64,
    pub submissions: Vec<SubmissionRow>,
}

/// Build the detail view from a raw `games.scores.search` envelope. Missing
/// collections yield an empty view.
pub fn parse_score_detail(game_id: i64, raw: serde_json::Value) -> Result<ScoreDetail> {
    let envelope: RpcEnvelope<ScoresSearchResult> =
        serde_json::from_value(raw).context("Malformed games.scores.search response")?;

    let collections = envelope.result.and_then(|r| r.collections).unwrap_or_default();
    let scores = collections
        .game_score_collection
        .map(|c| c.list)
        .unwrap_or_default();
    let users: HashMap<i64, ScoreUser> = collections
        .user_collection
        .map(|c| c.list)
        .unwrap_or_default()
        .into_iter()
        .map(|u| (u.user_id, u))
        .collect();

    Ok(ScoreDetail {
        game_id,
        submissions: scores
            .iter()
            .map(|s| SubmissionRow::new(s, &users))
            .collect(),
    })
}

/// Fetch the first page of submissions for a game. Failures are logged and
/// produce an empty list.
pub async fn fetch_score_detail(gateway: &dyn GamesGateway, game_id: i64) -> ScoreDetail {
    let query = GatewayQuery::scores(vec![game_id], DETAIL_PAGE_SIZE, 0);
    let result = async {
        let raw = gateway.query(&query).await?;
        parse_score_detail(game_id, raw)
    }
    .await;

    match result {
        Ok(detail) => {
            info!(
                "Game {}: {} score submissions",
                game_id,
                detail.submissions.len()
            );
            detail
        }
        Err(e) => {
            error!("Failed to fetch score details for game {}: {:#}", game_id, e);
            ScoreDetail {
                game_id,
                submissions: Vec::new(),
            }
        }
    }
}
