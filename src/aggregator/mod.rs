//! Paginated game search through the gateway.
//!
//! Pages are requested strictly one after another. The offset grows by the
//! page size until it reaches the total the upstream reports on the latest
//! page. A page without a `result` member ends the search early and is not
//! an error. Games and teams are appended as they arrive. Teams are folded
//! into a lookup map once the loop finishes.

pub mod calendar;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::gateway::{GamesGateway, GatewayQuery, DEFAULT_SPORT, DEFAULT_SQUAD_ID, DEFAULT_STATE};
use crate::scorestream::models::{GamesSearchResult, RpcEnvelope};
use crate::scorestream::{Game, Team};

pub const PAGE_SIZE: u32 = 30;

pub type TeamMap = HashMap<i64, Team>;

/// What the user searched for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub state: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub sport: String,
    pub squad_id: i64,
}

impl SearchCriteria {
    /// Default search: Ohio boys varsity basketball for the week of `today`.
    pub fn this_week(today: NaiveDate) -> Self {
        let (from, to) = calendar::current_week_range(today);
        SearchCriteria {
            state: DEFAULT_STATE.to_string(),
            from,
            to,
            sport: DEFAULT_SPORT.to_string(),
            squad_id: DEFAULT_SQUAD_ID,
        }
    }

    pub fn page_query(&self, count: u32, offset: u32) -> GatewayQuery {
        GatewayQuery {
            game_ids: None,
            state: Some(self.state.clone()),
            after_date_time: Some(calendar::to_api_datetime(self.from, false)),
            before_date_time: Some(calendar::to_api_datetime(self.to, true)),
            sport_names: Some(vec![self.sport.clone()]),
            squad_ids: Some(vec![self.squad_id]),
            count: Some(count),
            offset: Some(offset),
        }
    }
}

/// The 1-based range of games the next request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchWindow {
    pub first: u32,
    pub last: u32,
}

impl FetchWindow {
    pub fn new(offset: u32, count: u32) -> Self {
        FetchWindow {
            first: offset + 1,
            last: offset + count,
        }
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fetching games {}–{}…", self.first, self.last)
    }
}

/// What to hand back when a page fails mid-search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PartialPolicy {
    /// Return the empty pre-search state.
    #[default]
    Discard,
    /// Return whatever was accumulated before the failure, marked incomplete.
    Keep,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub games: Vec<Game>,
    pub teams: TeamMap,
    /// Upstream-reported total for the search
    pub total: u32,
    /// False when a page failed and the search was cut short
    pub complete: bool,
}

#[derive(Debug, Error)]
#[error("search aborted at offset {offset}: {reason:#}")]
pub struct SearchAborted {
    pub offset: u32,
    pub reason: anyhow::Error,
    /// Everything accumulated before the failing page
    pub partial: SearchResults,
}

/// Fold team records into a map keyed by team id. Later records win.
pub fn build_team_map(teams: impl IntoIterator<Item = Team>) -> TeamMap {
    let mut map = TeamMap::new();
    for t in teams {
        map.insert(t.team_id, t);
    }
    map
}

async fn fetch_page(
    gateway: &dyn GamesGateway,
    criteria: &SearchCriteria,
    count: u32,
    offset: u32,
) -> Result<Option<GamesSearchResult>> {
    let raw = gateway.query(&criteria.page_query(count, offset)).await?;
    let envelope: RpcEnvelope<GamesSearchResult> =
        serde_json::from_value(raw).context("Malformed games.search response")?;
    Ok(envelope.result)
}

/// Run the pagination loop to completion, reporting each fetch window
/// before its request goes out.
pub async fn collect_pages<F>(
    gateway: &dyn GamesGateway,
    criteria: &SearchCriteria,
    page_size: u32,
    mut on_progress: F,
) -> Result<SearchResults, SearchAborted>
where
    F: FnMut(FetchWindow) + Send,
{
    let mut games: Vec<Game> = Vec::new();
    let mut teams: Vec<Team> = Vec::new();
    let mut offset = 0u32;
    let mut total = 0u32;

    loop {
        on_progress(FetchWindow::new(offset, page_size));

        let page = match fetch_page(gateway, criteria, page_size, offset).await {
            Ok(p) => p,
            Err(reason) => {
                return Err(SearchAborted {
                    offset,
                    reason,
                    partial: SearchResults {
                        games,
                        teams: build_team_map(teams),
                        total,
                        complete: false,
                    },
                });
            }
        };

        let Some(result) = page else {
            debug!("No result at offset {}, treating as end of data", offset);
            break;
        };

        total = result.total;
        games.extend(result.collections.game_collection.list);
        teams.extend(result.collections.team_collection.list);
        offset = offset.saturating_add(page_size);

        if offset >= total {
            break;
        }
    }

    Ok(SearchResults {
        games,
        teams: build_team_map(teams),
        total,
        complete: true,
    })
}

/// Search driver bound to a gateway, page size and failure policy.
#[derive(Clone)]
pub struct Aggregator {
    gateway: Arc<dyn GamesGateway>,
    page_size: u32,
    policy: PartialPolicy,
}

impl Aggregator {
    pub fn new(gateway: Arc<dyn GamesGateway>, page_size: u32, policy: PartialPolicy) -> Self {
        Aggregator {
            gateway,
            page_size: page_size.max(1),
            policy,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn GamesGateway> {
        &self.gateway
    }

    /// Never fails: a broken page is logged and resolved through the
    /// configured [`PartialPolicy`].
    pub async fn search<F>(&self, criteria: &SearchCriteria, on_progress: F) -> SearchResults
    where
        F: FnMut(FetchWindow) + Send,
    {
        info!(
            "Searching {} {} squad={} {}..{} via {} gateway",
            criteria.state,
            criteria.sport,
            criteria.squad_id,
            criteria.from,
            criteria.to,
            self.gateway.name()
        );

        match collect_pages(self.gateway.as_ref(), criteria, self.page_size, on_progress).await {
            Ok(results) => {
                info!(
                    "Search complete: {} games, {} teams (upstream total {})",
                    results.games.len(),
                    results.teams.len(),
                    results.total
                );
                results
            }
            Err(aborted) => {
                error!("Search failed: {}", aborted);
                match self.policy {
                    PartialPolicy::Discard => SearchResults::default(),
                    PartialPolicy::Keep => {
                        warn!(
                            "Keeping {} games fetched before the failure",
                            aborted.partial.games.len()
                        );
                        aborted.partial
                    }
                }
            }
        }
    }
}
