use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        Html, IntoResponse,
    },
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::aggregator::calendar::{self, is_known_sport, is_known_state, squad_label};
use crate::aggregator::{Aggregator, FetchWindow, PartialPolicy, SearchCriteria};
use crate::detail::{fetch_score_detail, ScoreDetail};
use crate::gateway::{Gateway, GatewayError, GatewayQuery};
use crate::settlement::ConfidenceStats;
use crate::table::{rows::build_rows, sort_games, GameRow, SortDir, SortKey, SortState};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(gateway: Gateway, page_size: u32, policy: PartialPolicy) -> Self {
        let aggregator = Aggregator::new(Arc::new(gateway.clone()), page_size, policy);
        AppState {
            gateway,
            aggregator,
        }
    }
}

/// Build the Axum router for the gateway and dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/games", get(games_handler))
        .route("/api/search", get(search_handler))
        .route("/api/search/stream", get(search_stream_handler))
        .route("/api/scores/:game_id", get(scores_handler))
        .route("/api/options", get(options_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/games: the proxy route. Forwards the upstream envelope verbatim.
async fn games_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let query = GatewayQuery::from_params(&params)?;
    state.gateway.forward(&query).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub state: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sport: Option<String>,
    pub squad: Option<i64>,
    pub sort: Option<SortKey>,
    pub dir: Option<SortDir>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub criteria: SearchCriteria,
    pub total: u32,
    pub complete: bool,
    pub stats: ConfidenceStats,
    pub sort: SortState,
    pub rows: Vec<GameRow>,
}

impl SearchParams {
    fn criteria(&self, today: NaiveDate) -> Result<SearchCriteria, String> {
        let week = SearchCriteria::this_week(today);
        let crit = SearchCriteria {
            state: self
                .state
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or(week.state),
            from: self.from.unwrap_or(week.from),
            to: self.to.unwrap_or(week.to),
            sport: self
                .sport
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or(week.sport),
            squad_id: self.squad.unwrap_or(week.squad_id),
        };
        if !is_known_state(&crit.state) {
            return Err(format!("unknown state code: {}", crit.state));
        }
        if !is_known_sport(&crit.sport) {
            return Err(format!("unknown sport: {}", crit.sport));
        }
        if squad_label(crit.squad_id).is_none() {
            return Err(format!("unknown squad id: {}", crit.squad_id));
        }
        if crit.from > crit.to {
            return Err(format!("from {} is after to {}", crit.from, crit.to));
        }
        Ok(crit)
    }

    fn sort_state(&self) -> SortState {
        let default = SortState::default();
        SortState {
            key: self.sort.unwrap_or(default.key),
            dir: self.dir.unwrap_or(default.dir),
        }
    }
}

async fn run_search<F>(
    state: &AppState,
    criteria: SearchCriteria,
    sort: SortState,
    on_progress: F,
) -> SearchResponse
where
    F: FnMut(FetchWindow) + Send,
{
    let mut results = state.aggregator.search(&criteria, on_progress).await;

    sort_games(&mut results.games, &results.teams, sort);
    let stats = ConfidenceStats::compute(&results.games, results.total);
    let rows = build_rows(&results.games, &results.teams);

    SearchResponse {
        criteria,
        total: results.total,
        complete: results.complete,
        stats,
        sort,
        rows,
    }
}

fn validated_criteria(params: &SearchParams) -> Result<SearchCriteria, (StatusCode, String)> {
    params
        .criteria(Local::now().date_naive())
        .map_err(|e| (StatusCode::BAD_REQUEST, e))
}

/// GET /api/search?state=OH&from=2026-01-05&to=2026-01-11&sport=basketball&squad=1010&sort=date&dir=desc
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let criteria = validated_criteria(&params)?;
    let response = run_search(&state, criteria, params.sort_state(), |window| {
        debug!("{}", window)
    })
    .await;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ProgressEvent {
    first: u32,
    last: u32,
    message: String,
}

enum SearchEvent {
    Progress(FetchWindow),
    Done(Box<SearchResponse>),
}

impl SearchEvent {
    fn into_sse(self) -> Result<Event, axum::Error> {
        match self {
            SearchEvent::Progress(window) => {
                Event::default().event("progress").json_data(ProgressEvent {
                    first: window.first,
                    last: window.last,
                    message: window.to_string(),
                })
            }
            SearchEvent::Done(response) => {
                Event::default().event("done").json_data(&*response)
            }
        }
    }
}

/// GET /api/search/stream: same query as /api/search, as server-sent events.
/// One `progress` event per page request, then a single `done` event with the
/// full search response.
async fn search_stream_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, (StatusCode, String)> {
    let criteria = validated_criteria(&params)?;
    let sort = params.sort_state();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let progress = tx.clone();
        let response = run_search(&state, criteria, sort, move |window| {
            debug!("{}", window);
            let _ = progress.send(SearchEvent::Progress(window));
        })
        .await;
        let _ = tx.send(SearchEvent::Done(Box::new(response)));
    });

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event.into_sse(), rx))
    });
    Ok(Sse::new(events))
}

/// GET /api/scores/:game_id
async fn scores_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
) -> Json<ScoreDetail> {
    Json(fetch_score_detail(state.aggregator.gateway().as_ref(), game_id).await)
}

#[derive(Debug, Serialize)]
struct Choice {
    value: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct SearchOptions {
    states: Vec<Choice>,
    sports: Vec<Choice>,
    squads: Vec<Choice>,
    defaults: SearchCriteria,
}

/// GET /api/options: form vocabulary plus this week's default search.
async fn options_handler() -> Json<SearchOptions> {
    let states = calendar::US_STATES
        .iter()
        .map(|(code, name)| Choice {
            value: code.to_string(),
            label: format!("{} — {}", code, name),
        })
        .collect();
    let sports = calendar::SPORTS
        .iter()
        .map(|s| {
            let mut label = s.to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            Choice {
                value: s.to_string(),
                label,
            }
        })
        .collect();
    let squads = calendar::SQUADS
        .iter()
        .map(|(id, label)| Choice {
            value: id.to_string(),
            label: label.to_string(),
        })
        .collect();

    Json(SearchOptions {
        states,
        sports,
        squads,
        defaults: SearchCriteria::this_week(Local::now().date_naive()),
    })
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>ScoreStream Settlement Layer</title>
<style>
  :root { --bg:#09090b; --card:#18181b; --border:#27272a; --text:#f4f4f5; --muted:#71717a; --accent:#10b981; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: system-ui, sans-serif; }
  header { padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.2rem; }
  header p { color: var(--muted); font-size: .75rem; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  form { display: flex; flex-wrap: wrap; gap: .75rem; align-items: flex-end; }
  label { display: flex; flex-direction: column; gap: .25rem; font-size: .7rem; color: var(--muted); text-transform: uppercase; }
  select, input, button { background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 4px; padding: .45rem .7rem; }
  button { background: #059669; border: none; font-weight: 600; cursor: pointer; }
  button:disabled { background: #3f3f46; }
  .stats { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 1rem; }
  .card { background: var(--card); border: 1px solid var(--border); border-radius: 8px; padding: 1rem; }
  .card .label { color: var(--muted); font-size: .7rem; text-transform: uppercase; }
  .card .value { font-size: 1.6rem; font-weight: 700; font-family: monospace; }
  .card .sub { color: var(--muted); font-size: .75rem; }
  .bars { display: flex; gap: 4px; align-items: flex-end; height: 48px; }
  .bars div { flex: 1; border-radius: 2px; }
  .bar-labels { display: flex; gap: 4px; font-size: .6rem; color: var(--muted); }
  .bar-labels span { flex: 1; text-align: center; }
  table { width: 100%; border-collapse: collapse; font-size: .85rem; }
  th { text-align: left; padding: .5rem .7rem; color: var(--muted); font-size: .7rem; text-transform: uppercase; border-bottom: 1px solid var(--border); }
  th.sortable { cursor: pointer; user-select: none; }
  td { padding: .5rem .7rem; border-bottom: 1px solid #1f1f23; }
  tbody tr { cursor: pointer; }
  tbody tr:hover { background: #1f1f23; }
  .mascot { color: var(--muted); font-size: .75rem; margin-left: .25rem; }
  .pill { display: inline-block; padding: .1rem .5rem; border-radius: 999px; font-size: .7rem; font-weight: 600; }
  .conf { position: relative; width: 120px; height: 18px; background: #27272a; border-radius: 3px; overflow: hidden; }
  .conf div { height: 100%; }
  .conf span { position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; font-size: .7rem; font-weight: 700; font-family: monospace; }
  .muted { color: var(--muted); }
  .status { text-align: center; color: var(--muted); font-family: monospace; font-size: .85rem; }
  #modal { position: fixed; inset: 0; background: rgba(0,0,0,.7); display: none; align-items: center; justify-content: center; }
  #modal .box { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.5rem; max-width: 720px; width: 100%; max-height: 80vh; overflow-y: auto; }
  a { color: var(--accent); text-decoration: none; }
</style>
</head>
<body>
<header>
  <h1>ScoreStream Settlement Layer</h1>
  <p>Amateur Sports Score Verification Dashboard</p>
</header>
<main>
  <form id="search">
    <label>State <select id="f-state"></select></label>
    <label>From <input type="date" id="f-from"></label>
    <label>To <input type="date" id="f-to"></label>
    <label>Sport <select id="f-sport"></select></label>
    <label>Squad <select id="f-squad"></select></label>
    <button type="submit" id="f-submit">Search</button>
  </form>
  <div class="status" id="status"></div>
  <div class="stats" id="stats"></div>
  <div class="card" style="padding:0;overflow-x:auto">
    <table>
      <thead><tr id="head"></tr></thead>
      <tbody id="rows"></tbody>
    </table>
  </div>
</main>
<div id="modal" onclick="closeModal()"><div class="box" onclick="event.stopPropagation()" id="modal-box"></div></div>

<script>
const COLUMNS = [
  ['date','Date'], ['home','Home'], ['away','Away'], ['score','Score'],
  ['period','Period'], ['margin','Margin'], ['confidence','Confidence'],
  [null,'Status'], [null,'Link'],
];
let rows = [];
let sort = { key: 'date', dir: 'desc' };
let searchSeq = 0;
let source = null;

const esc = s => String(s ?? '').replace(/[&<>"]/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;'}[c]));
const opt = (sel, items, value) => {
  document.getElementById(sel).innerHTML = items.map(i =>
    `<option value="${esc(i.value)}" ${String(i.value) === String(value) ? 'selected' : ''}>${esc(i.label)}</option>`).join('');
};

async function init() {
  const r = await fetch('/api/options');
  const o = await r.json();
  opt('f-state', o.states, o.defaults.state);
  opt('f-sport', o.sports, o.defaults.sport);
  opt('f-squad', o.squads, o.defaults.squad_id);
  document.getElementById('f-from').value = o.defaults.from;
  document.getElementById('f-to').value = o.defaults.to;
  document.getElementById('search').addEventListener('submit', e => { e.preventDefault(); search(); });
  search();
}

function search() {
  const seq = ++searchSeq;
  if (source) source.close();
  const params = new URLSearchParams({
    state: document.getElementById('f-state').value,
    from: document.getElementById('f-from').value,
    to: document.getElementById('f-to').value,
    sport: document.getElementById('f-sport').value,
    squad: document.getElementById('f-squad').value,
    sort: sort.key,
    dir: sort.dir,
  });
  document.getElementById('f-submit').disabled = true;
  document.getElementById('f-submit').textContent = 'Loading…';
  document.getElementById('status').textContent = 'Fetching games…';
  document.getElementById('stats').innerHTML = '';
  document.getElementById('rows').innerHTML = '';
  const finish = () => {
    document.getElementById('f-submit').disabled = false;
    document.getElementById('f-submit').textContent = 'Search';
  };
  const es = new EventSource('/api/search/stream?' + params);
  source = es;
  es.addEventListener('progress', e => {
    if (seq === searchSeq) document.getElementById('status').textContent = JSON.parse(e.data).message;
  });
  es.addEventListener('done', e => {
    es.close();
    if (seq !== searchSeq) return;
    const data = JSON.parse(e.data);
    rows = data.rows;
    sort = data.sort;
    document.getElementById('status').textContent = data.complete ? '' : 'Search did not complete; retry to refresh.';
    renderStats(data.stats);
    renderTable();
    finish();
  });
  es.onerror = () => {
    es.close();
    if (seq !== searchSeq) return;
    console.error('Search failed');
    document.getElementById('status').textContent = 'Search failed; check the filters and retry.';
    finish();
  };
}

function renderStats(s) {
  const max = Math.max(1, ...s.distribution.map(t => t.count));
  document.getElementById('stats').innerHTML = `
    <div class="card"><div class="label">Total Games</div><div class="value">${s.total}</div></div>
    <div class="card"><div class="label">Scored</div><div class="value">${s.scored}</div><div class="sub">${s.upcoming} upcoming</div></div>
    <div class="card"><div class="label">Settlement Ready</div><div class="value">${s.readiness_pct}%</div><div class="sub">${s.verified} of ${s.scored} scored</div></div>
    <div class="card" style="grid-column: span 2"><div class="label">Confidence Distribution</div>
      <div class="bars">${s.distribution.map(t =>
        `<div style="height:${t.count / max * 48}px;min-height:${t.count > 0 ? 4 : 0}px;background:${t.color}" title="${t.count}"></div>`).join('')}</div>
      <div class="bar-labels">${s.distribution.map(t => `<span>${esc(t.tier)} (${t.count})</span>`).join('')}</div>
    </div>`;
}

function toggleSort(key) {
  sort = sort.key === key ? { key, dir: sort.dir === 'asc' ? 'desc' : 'asc' } : { key, dir: 'desc' };
  const d = sort.dir === 'asc' ? 1 : -1;
  rows.sort((a, b) => {
    const x = a.sort_keys[key], y = b.sort_keys[key];
    return d * (x < y ? -1 : x > y ? 1 : 0);
  });
  renderTable();
}

function renderTable() {
  document.getElementById('head').innerHTML = COLUMNS.map(([k, label]) => k
    ? `<th class="sortable" onclick="toggleSort('${k}')">${label} ${sort.key === k ? (sort.dir === 'asc' ? '↑' : '↓') : ''}</th>`
    : `<th>${label}</th>`).join('');
  const tbody = document.getElementById('rows');
  if (!rows.length) { tbody.innerHTML = '<tr><td colspan="9" class="status" style="padding:2rem">No games found</td></tr>'; return; }
  tbody.innerHTML = rows.map(r => `<tr onclick="openDetail(${r.game_id})">
    <td class="muted">${esc(r.date)}</td>
    <td>${esc(r.home)}${r.home_mascot ? `<span class="mascot">${esc(r.home_mascot)}</span>` : ''}</td>
    <td>${esc(r.away)}${r.away_mascot ? `<span class="mascot">${esc(r.away_mascot)}</span>` : ''}</td>
    <td style="font-family:monospace">${r.score === 'Upcoming' ? '<span class="muted">Upcoming</span>' : esc(r.score)}</td>
    <td>${esc(r.status)}</td>
    <td class="muted">${r.margin ?? '—'}</td>
    <td><div class="conf"><div style="width:${r.bar_width}%;background:${r.tier_color}"></div><span>${r.grade != null && r.grade !== 2 ? r.grade : '—'}</span></div></td>
    <td><span class="pill" style="background:${r.tier_color}20;color:${r.tier_color};border:1px solid ${r.tier_color}40">${esc(r.tier)}</span></td>
    <td>${r.url ? `<a href="${esc(r.url)}" target="_blank" rel="noopener noreferrer" onclick="event.stopPropagation()">View</a>` : ''}</td>
  </tr>`).join('');
}

async function openDetail(gameId) {
  const box = document.getElementById('modal-box');
  document.getElementById('modal').style.display = 'flex';
  box.innerHTML = `<h2>Score Submissions — Game #${gameId}</h2><p class="status" style="padding:2rem">Loading score details…</p>`;
  const r = await fetch('/api/scores/' + gameId);
  const d = await r.json();
  if (d.game_id !== gameId || document.getElementById('modal').style.display === 'none') return;
  if (!d.submissions.length) {
    box.innerHTML = `<h2>Score Submissions — Game #${gameId}</h2><p class="status" style="padding:2rem">No score submissions found</p>`;
    return;
  }
  box.innerHTML = `<h2>Score Submissions — Game #${gameId}</h2><table>
    <thead><tr><th>Score</th><th>Confidence</th><th>Influence</th><th>Branch</th><th>Submitter</th></tr></thead>
    <tbody>${d.submissions.map(s => `<tr>
      <td style="font-family:monospace">${esc(s.score)}</td>
      <td style="font-family:monospace;font-weight:700;color:${s.grade_color}">${s.grade}</td>
      <td class="muted">${s.influencer_score}</td>
      <td style="color:${s.is_master ? 'var(--accent)' : 'var(--muted)'}">${esc(s.branch)}</td>
      <td class="muted">${esc(s.submitter)}</td>
    </tr>`).join('')}</tbody></table>`;
}

function closeModal() { document.getElementById('modal').style.display = 'none'; }

init();
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::page;
    use crate::gateway::tests::RecordingTransport;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn app(api_key: Option<&str>, reply: Value) -> (Router, Arc<RecordingTransport>) {
        let transport = RecordingTransport::new(reply);
        let gateway = Gateway::new(api_key.map(str::to_string), 1000, transport.clone());
        (
            router(AppState::new(gateway, 30, PartialPolicy::Discard)),
            transport,
        )
    }

    #[tokio::test]
    async fn test_games_route_without_key() {
        let (app, transport) = app(None, json!({}));
        let (status, body) = get_json(app, "/api/games?state=OH").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "API key not configured" }));
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_games_route_forwards_verbatim() {
        let reply = json!({ "jsonrpc": "2.0", "result": { "total": 0 }, "id": 1 });
        let (app, transport) = app(Some("k"), reply.clone());
        let (status, body) = get_json(app, "/api/games?gameIds=%5B1%2C2%5D").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, reply);
        assert_eq!(transport.calls.lock().unwrap()[0].method, "games.scores.search");
    }

    #[tokio::test]
    async fn test_games_route_rejects_bad_json_param() {
        let (app, transport) = app(Some("k"), json!({}));
        let (status, body) = get_json(app, "/api/games?sportNames=basketball").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid sportNames"));
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_route_aggregates_and_sorts() {
        let (app, transport) = app(Some("k"), page(3, 1..4, vec![]));
        let (status, body) = get_json(
            app,
            "/api/search?state=OH&from=2026-01-05&to=2026-01-11&sport=basketball&squad=1010&sort=home&dir=asc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["complete"], true);
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);
        assert_eq!(body["sort"], json!({ "key": "home", "dir": "asc" }));
        assert_eq!(body["stats"]["upcoming"], 3);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params["afterDateTime"], "2026-01-05 00:00:00");
        assert_eq!(calls[0].params["beforeDateTime"], "2026-01-11 23:59:59");
    }

    #[tokio::test]
    async fn test_search_route_rejects_unknown_sport() {
        let (app, _) = app(Some("k"), json!({}));
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/search?sport=quidditch")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_stream_reports_each_window() {
        let (app, transport) = app(Some("k"), page(65, 0..30, vec![]));
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/search/stream?state=OH&from=2026-01-05&to=2026-01-11")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        let events: Vec<(String, Value)> = text
            .split("\n\n")
            .filter_map(|block| {
                let mut name = None;
                let mut data = None;
                for line in block.lines() {
                    if let Some(v) = line.strip_prefix("event:") {
                        name = Some(v.trim().to_string());
                    } else if let Some(v) = line.strip_prefix("data:") {
                        data = serde_json::from_str(v.trim()).ok();
                    }
                }
                Some((name?, data?))
            })
            .collect();

        let windows: Vec<u32> = events
            .iter()
            .filter(|(name, _)| name == "progress")
            .map(|(_, data)| data["first"].as_u64().unwrap() as u32 - 1)
            .collect();
        assert_eq!(windows, vec![0, 30, 60]);
        assert_eq!(events[1].1["message"], "Fetching games 31–60…");

        let (name, done) = events.last().unwrap();
        assert_eq!(name, "done");
        assert_eq!(done["total"], 65);
        assert_eq!(done["complete"], true);
        assert_eq!(transport.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_stream_rejects_bad_range() {
        let (app, transport) = app(Some("k"), json!({}));
        let (status, _) = get_json(app, "/api/search/stream?from=2026-01-10&to=2026-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scores_route_without_key_is_empty() {
        let (app, _) = app(None, json!({}));
        let (status, body) = get_json(app, "/api/scores/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game_id"], 42);
        assert_eq!(body["submissions"], json!([]));
    }

    #[tokio::test]
    async fn test_options_route() {
        let (app, _) = app(None, json!({}));
        let (status, body) = get_json(app, "/api/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["states"].as_array().unwrap().len(), 51);
        assert_eq!(body["sports"][0]["label"], "Basketball");
        assert_eq!(body["squads"][2]["value"], "1040");
        assert_eq!(body["defaults"]["state"], "OH");
    }
}
