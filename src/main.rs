use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod aggregator;
mod config;
mod dashboard;
mod detail;
mod gateway;
mod report;
mod scorestream;
mod settlement;
mod table;

use aggregator::Aggregator;
use config::{Command, Config, ScoresArgs, SearchArgs};
use dashboard::AppState;
use gateway::{GamesGateway, Gateway, GatewayClient};
use scorestream::HttpTransport;
use settlement::ConfidenceStats;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    match config.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Search(args) => search(&config, &args).await,
        Command::Scores(args) => scores(&config, &args).await,
    }
}

fn build_gateway(config: &Config) -> Result<Gateway> {
    let transport = HttpTransport::new(&config.api_url, config.upstream_timeout())?;
    Ok(Gateway::new(
        config.api_key.clone(),
        config.organization_id,
        Arc::new(transport),
    ))
}

/// Remote gateway when a URL is given, otherwise call ScoreStream in-process.
fn select_gateway(config: &Config, gateway_url: Option<&str>) -> Result<Arc<dyn GamesGateway>> {
    match gateway_url {
        Some(url) => {
            let client = GatewayClient::new(url)?;
            info!("Using gateway at {}", client.endpoint());
            Ok(Arc::new(client))
        }
        None => {
            if config.api_key.is_none() {
                warn!("SCORESTREAM_API_KEY is not set and no --gateway-url given; searches will come back empty");
            }
            Ok(Arc::new(build_gateway(config)?))
        }
    }
}

async fn serve(config: &Config) -> Result<()> {
    if config.api_key.is_none() {
        warn!("SCORESTREAM_API_KEY is not set; /api/games will answer with a configuration error");
    }

    let gateway = build_gateway(config)?;
    let state = AppState::new(gateway, config.page_size, config.partial_results);
    let app = dashboard::router(state);

    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

async fn search(config: &Config, args: &SearchArgs) -> Result<()> {
    let gateway = select_gateway(config, args.gateway_url.as_deref())?;
    let aggregator = Aggregator::new(gateway, config.page_size, config.partial_results);

    let criteria = args.criteria(Local::now().date_naive());
    let mut results = aggregator
        .search(&criteria, |window| eprintln!("{}", window))
        .await;

    let sort = args.sort_state();
    table::sort_games(&mut results.games, &results.teams, sort);
    let stats = ConfidenceStats::compute(&results.games, results.total);
    let rows = table::rows::build_rows(&results.games, &results.teams);

    print!("{}", report::render_stats(&stats));
    println!();
    print!("{}", report::render_games(&rows, sort));
    if !results.complete {
        warn!("Search did not complete; results may be empty or partial");
    }
    Ok(())
}

async fn scores(config: &Config, args: &ScoresArgs) -> Result<()> {
    let gateway = select_gateway(config, args.gateway_url.as_deref())?;
    let detail = detail::fetch_score_detail(gateway.as_ref(), args.game_id).await;
    print!("{}", report::render_detail(&detail));
    Ok(())
}
