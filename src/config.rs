use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::aggregator::calendar::{is_known_sport, is_known_state, squad_label};
use crate::aggregator::{PartialPolicy, SearchCriteria, PAGE_SIZE};
use crate::scorestream::{DEFAULT_API_URL, DEFAULT_ORGANIZATION_ID};
use crate::table::{SortDir, SortKey, SortState};

/// ScoreStream settlement layer: score verification gateway and dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "settlement-layer", version, about)]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// ScoreStream API key (kept server-side, never sent to clients)
    #[arg(long, env = "SCORESTREAM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// ScoreStream JSON-RPC endpoint
    #[arg(long, env = "SCORESTREAM_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Organization the games search is scoped to
    #[arg(long, env = "ORGANIZATION_ID", default_value_t = DEFAULT_ORGANIZATION_ID)]
    pub organization_id: i64,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Games requested per page while paginating a search
    #[arg(long, env = "PAGE_SIZE", default_value_t = PAGE_SIZE)]
    pub page_size: u32,

    /// What a search returns when a page fails part-way through
    #[arg(long, env = "PARTIAL_RESULTS", value_enum, default_value_t = PartialPolicy::Discard)]
    pub partial_results: PartialPolicy,

    /// Upstream request timeout in seconds (unset = wait indefinitely)
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the gateway and dashboard HTTP server (default)
    Serve,
    /// Run a paginated search and print the games table
    Search(SearchArgs),
    /// Print the score submissions for one game
    Scores(ScoresArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Two-letter state code
    #[arg(long, default_value = "OH")]
    pub state: String,

    /// First day of the range (YYYY-MM-DD); defaults to this week's Monday
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD); defaults to this week's Sunday
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long, default_value = "basketball")]
    pub sport: String,

    /// 1010 Boys Varsity, 1020 Boys JV, 1040 Girls Varsity
    #[arg(long, default_value_t = 1010)]
    pub squad: i64,

    /// Column to sort the table by
    #[arg(long, value_enum, default_value_t = SortKey::Date)]
    pub sort: SortKey,

    /// Sort ascending instead of descending
    #[arg(long, default_value = "false")]
    pub asc: bool,

    /// Query a running gateway instead of calling ScoreStream directly
    #[arg(long, env = "GATEWAY_URL")]
    pub gateway_url: Option<String>,
}

impl SearchArgs {
    pub fn criteria(&self, today: NaiveDate) -> SearchCriteria {
        let week = SearchCriteria::this_week(today);
        SearchCriteria {
            state: self.state.to_uppercase(),
            from: self.from.unwrap_or(week.from),
            to: self.to.unwrap_or(week.to),
            sport: self.sport.to_lowercase(),
            squad_id: self.squad,
        }
    }

    pub fn sort_state(&self) -> SortState {
        let state = SortState {
            key: self.sort,
            dir: SortDir::Desc,
        };
        if self.asc {
            state.toggle(self.sort)
        } else {
            state
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScoresArgs {
    #[arg(long)]
    pub game_id: i64,

    /// Query a running gateway instead of calling ScoreStream directly
    #[arg(long, env = "GATEWAY_URL")]
    pub gateway_url: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be positive");
        }
        if self.upstream_timeout_secs == Some(0) {
            anyhow::bail!("upstream_timeout_secs must be positive when set");
        }
        if let Some(Command::Search(args)) = &self.command {
            validate_search(args)?;
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

fn validate_search(args: &SearchArgs) -> anyhow::Result<()> {
    if !is_known_state(&args.state.to_uppercase()) {
        anyhow::bail!("unknown state code: {}", args.state);
    }
    if !is_known_sport(&args.sport.to_lowercase()) {
        anyhow::bail!("unknown sport: {}", args.sport);
    }
    if squad_label(args.squad).is_none() {
        anyhow::bail!("unknown squad id: {} (expected 1010, 1020 or 1040)", args.squad);
    }
    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            anyhow::bail!("--from {} is after --to {}", from, to);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut full = vec!["settlement-layer"];
        full.extend_from_slice(args);
        Config::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let c = parse(&[]);
        assert!(c.command.is_none());
        assert_eq!(c.organization_id, 1000);
        assert_eq!(c.page_size, 30);
        assert_eq!(c.partial_results, PartialPolicy::Discard);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_search_args_build_criteria() {
        let c = parse(&[
            "search",
            "--state",
            "tx",
            "--from",
            "2026-01-05",
            "--sport",
            "Soccer",
            "--squad",
            "1040",
        ]);
        let Some(Command::Search(args)) = &c.command else {
            panic!("expected search command");
        };
        assert!(c.validate().is_ok());
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let crit = args.criteria(today);
        assert_eq!(crit.state, "TX");
        assert_eq!(crit.sport, "soccer");
        assert_eq!(crit.squad_id, 1040);
        assert_eq!(crit.from, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(crit.to, NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());
        assert_eq!(args.sort_state(), SortState::default());
    }

    #[test]
    fn test_rejects_unknown_squad_and_reversed_range() {
        let c = parse(&["search", "--squad", "9"]);
        assert!(c.validate().is_err());
        let c = parse(&["search", "--from", "2026-01-10", "--to", "2026-01-01"]);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let c = parse(&["--page-size", "0"]);
        assert!(c.validate().is_err());
    }
}
