//! Plain-text rendering for the CLI commands.

use std::fmt::Write;

use crate::detail::ScoreDetail;
use crate::settlement::ConfidenceStats;
use crate::table::{GameRow, SortState};

pub fn render_stats(stats: &ConfidenceStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total games: {}   Scored: {} ({} upcoming)   Settlement ready: {}% ({} of {} scored)",
        stats.total,
        stats.scored,
        stats.upcoming,
        stats.readiness_pct,
        stats.verified,
        stats.scored
    );
    let dist: Vec<String> = stats
        .distribution
        .iter()
        .map(|t| format!("{}: {}", t.tier, t.count))
        .collect();
    let _ = writeln!(out, "Confidence distribution: {}", dist.join("  "));
    out
}

fn with_mascot(name: &str, mascot: Option<&str>) -> String {
    match mascot {
        Some(m) => format!("{} {}", name, m),
        None => name.to_string(),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}

pub fn render_games(rows: &[GameRow], sort: SortState) -> String {
    if rows.is_empty() {
        return "No games found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Sorted by {} {}", sort.key, sort.dir.arrow());
    let _ = writeln!(
        out,
        "{:<8} {:<10} {:<28} {:<28} {:<9} {:<12} {:>6} {:>5}  {:<12} {}",
        "ID", "DATE", "HOME", "AWAY", "SCORE", "PERIOD", "MARGIN", "CONF", "STATUS", "LINK"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:<28} {:<28} {:<9} {:<12} {:>6} {:>5}  {:<12} {}",
            r.game_id,
            r.date,
            truncate(&with_mascot(&r.home, r.home_mascot.as_deref()), 28),
            truncate(&with_mascot(&r.away, r.away_mascot.as_deref()), 28),
            r.score,
            r.status.label(),
            r.margin_label(),
            r.grade_label(),
            r.tier.label(),
            r.url.as_deref().unwrap_or("")
        );
    }
    out
}

pub fn render_detail(detail: &ScoreDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Score Submissions — Game #{}", detail.game_id);
    if detail.submissions.is_empty() {
        let _ = writeln!(out, "No score submissions found");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<9} {:>5} {:>9}  {:<10} {}",
        "SCORE", "CONF", "INFLUENCE", "BRANCH", "SUBMITTER"
    );
    for s in &detail.submissions {
        let branch = if s.is_master {
            format!("{}*", s.branch)
        } else {
            s.branch.clone()
        };
        let _ = writeln!(
            out,
            "{:<9} {:>5} {:>9}  {:<10} {}",
            s.score, s.grade, s.influencer_score, branch, s.submitter
        );
    }
    out
}
