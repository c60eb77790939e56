use serde::Serialize;

use super::{has_real_score, SettlementTier, NO_SCORE_GRADE, VERIFIED_MIN_GRADE};
use crate::scorestream::Game;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    pub tier: SettlementTier,
    pub count: usize,
    pub color: &'static str,
}

/// Aggregate settlement readiness over one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceStats {
    /// Upstream-reported total, not the number of games held
    pub total: u32,
    pub scored: usize,
    pub upcoming: usize,
    pub verified: usize,
    /// Verified share of scored games, rounded to a whole percent
    pub readiness_pct: u32,
    pub distribution: Vec<TierCount>,
}

impl ConfidenceStats {
    pub fn compute(games: &[Game], total: u32) -> Self {
        let grades: Vec<Option<i32>> = games
            .iter()
            .map(|g| g.last_score.as_ref().and_then(|s| s.confidence_grade))
            .collect();

        let scored = grades.iter().filter(|g| has_real_score(**g)).count();
        // Grades 0 and 1 are neither scored nor upcoming.
        let upcoming = grades
            .iter()
            .filter(|g| matches!(g, None | Some(NO_SCORE_GRADE)))
            .count();
        let verified = grades
            .iter()
            .filter(|g| g.is_some_and(|v| v >= VERIFIED_MIN_GRADE))
            .count();

        let readiness_pct = if scored > 0 {
            ((verified as f64 / scored as f64) * 100.0).round() as u32
        } else {
            0
        };

        let distribution = SettlementTier::ALL
            .iter()
            .map(|&tier| TierCount {
                tier,
                count: grades
                    .iter()
                    .filter(|g| SettlementTier::from_grade(**g) == tier)
                    .count(),
                color: tier.color(),
            })
            .collect();

        ConfidenceStats {
            total,
            scored,
            upcoming,
            verified,
            readiness_pct,
            distribution,
        }
    }
}
