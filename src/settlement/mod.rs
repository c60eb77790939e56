pub mod stats;

pub use stats::ConfidenceStats;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grade the upstream reports before any real score exists.
pub const NO_SCORE_GRADE: i32 = 2;

pub const VERIFIED_MIN_GRADE: i32 = 80;
pub const PROVISIONAL_MIN_GRADE: i32 = 50;

/// How far a game's latest score can be trusted for settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementTier {
    Verified,
    Provisional,
    Unverified,
    #[serde(rename = "No Data")]
    NoData,
}

impl SettlementTier {
    /// Display order, most trusted first.
    pub const ALL: [SettlementTier; 4] = [
        SettlementTier::Verified,
        SettlementTier::Provisional,
        SettlementTier::Unverified,
        SettlementTier::NoData,
    ];

    /// Classify a game's latest confidence grade.
    ///
    /// The sentinel is tested before the thresholds: grade 2 would otherwise
    /// land in `Unverified`.
    pub fn from_grade(grade: Option<i32>) -> Self {
        match grade {
            None | Some(NO_SCORE_GRADE) => SettlementTier::NoData,
            Some(g) => Self::from_range(g),
        }
    }

    /// Range ladder only. Used for individual score submissions, which never
    /// carry the no-score sentinel.
    pub fn from_range(grade: i32) -> Self {
        if grade >= VERIFIED_MIN_GRADE {
            SettlementTier::Verified
        } else if grade >= PROVISIONAL_MIN_GRADE {
            SettlementTier::Provisional
        } else {
            SettlementTier::Unverified
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettlementTier::Verified => "Verified",
            SettlementTier::Provisional => "Provisional",
            SettlementTier::Unverified => "Unverified",
            SettlementTier::NoData => "No Data",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SettlementTier::Verified => "#10B981",
            SettlementTier::Provisional => "#F59E0B",
            SettlementTier::Unverified => "#EF4444",
            SettlementTier::NoData => "#6B7280",
        }
    }
}

impl fmt::Display for SettlementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// True once a real score has been reported (grade above the sentinel).
pub fn has_real_score(grade: Option<i32>) -> bool {
    grade.is_some_and(|g| g > NO_SCORE_GRADE)
}
