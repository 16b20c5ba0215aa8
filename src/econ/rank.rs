//! Rank tiers derived from the current balance. Never stored: every read
//! recomputes the tier from the score at fixed ascending thresholds.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RankTier {
    #[default]
    Unranked,
    Bronze,
    Silver,
    Gold,
    Diamond,
}

pub const BRONZE_THRESHOLD: f64 = 1.0;
pub const SILVER_THRESHOLD: f64 = 500.0;
pub const GOLD_THRESHOLD: f64 = 2000.0;
pub const DIAMOND_THRESHOLD: f64 = 5000.0;

impl RankTier {
    /// Position in the tier order; gates store purchases.
    pub fn ordinal(self) -> u8 {
        match self {
            RankTier::Unranked => 0,
            RankTier::Bronze => 1,
            RankTier::Silver => 2,
            RankTier::Gold => 3,
            RankTier::Diamond => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankTier::Unranked => "Unranked",
            RankTier::Bronze => "Bronze",
            RankTier::Silver => "Silver",
            RankTier::Gold => "Gold",
            RankTier::Diamond => "Diamond",
        }
    }
}

/// Tier for a score. Boundaries are lower-inclusive: a score sitting exactly
/// on a threshold belongs to the tier it just entered.
pub fn resolve(score: f64) -> RankTier {
    if score >= DIAMOND_THRESHOLD {
        RankTier::Diamond
    } else if score >= GOLD_THRESHOLD {
        RankTier::Gold
    } else if score >= SILVER_THRESHOLD {
        RankTier::Silver
    } else if score >= BRONZE_THRESHOLD {
        RankTier::Bronze
    } else {
        RankTier::Unranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_lower_inclusive() {
        assert_eq!(resolve(0.0), RankTier::Unranked);
        assert_eq!(resolve(0.9), RankTier::Unranked);
        assert_eq!(resolve(1.0), RankTier::Bronze);
        assert_eq!(resolve(499.9), RankTier::Bronze);
        assert_eq!(resolve(500.0), RankTier::Silver);
        assert_eq!(resolve(2000.0), RankTier::Gold);
        assert_eq!(resolve(5000.0), RankTier::Diamond);
        assert_eq!(resolve(1_000_000.0), RankTier::Diamond);
    }

    #[test]
    fn resolution_is_monotonic() {
        let mut prev = resolve(-100.0);
        let mut score = -100.0;
        while score < 6000.0 {
            let tier = resolve(score);
            assert!(tier >= prev, "rank regressed at score {score}");
            prev = tier;
            score += 0.5;
        }
    }

    #[test]
    fn negative_scores_are_unranked() {
        assert_eq!(resolve(-50.0), RankTier::Unranked);
        assert_eq!(resolve(-50.0).ordinal(), 0);
    }

    #[test]
    fn ordinals_follow_tier_order() {
        let tiers = [
            RankTier::Unranked,
            RankTier::Bronze,
            RankTier::Silver,
            RankTier::Gold,
            RankTier::Diamond,
        ];
        for window in tiers.windows(2) {
            assert!(window[0].ordinal() < window[1].ordinal());
        }
    }
}
