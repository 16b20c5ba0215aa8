//! Daily activity report submission: base credit per post plus a tiered
//! random bonus, one submission per user per calendar day.

use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tinyrand::{Rand, RandRange, Seeded, StdRand};
use tinyrand_std::ClockSeed;
use tracing::{info, instrument};

use crate::model::{DailyReport, UserId};
use crate::sync::{PathOp, SyncHandle};

pub type ReportResult<T> = core::result::Result<T, ReportError>;

/// Gold credited per reported post.
pub const GOLD_PER_POST: f64 = 2.0;
/// Maximum posts per report.
pub const MAX_POSTS: u8 = 5;

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("a report was already submitted today")]
    AlreadySubmitted,

    #[error("a report needs at least one post")]
    EmptyReport,

    #[error("count {0} exceeds the daily maximum of {MAX_POSTS}")]
    CountOutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportReceipt {
    pub base: f64,
    pub bonus: f64,
    pub new_balance: f64,
}

pub struct ReportEngine {
    sync: SyncHandle,
    rng: Mutex<StdRand>,
}

impl ReportEngine {
    pub fn new(sync: SyncHandle) -> Self {
        Self::seeded(sync, ClockSeed::default().next_u64())
    }

    pub fn seeded(sync: SyncHandle, seed: u64) -> Self {
        Self {
            sync,
            rng: Mutex::new(StdRand::seed(seed)),
        }
    }

    /// Submit today's report: credits `count * 2` gold plus the bonus roll,
    /// records the history entry, and stamps `last_report_date`, all as one
    /// commit. The date stamp is the guard: a second submission the same day
    /// fails without touching the balance.
    #[instrument(skip(self), fields(user = %id, %today))]
    pub fn submit(&self, id: &UserId, today: NaiveDate, count: u8) -> ReportResult<ReportReceipt> {
        if count == 0 {
            return Err(ReportError::EmptyReport);
        }
        if count > MAX_POSTS {
            return Err(ReportError::CountOutOfRange(count));
        }

        let bonus = self.roll_bonus();

        self.sync.write_through(|tree, ops| {
            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }

            let profile = tree.profile_mut(id);
            if profile.last_report_date == Some(today) {
                return Err(ReportError::AlreadySubmitted);
            }
            profile.last_report_date = Some(today);
            ops.push(PathOp::merge(
                format!("users/{id}"),
                &serde_json::json!({ "last_report_date": today }),
            ));

            let report = DailyReport { count, bonus };
            profile.history.insert(today, report.clone());
            ops.push(PathOp::set(format!("users/{id}/history/{today}"), &report));

            let base = f64::from(count) * GOLD_PER_POST;
            let new_balance = tree.score(id) + base + bonus;
            tree.set_score(id, new_balance);
            ops.push(PathOp::set(format!("scores/{id}"), &new_balance));

            info!(base, bonus, new_balance, "daily report credited");
            Ok(ReportReceipt {
                base,
                bonus,
                new_balance,
            })
        })
    }

    /// Tiered bonus roll, rounded to one decimal:
    /// 80% of rolls land in 0.1..4.0, 17% in 5.0..6.0, 3% in 7.0..10.0.
    fn roll_bonus(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let tier = rng.next_range(0..100u64);
        let fraction = rng.next_range(0..10_000u64) as f64 / 10_000.0;

        let bonus = if tier < 80 {
            0.1 + fraction * 3.9
        } else if tier < 97 {
            5.0 + fraction
        } else {
            7.0 + fraction * 3.0
        };

        (bonus * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncCoordinator;

    fn engine() -> ReportEngine {
        ReportEngine::seeded(SyncCoordinator::detached(), 42)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).expect("valid date")
    }

    #[test]
    fn credit_is_exactly_base_plus_bonus() {
        let engine = engine();
        let id = UserId::from("@g::a");

        let receipt = engine.submit(&id, day(28), 5).expect("first submission");
        assert_eq!(receipt.base, 10.0);
        assert!((0.1..=10.0).contains(&receipt.bonus));
        assert_eq!(receipt.new_balance, receipt.base + receipt.bonus);
        assert_eq!(
            engine.sync.read(|tree| tree.score(&id)),
            receipt.new_balance
        );
    }

    #[test]
    fn second_submission_same_day_does_not_double_credit() {
        let engine = engine();
        let id = UserId::from("@g::a");

        let receipt = engine.submit(&id, day(28), 5).expect("first submission");
        assert_eq!(
            engine.submit(&id, day(28), 3),
            Err(ReportError::AlreadySubmitted)
        );
        assert_eq!(
            engine.sync.read(|tree| tree.score(&id)),
            receipt.new_balance
        );

        // A new calendar day unblocks submission.
        assert!(engine.submit(&id, day(29), 1).is_ok());
    }

    #[test]
    fn count_bounds_are_enforced() {
        let engine = engine();
        let id = UserId::from("@g::a");

        assert_eq!(engine.submit(&id, day(28), 0), Err(ReportError::EmptyReport));
        assert_eq!(
            engine.submit(&id, day(28), 6),
            Err(ReportError::CountOutOfRange(6))
        );
    }

    #[test]
    fn bonus_stays_in_envelope_across_many_rolls() {
        let engine = engine();
        for _ in 0..1000 {
            let bonus = engine.roll_bonus();
            assert!((0.1..=10.0).contains(&bonus), "bonus {bonus} out of range");
            // One decimal place.
            assert_eq!((bonus * 10.0).round() / 10.0, bonus);
        }
    }
}
