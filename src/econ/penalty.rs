//! Daily quota enforcement. One evaluation per user per calendar day has an
//! externally visible effect; every further call that day is a no-op.

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::model::UserId;
use crate::sync::{PathOp, SyncHandle};

/// Required activity count for the previous day.
pub const DAILY_QUOTA: u8 = 5;
/// Gold debited when the quota was missed.
pub const PENALTY_GOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenaltyOutcome {
    /// Quota missed yesterday; the penalty was debited just now.
    Punished { new_balance: f64 },
    /// Yesterday's report met the quota; no debit.
    MetQuota,
    /// Already evaluated today; nothing happened.
    AlreadyChecked,
}

impl PenaltyOutcome {
    pub fn punished(&self) -> bool {
        matches!(self, PenaltyOutcome::Punished { .. })
    }
}

#[derive(Clone)]
pub struct PenaltyEngine {
    sync: SyncHandle,
}

impl PenaltyEngine {
    pub fn new(sync: SyncHandle) -> Self {
        Self { sync }
    }

    /// Evaluate the quota for `id` as of `today`.
    ///
    /// The guard is `last_penalty_check`, stamped in every branch before
    /// returning, so rapid repeated invocations (every login, every polling
    /// tick) debit at most once per calendar day. The check inspects only
    /// yesterday's report entry; an absent entry counts as a miss.
    #[instrument(skip(self), fields(user = %id, %today))]
    pub fn check(&self, id: &UserId, today: NaiveDate) -> PenaltyOutcome {
        self.sync.write_through(|tree, ops| {
            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }

            let profile = tree.profile_mut(id);
            if profile.last_penalty_check == Some(today) {
                return PenaltyOutcome::AlreadyChecked;
            }
            profile.last_penalty_check = Some(today);
            ops.push(PathOp::merge(
                format!("users/{id}"),
                &serde_json::json!({ "last_penalty_check": today }),
            ));

            let yesterday = today.pred_opt();
            let met_quota = yesterday
                .and_then(|date| profile.history.get(&date))
                .is_some_and(|report| report.count >= DAILY_QUOTA);

            if met_quota {
                return PenaltyOutcome::MetQuota;
            }

            let new_balance = tree.score(id) - PENALTY_GOLD;
            tree.set_score(id, new_balance);
            ops.push(PathOp::set(format!("scores/{id}"), &new_balance));

            info!(new_balance, "quota missed; penalty applied");
            PenaltyOutcome::Punished { new_balance }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::econ::profiles::ProfileStore;
    use crate::sync::SyncCoordinator;

    fn engines() -> (PenaltyEngine, ProfileStore, SyncHandle) {
        let sync = SyncCoordinator::detached();
        (
            PenaltyEngine::new(sync.clone()),
            ProfileStore::new(sync.clone()),
            sync,
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn missed_quota_debits_exactly_once_per_day() {
        let (penalty, _profiles, sync) = engines();
        let id = UserId::from("@g::a");
        let today = day(2026, 8, 28);

        // No report yesterday at all.
        let first = penalty.check(&id, today);
        assert_eq!(
            first,
            PenaltyOutcome::Punished {
                new_balance: -PENALTY_GOLD
            }
        );

        // Hammer the check; the balance must not move again.
        for _ in 0..5 {
            assert_eq!(penalty.check(&id, today), PenaltyOutcome::AlreadyChecked);
        }
        assert_eq!(sync.read(|tree| tree.score(&id)), -PENALTY_GOLD);
    }

    #[test]
    fn deficient_report_is_punished() {
        let (penalty, profiles, sync) = engines();
        let id = UserId::from("@g::a");
        let today = day(2026, 8, 28);

        profiles.record_daily_report(&id, day(2026, 8, 27), 4, 2.0);

        assert!(penalty.check(&id, today).punished());
        assert_eq!(sync.read(|tree| tree.score(&id)), -PENALTY_GOLD);
    }

    #[test]
    fn met_quota_is_not_punished_but_still_stamped() {
        let (penalty, profiles, _sync) = engines();
        let id = UserId::from("@g::a");
        let today = day(2026, 8, 28);

        profiles.record_daily_report(&id, day(2026, 8, 27), DAILY_QUOTA, 3.3);

        assert_eq!(penalty.check(&id, today), PenaltyOutcome::MetQuota);
        // Stamped: a second call the same day is a no-op, not MetQuota.
        assert_eq!(penalty.check(&id, today), PenaltyOutcome::AlreadyChecked);
    }

    #[test]
    fn next_day_is_evaluated_fresh() {
        let (penalty, _profiles, sync) = engines();
        let id = UserId::from("@g::a");

        assert!(penalty.check(&id, day(2026, 8, 28)).punished());
        assert!(penalty.check(&id, day(2026, 8, 29)).punished());
        assert_eq!(sync.read(|tree| tree.score(&id)), -2.0 * PENALTY_GOLD);
    }
}
