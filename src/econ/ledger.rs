//! Score arithmetic and aggregation over the shared cache.

use serde::Serialize;
use tracing::instrument;

use crate::econ::rank::{self, RankTier};
use crate::model::{GroupId, UserId};
use crate::sync::{PathOp, SyncHandle};

#[derive(Clone)]
pub struct Ledger {
    sync: SyncHandle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub nickname: String,
    pub score: f64,
    pub rank: RankTier,
    pub ranking: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub group: GroupId,
    pub total: f64,
}

impl Ledger {
    pub fn new(sync: SyncHandle) -> Self {
        Self { sync }
    }

    pub fn score(&self, id: &UserId) -> f64 {
        self.sync.read(|tree| tree.score(id))
    }

    /// Unconditional credit or debit. Penalties pass a negative delta and no
    /// lower bound is enforced; balances may go negative.
    #[instrument(skip(self), fields(user = %id))]
    pub fn add_score(&self, id: &UserId, delta: f64) -> f64 {
        self.sync.write_through(|tree, ops| {
            let next = tree.score(id) + delta;
            tree.set_score(id, next);
            ops.push(PathOp::set(format!("scores/{id}"), &next));
            next
        })
    }

    pub fn group_total(&self, group: &GroupId) -> f64 {
        self.sync.read(|tree| tree.group_total(group))
    }

    /// Totals per group, highest first. Groups are discovered from the score
    /// keys themselves.
    pub fn group_totals(&self) -> Vec<GroupTotal> {
        self.sync.read(|tree| {
            let mut totals: Vec<GroupTotal> = Vec::new();
            for (id, score) in &tree.scores {
                let Some(group) = id.group() else { continue };
                match totals.iter_mut().find(|entry| entry.group == group) {
                    Some(entry) => entry.total += score,
                    None => totals.push(GroupTotal {
                        group,
                        total: *score,
                    }),
                }
            }
            totals.sort_by(|a, b| b.total.total_cmp(&a.total));
            totals
        })
    }

    /// Members of one group, highest balance first, rank recomputed per row.
    pub fn group_leaderboard(&self, group: &GroupId) -> Vec<LeaderboardEntry> {
        self.sync.read(|tree| {
            let mut rows: Vec<LeaderboardEntry> = tree
                .scores
                .iter()
                .filter(|(id, _)| id.in_group(group))
                .map(|(id, score)| LeaderboardEntry {
                    user_id: id.clone(),
                    nickname: tree
                        .profile(id)
                        .map(|p| p.nickname.clone())
                        .unwrap_or_else(|| id.0.clone()),
                    score: *score,
                    rank: rank::resolve(*score),
                    ranking: 0,
                })
                .collect();

            rows.sort_by(|a, b| b.score.total_cmp(&a.score));
            for (idx, row) in rows.iter_mut().enumerate() {
                row.ranking = idx + 1;
            }
            rows
        })
    }
}
