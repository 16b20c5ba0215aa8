use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::id::{GroupId, UserId};
use crate::model::message::Message;
use crate::model::profile::UserProfile;

/// The entire replicated ledger: the in-process copy is the read path for
/// every query and the merge target for inbound snapshots.
///
/// `version` is a monotonic token bumped on every local write-through;
/// inbound snapshots carrying an older token are stale echoes and must be
/// rejected rather than applied (see `sync::coordinator`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerTree {
    pub version: u64,
    pub scores: BTreeMap<UserId, f64>,
    pub messages: Vec<Message>,
    pub users: BTreeMap<UserId, UserProfile>,
}

impl LedgerTree {
    /// Balance for an id, zero for unseen ids. Entries are created on first
    /// write, never on read.
    pub fn score(&self, id: &UserId) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }

    pub fn set_score(&mut self, id: &UserId, value: f64) {
        self.scores.insert(id.clone(), value);
    }

    /// Sum of every balance whose key sits under the group prefix.
    pub fn group_total(&self, group: &GroupId) -> f64 {
        self.scores
            .iter()
            .filter(|(id, _)| id.in_group(group))
            .map(|(_, score)| score)
            .sum()
    }

    /// Materializes a default profile for unseen ids. Returns whether a new
    /// record was created so the caller can propagate it.
    pub fn ensure_profile(&mut self, id: &UserId) -> bool {
        if self.users.contains_key(id) {
            return false;
        }
        self.users.insert(id.clone(), UserProfile::new(id.clone()));
        true
    }

    /// Mutable profile access; materializes on first touch like
    /// [`LedgerTree::ensure_profile`], which callers should invoke first when
    /// they need to know whether creation happened.
    pub fn profile_mut(&mut self, id: &UserId) -> &mut UserProfile {
        self.users
            .entry(id.clone())
            .or_insert_with(|| UserProfile::new(id.clone()))
    }

    pub fn profile(&self, id: &UserId) -> Option<&UserProfile> {
        self.users.get(id)
    }
}
