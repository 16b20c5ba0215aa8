//! Per-user notification queue. Sends append; a drain hands back the whole
//! queue and clears it in the same cache commit, so a message is delivered
//! exactly once.

use tracing::instrument;

use crate::model::UserId;
use crate::sync::{PathOp, SyncHandle};

#[derive(Clone)]
pub struct NotificationInbox {
    sync: SyncHandle,
}

impl NotificationInbox {
    pub fn new(sync: SyncHandle) -> Self {
        Self { sync }
    }

    /// Append a message to the user's queue. Read-modify-write over the full
    /// inbox list; concurrent remote senders resolve last-writer-wins like
    /// every other path write.
    #[instrument(skip(self, message), fields(user = %id))]
    pub fn send(&self, id: &UserId, message: impl Into<String>) {
        let message = message.into();
        self.sync.write_through(|tree, ops| {
            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }

            let profile = tree.profile_mut(id);
            profile.inbox.push(message);
            ops.push(PathOp::set(format!("users/{id}/inbox"), &profile.inbox));
        })
    }

    /// Take everything queued for the user, leaving the queue empty. The
    /// read and the clear happen in one commit: no partial drain is ever
    /// observable, and drained messages are never returned again.
    #[instrument(skip(self), fields(user = %id))]
    pub fn drain_all(&self, id: &UserId) -> Vec<String> {
        self.sync.write_through(|tree, ops| {
            let Some(profile) = tree.users.get_mut(id) else {
                return Vec::new();
            };
            if profile.inbox.is_empty() {
                return Vec::new();
            }

            let drained = std::mem::take(&mut profile.inbox);
            ops.push(PathOp::set(format!("users/{id}/inbox"), &profile.inbox));
            drained
        })
    }
}
