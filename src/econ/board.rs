//! The community message board: append-only, globally ordered by insertion,
//! with a recent-window read for the display layer.

use tracing::instrument;

use crate::model::{Message, UserId};
use crate::sync::{PathOp, SyncHandle};

#[derive(Clone)]
pub struct MessageBoard {
    sync: SyncHandle,
}

impl MessageBoard {
    pub fn new(sync: SyncHandle) -> Self {
        Self { sync }
    }

    #[instrument(skip(self, text), fields(author = %author))]
    pub fn post(&self, author: UserId, text: impl Into<String>) -> Message {
        let message = Message::new(author, text);
        self.sync.write_through(|tree, ops| {
            tree.messages.push(message.clone());
            ops.push(PathOp::set("messages", &tree.messages));
        });
        message
    }

    /// The most recent `limit` messages, oldest first within the window.
    pub fn recent(&self, limit: usize) -> Vec<Message> {
        self.sync.read(|tree| {
            let start = tree.messages.len().saturating_sub(limit);
            tree.messages[start..].to_vec()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncCoordinator;

    #[test]
    fn recent_window_keeps_insertion_order() {
        let board = MessageBoard::new(SyncCoordinator::detached());
        let author = UserId::from("@g::a");

        for n in 0..5 {
            board.post(author.clone(), format!("msg {n}"));
        }

        let window = board.recent(3);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].text, "msg 2");
        assert_eq!(window[2].text, "msg 4");

        assert_eq!(board.recent(100).len(), 5);
    }
}
