use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::id::UserId;

/// One community board entry. Append-only; insertion order is the global
/// order, the timestamp is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub author: UserId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(author: UserId, text: impl Into<String>) -> Self {
        Self {
            author,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}
