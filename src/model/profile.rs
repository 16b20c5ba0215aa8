use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::id::{ItemId, UserId};

pub const DEFAULT_AVATAR_ID: &str = "1";

/// Cosmetic slot classes. Closed set: adding a slot means adding a variant
/// here and a field on [`Loadout`], nothing else moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Border,
}

/// Currently equipped cosmetics, one optional item per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<ItemId>,
}

impl Loadout {
    pub fn slot(&self, kind: ItemKind) -> Option<&ItemId> {
        match kind {
            ItemKind::Border => self.border.as_ref(),
        }
    }

    pub fn set_slot(&mut self, kind: ItemKind, item: Option<ItemId>) {
        match kind {
            ItemKind::Border => self.border = item,
        }
    }
}

/// One submitted activity report. Immutable once written for a given date;
/// a later write for the same date replaces the entry wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub count: u8,
    pub bonus: f64,
}

/// Per-user mutable state, materialized lazily on first access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: UserId,
    pub nickname: String,
    pub avatar_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_penalty_check: Option<NaiveDate>,
    pub history: BTreeMap<NaiveDate, DailyReport>,
    pub inventory: Vec<ItemId>,
    pub equipped: Loadout,
    pub inbox: Vec<String>,
}

impl UserProfile {
    /// A fresh profile for an unseen id. The nickname starts out as the full
    /// id; callers overwrite it with a display name on first login.
    pub fn new(user_id: UserId) -> Self {
        Self {
            nickname: user_id.0.clone(),
            avatar_id: DEFAULT_AVATAR_ID.to_string(),
            user_id,
            ..Self::default()
        }
    }

    pub fn owns(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_shape() {
        let profile = UserProfile::new(UserId::from("@pearl.team::thayssa"));

        assert_eq!(profile.nickname, "@pearl.team::thayssa");
        assert_eq!(profile.avatar_id, DEFAULT_AVATAR_ID);
        assert!(profile.history.is_empty());
        assert!(profile.inventory.is_empty());
        assert!(profile.inbox.is_empty());
        assert_eq!(profile.equipped, Loadout::default());
    }

    #[test]
    fn profile_deserializes_with_missing_sections() {
        // Remote snapshots may omit empty containers entirely.
        let profile: UserProfile =
            serde_json::from_str(r#"{"user_id":"@g::a","nickname":"a","avatar_id":"2"}"#)
                .expect("partial profile should deserialize");

        assert!(profile.inventory.is_empty());
        assert!(profile.inbox.is_empty());
        assert!(profile.last_penalty_check.is_none());
    }
}
