//! Per-user profile state: lazy materialization, shallow-merge updates,
//! report history upserts, and the cosmetic equip toggle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::model::{DailyReport, ItemId, UserId, UserProfile};
use crate::sync::{PathOp, SyncHandle};

pub type ProfileResult<T> = core::result::Result<T, ProfileError>;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("item '{0}' is not in the catalog")]
    UnknownItem(ItemId),

    /// Historically this was a silent no-op; it is an error now so corrupt
    /// equip state cannot be written quietly.
    #[error("item '{0}' is not in the user's inventory")]
    ItemNotOwned(ItemId),
}

/// Shallow patch for [`ProfileStore::update`]: absent fields stay untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipAction {
    Equipped,
    Unequipped,
}

#[derive(Clone)]
pub struct ProfileStore {
    sync: SyncHandle,
    catalog: &'static Catalog,
}

impl ProfileStore {
    pub fn new(sync: SyncHandle) -> Self {
        Self {
            sync,
            catalog: Catalog::global(),
        }
    }

    /// Existing profile, or a default one materialized and propagated on
    /// first sight. Calling this repeatedly for the same id never creates a
    /// second record and never bumps the cache version once the record
    /// exists.
    #[instrument(skip(self), fields(user = %id))]
    pub fn get_or_create(&self, id: &UserId) -> UserProfile {
        if let Some(existing) = self.sync.read(|tree| tree.profile(id).cloned()) {
            return existing;
        }

        self.sync.write_through(|tree, ops| {
            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }
            tree.profile_mut(id).clone()
        })
    }

    /// Shallow-merges the patch into the profile, materializing it first if
    /// needed. Fields absent from the patch are untouched.
    #[instrument(skip(self, patch), fields(user = %id))]
    pub fn update(&self, id: &UserId, patch: &ProfilePatch) -> UserProfile {
        self.sync.write_through(|tree, ops| {
            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }

            let profile = tree.profile_mut(id);
            if let Some(nickname) = &patch.nickname {
                profile.nickname = nickname.clone();
            }
            if let Some(avatar_id) = &patch.avatar_id {
                profile.avatar_id = avatar_id.clone();
            }
            if let Some(url) = &patch.custom_avatar_url {
                profile.custom_avatar_url = Some(url.clone());
            }
            if let Some(date) = patch.last_report_date {
                profile.last_report_date = Some(date);
            }

            ops.push(PathOp::merge(format!("users/{id}"), patch));
            profile.clone()
        })
    }

    /// Upserts the report at `date`; a later write for the same date
    /// replaces the earlier entry.
    #[instrument(skip(self), fields(user = %id, %date))]
    pub fn record_daily_report(&self, id: &UserId, date: NaiveDate, count: u8, bonus: f64) {
        self.sync.write_through(|tree, ops| {
            if tree.ensure_profile(id) {
                ops.push(PathOp::set(format!("users/{id}"), tree.profile_mut(id)));
            }

            let report = DailyReport { count, bonus };
            tree.profile_mut(id).history.insert(date, report.clone());
            ops.push(PathOp::set(format!("users/{id}/history/{date}"), &report));
        })
    }

    /// Toggle the item in its slot: equipping the equipped item removes it,
    /// equipping a different owned item replaces the previous one. Items the
    /// user does not own are rejected, never silently ignored.
    #[instrument(skip(self), fields(user = %id, item = %item_id))]
    pub fn equip(&self, id: &UserId, item_id: &ItemId) -> ProfileResult<EquipAction> {
        let item = self
            .catalog
            .get(item_id)
            .ok_or_else(|| ProfileError::UnknownItem(item_id.clone()))?;

        self.sync.write_through(|tree, ops| {
            let Some(profile) = tree.users.get_mut(id) else {
                return Err(ProfileError::ItemNotOwned(item_id.clone()));
            };
            if !profile.owns(item_id) {
                return Err(ProfileError::ItemNotOwned(item_id.clone()));
            }

            let action = if profile.equipped.slot(item.kind) == Some(item_id) {
                profile.equipped.set_slot(item.kind, None);
                EquipAction::Unequipped
            } else {
                profile.equipped.set_slot(item.kind, Some(item_id.clone()));
                EquipAction::Equipped
            };

            ops.push(PathOp::set(
                format!("users/{id}/equipped"),
                &profile.equipped,
            ));
            Ok(action)
        })
    }
}
