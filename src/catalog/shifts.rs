//! Static shift roster: group -> personal handle -> scheduled "HH:MM".
//! Pure configuration consumed by the reminder endpoint; no state machine.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};

use crate::model::GroupId;

type Roster = BTreeMap<String, BTreeMap<String, String>>;

static ROSTER: LazyLock<Roster> = LazyLock::new(|| {
    serde_json::from_str(include_str!("shifts.json")).expect("embedded roster is valid")
});

/// Scheduled shift for a handle within a group. Handles are stored
/// lowercased, matching the id normalization.
pub fn shift_for(group: &GroupId, handle: &str) -> Option<&'static str> {
    ROSTER
        .get(&group.0)
        .and_then(|members| members.get(&handle.to_lowercase()))
        .map(String::as_str)
}

/// Whole minutes from `now` until the "HH:MM" shift time, negative once the
/// shift has started. `None` for malformed entries.
pub fn minutes_until(shift: &str, now: NaiveTime) -> Option<i64> {
    let parsed = NaiveTime::parse_from_str(shift, "%H:%M").ok()?;
    let shift_minutes = i64::from(parsed.hour()) * 60 + i64::from(parsed.minute());
    let now_minutes = i64::from(now.hour()) * 60 + i64::from(now.minute());
    Some(shift_minutes - now_minutes)
}
