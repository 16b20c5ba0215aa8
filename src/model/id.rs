use core::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the group handle and the personal handle in a [`UserId`].
pub const ID_SEPARATOR: &str = "::";

/// Primary key across every section of the ledger tree: `<group>::<handle>`,
/// with the personal handle lowercased at construction.
///
/// The format is load-bearing: group totals are computed by prefix-scanning
/// these keys, so it must survive serialization byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl UserId {
    pub fn new(group: &GroupId, handle: &str) -> Self {
        Self(format!("{}{}{}", group.0, ID_SEPARATOR, handle.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `<group>` half of the key, if the id is well-formed.
    pub fn group(&self) -> Option<GroupId> {
        self.0
            .split_once(ID_SEPARATOR)
            .map(|(group, _)| GroupId(group.to_string()))
    }

    /// The `<handle>` half of the key, if the id is well-formed.
    pub fn handle(&self) -> Option<&str> {
        self.0.split_once(ID_SEPARATOR).map(|(_, handle)| handle)
    }

    pub fn in_group(&self, group: &GroupId) -> bool {
        match self.0.split_once(ID_SEPARATOR) {
            Some((prefix, _)) => prefix == group.0,
            None => false,
        }
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        GroupId(value)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        GroupId(value.to_string())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId(value.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_lowercased() {
        let id = UserId::new(&GroupId::from("@pearl.team"), "Gabriela");
        assert_eq!(id.as_str(), "@pearl.team::gabriela");
    }

    #[test]
    fn group_prefix_roundtrip() {
        let group = GroupId::from("@influencers.team");
        let id = UserId::new(&group, "anny");

        assert!(id.in_group(&group));
        assert!(!id.in_group(&GroupId::from("@influencers")));
        assert_eq!(id.group(), Some(group));
        assert_eq!(id.handle(), Some("anny"));
    }
}
