pub mod id;
pub mod message;
pub mod profile;
pub mod tree;

pub use id::{GroupId, ItemId, UserId};
pub use message::Message;
pub use profile::{DailyReport, ItemKind, Loadout, UserProfile};
pub use tree::LedgerTree;
