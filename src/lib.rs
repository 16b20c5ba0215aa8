pub mod api;
pub mod catalog;
pub mod econ;
pub mod model;
pub mod sync;
pub mod util;

pub mod prelude {
    pub use crate::api::{AppState, start_server};
    pub use crate::catalog::Catalog;
    pub use crate::econ::{
        Ledger, MessageBoard, NotificationInbox, PenaltyEngine, PenaltyOutcome, ProfileError,
        ProfilePatch, ProfileStore, PurchaseEngine, PurchaseError, RankTier, ReportEngine,
        ReportError,
    };
    pub use crate::model::{
        DailyReport, GroupId, ItemId, ItemKind, LedgerTree, Message, UserId, UserProfile,
    };
    pub use crate::sync::{
        MemoryTransport, RedisTransport, ReplicaTransport, SyncCoordinator, SyncHandle,
    };
}
