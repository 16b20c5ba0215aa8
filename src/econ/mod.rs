pub mod board;
pub mod inbox;
pub mod ledger;
pub mod penalty;
pub mod profiles;
pub mod purchase;
pub mod rank;
pub mod report;

pub use board::MessageBoard;
pub use inbox::NotificationInbox;
pub use ledger::Ledger;
pub use penalty::{PenaltyEngine, PenaltyOutcome};
pub use profiles::{ProfileError, ProfilePatch, ProfileStore};
pub use purchase::{PurchaseEngine, PurchaseError};
pub use rank::RankTier;
pub use report::{ReportEngine, ReportError};
