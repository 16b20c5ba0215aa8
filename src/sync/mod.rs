pub mod coordinator;
pub mod path;
pub mod transport;

pub use coordinator::{SyncCoordinator, SyncHandle};
pub use path::{PathOp, UpdateBatch};
pub use transport::{MemoryTransport, RedisTransport, ReplicaTransport, TransportError};
