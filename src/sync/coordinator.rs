//! Ownership and lifecycle of the local cache.
//!
//! [`SyncHandle`] is the single shared state container: engines clone the
//! handle, read under a short-lived lock, and commit mutations through
//! [`SyncHandle::write_through`], which applies them locally and queues the
//! matching partial update for fire-and-forget remote propagation. The
//! coordinator's two background tasks are the only other parties touching
//! the cache: the outbound pump drains the propagation queue, the inbound
//! loop applies remote snapshots.

use std::sync::{Arc, PoisonError, RwLock};

use futures::StreamExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::model::LedgerTree;
use crate::sync::path::{PathOp, UpdateBatch};
use crate::sync::transport::ReplicaTransport;

#[derive(Debug)]
enum Outbound {
    Replace(LedgerTree),
    Update(UpdateBatch),
}

/// Cloneable handle over the in-process authoritative cache.
#[derive(Clone)]
pub struct SyncHandle {
    state: Arc<RwLock<LedgerTree>>,
    outbound: UnboundedSender<Outbound>,
}

impl SyncHandle {
    /// Run a closure against the current cache contents.
    pub fn read<R>(&self, f: impl FnOnce(&LedgerTree) -> R) -> R {
        let tree = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&tree)
    }

    /// Apply a mutation to the cache and queue its partial update for remote
    /// propagation. The closure pushes the path ops describing what it
    /// changed; all ops from one call are committed and propagated as a
    /// single unit. Returns as soon as the local mutation is applied; the
    /// caller never waits on (or hears about) the remote write.
    pub fn write_through<R>(&self, f: impl FnOnce(&mut LedgerTree, &mut Vec<PathOp>) -> R) -> R {
        let mut tree = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut ops = Vec::new();
        let out = f(&mut tree, &mut ops);

        if !ops.is_empty() {
            tree.version += 1;
            let batch = UpdateBatch {
                version: tree.version,
                ops,
            };
            if self.outbound.send(Outbound::Update(batch)).is_err() {
                warn!("outbound pump is gone; keeping local mutation only");
            }
        }

        out
    }

    /// Apply one inbound remote snapshot.
    ///
    /// `None` means the remote store is empty: the current local tree is
    /// pushed up to seed it. A stale snapshot, one whose version token is
    /// behind the local cache, is an echo of state we have since overwritten
    /// and is dropped instead of applied.
    #[instrument(skip(self, snapshot))]
    pub fn apply_snapshot(&self, snapshot: Option<LedgerTree>) {
        let mut tree = self.state.write().unwrap_or_else(PoisonError::into_inner);

        match snapshot {
            None => {
                info!("remote store is empty; seeding it with the local tree");
                if self
                    .outbound
                    .send(Outbound::Replace(tree.clone()))
                    .is_err()
                {
                    warn!("outbound pump is gone; remote store stays empty");
                }
            }
            Some(incoming) => {
                if incoming.version < tree.version {
                    warn!(
                        incoming = incoming.version,
                        local = tree.version,
                        "rejecting stale snapshot"
                    );
                    return;
                }
                debug!(version = incoming.version, "applying remote snapshot");
                *tree = incoming;
            }
        }
    }

    /// Current version token, for tests and diagnostics.
    pub fn version(&self) -> u64 {
        self.read(|tree| tree.version)
    }
}

pub struct SyncCoordinator;

impl SyncCoordinator {
    /// Wire a fresh cache to a transport: spawns the outbound pump and the
    /// inbound snapshot loop, returning the shared handle plus the task
    /// handles so the caller owns their lifetime.
    pub fn spawn(transport: Arc<dyn ReplicaTransport>) -> (SyncHandle, Vec<JoinHandle<()>>) {
        let (tx, rx) = unbounded_channel();
        let handle = SyncHandle {
            state: Arc::new(RwLock::new(LedgerTree::default())),
            outbound: tx,
        };

        let pump = tokio::spawn(run_outbound(Arc::clone(&transport), rx));
        let inbound = tokio::spawn(run_inbound(transport, handle.clone()));

        (handle, vec![pump, inbound])
    }

    /// A handle with no transport behind it; mutations stay local. Test-only
    /// escape hatch for exercising engines without a pump task.
    pub fn detached() -> SyncHandle {
        let (tx, _rx) = unbounded_channel();
        SyncHandle {
            state: Arc::new(RwLock::new(LedgerTree::default())),
            outbound: tx,
        }
    }
}

/// Drains the propagation queue. Failures are logged and dropped: the local
/// cache stays authoritative until the next inbound snapshot.
async fn run_outbound(transport: Arc<dyn ReplicaTransport>, mut rx: UnboundedReceiver<Outbound>) {
    while let Some(outbound) = rx.recv().await {
        let result = match &outbound {
            Outbound::Replace(tree) => transport.replace(tree).await,
            Outbound::Update(batch) => transport.update(batch).await,
        };
        if let Err(error) = result {
            warn!(%error, "remote propagation failed; local cache stays authoritative");
        }
    }
    debug!("outbound pump stopped");
}

async fn run_inbound(transport: Arc<dyn ReplicaTransport>, handle: SyncHandle) {
    let mut stream = match transport.subscribe().await {
        Ok(stream) => stream,
        Err(error) => {
            error!(%error, "snapshot subscription failed; running local-only");
            return;
        }
    };

    while let Some(snapshot) = stream.next().await {
        handle.apply_snapshot(snapshot);
    }
    debug!("snapshot stream ended");
}
