//! The seam between the in-process cache and the remotely replicated store.
//!
//! The remote side offers no transactions: writers push either a full-tree
//! replace or a batch of partial path updates, and every committed write is
//! fanned back out to all subscribers as a full-tree snapshot. `None` on the
//! snapshot stream means the remote store is empty.

use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing::{info, instrument, trace};

use crate::model::LedgerTree;
use crate::sync::path::{self, UpdateBatch};

pub type TransportResult<T> = core::result::Result<T, TransportError>;
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Option<LedgerTree>> + Send>>;

/// Redis key holding the serialized tree.
pub const TREE_KEY: &str = "ledger:tree";
/// Pub/sub channel carrying snapshot fan-out.
pub const SNAPSHOT_CHANNEL: &str = "ledger:snapshots";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("redis client error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait ReplicaTransport: Send + Sync {
    /// Replace the entire remote tree. Used to seed an empty remote store.
    async fn replace(&self, tree: &LedgerTree) -> TransportResult<()>;

    /// Apply a batch of partial path updates to the remote tree.
    async fn update(&self, batch: &UpdateBatch) -> TransportResult<()>;

    /// Subscribe to the remote snapshot stream. The current remote state is
    /// delivered first, then every subsequent committed write.
    async fn subscribe(&self) -> TransportResult<SnapshotStream>;
}

/// Production transport: the tree lives under [`TREE_KEY`] as JSON and every
/// committed write is published on [`SNAPSHOT_CHANNEL`].
pub struct RedisTransport {
    client: redis::Client,
    conn: ConnectionManager,
}

impl RedisTransport {
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> TransportResult<Self> {
        info!("replica transport connecting to redis");

        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client.clone()).await?;

        Ok(Self { client, conn })
    }

    async fn fetch(&self) -> TransportResult<Option<LedgerTree>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(TREE_KEY).await?;

        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn store_and_publish(&self, value: &Value) -> TransportResult<()> {
        let payload = value.to_string();
        let mut conn = self.conn.clone();

        let _: () = conn.set(TREE_KEY, &payload).await?;
        let _: () = conn.publish(SNAPSHOT_CHANNEL, &payload).await?;

        Ok(())
    }
}

#[async_trait]
impl ReplicaTransport for RedisTransport {
    #[instrument(skip(self, tree))]
    async fn replace(&self, tree: &LedgerTree) -> TransportResult<()> {
        self.store_and_publish(&path::to_json(tree)).await
    }

    #[instrument(skip(self, batch), fields(version = batch.version, ops = batch.ops.len()))]
    async fn update(&self, batch: &UpdateBatch) -> TransportResult<()> {
        // Read-modify-write at the remote; last writer wins, same as the
        // remote store's own merge semantics.
        let mut root = match self.fetch().await? {
            Some(tree) => path::to_json(&tree),
            None => path::to_json(&LedgerTree::default()),
        };

        path::apply_batch(&mut root, batch);
        self.store_and_publish(&root).await
    }

    async fn subscribe(&self) -> TransportResult<SnapshotStream> {
        let initial = self.fetch().await?;

        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(SNAPSHOT_CHANNEL).await?;

        let published = pubsub.into_on_message().filter_map(|msg| async move {
            let payload: String = msg.get_payload().ok()?;
            trace!(bytes = payload.len(), "inbound snapshot payload");
            match serde_json::from_str::<LedgerTree>(&payload) {
                Ok(tree) => Some(Some(tree)),
                Err(error) => {
                    tracing::warn!(%error, "discarding undecodable snapshot");
                    None
                }
            }
        });

        Ok(Box::pin(futures::stream::iter([initial]).chain(published)))
    }
}

/// In-memory stand-in for the remote store, used by tests: same replace /
/// update / fan-out contract, no network.
#[derive(Default)]
pub struct MemoryTransport {
    tree: Mutex<Option<Value>>,
    subscribers: Mutex<Vec<UnboundedSender<Option<LedgerTree>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current remote-side tree, for test assertions.
    pub fn remote_tree(&self) -> Option<LedgerTree> {
        let guard = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    fn broadcast(&self, snapshot: Option<LedgerTree>) {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

#[async_trait]
impl ReplicaTransport for MemoryTransport {
    async fn replace(&self, tree: &LedgerTree) -> TransportResult<()> {
        {
            let mut guard = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
            *guard = Some(path::to_json(tree));
        }
        self.broadcast(Some(tree.clone()));
        Ok(())
    }

    async fn update(&self, batch: &UpdateBatch) -> TransportResult<()> {
        let snapshot = {
            let mut guard = self.tree.lock().unwrap_or_else(PoisonError::into_inner);
            let mut root = guard.take().unwrap_or(Value::Null);
            path::apply_batch(&mut root, batch);
            let parsed = serde_json::from_value::<LedgerTree>(root.clone())?;
            *guard = Some(root);
            parsed
        };
        self.broadcast(Some(snapshot));
        Ok(())
    }

    async fn subscribe(&self) -> TransportResult<SnapshotStream> {
        let (tx, rx) = unbounded_channel();

        let initial = self.remote_tree();
        let _ = tx.send(initial);

        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|snapshot| (snapshot, rx))
        });

        Ok(Box::pin(stream))
    }
}
