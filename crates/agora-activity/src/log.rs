use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::feed::{self, Order};
use crate::record::ActivityRecord;

/// Records kept when no capacity is given; matches the largest feed page.
pub const DEFAULT_CAPACITY: usize = 200;

/// Holds the most recent activity records and fans new ones out to
/// subscribers. Records are never persisted; see
/// `agora_api::activity::backfill` for rebuilding the log at startup.
#[derive(Clone)]
pub struct ActivityLog {
    inner: Arc<ActivityLogInner>,
}

struct ActivityLogInner {
    /// Every subscriber receives every new record
    broadcast_tx: broadcast::Sender<ActivityRecord>,

    /// Records in the order they were appended, at most `capacity` of them
    records: RwLock<VecDeque<ActivityRecord>>,

    capacity: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Once `capacity` records are held, each new one evicts the oldest appended.
    pub fn with_capacity(capacity: usize) -> Self {
        let (broadcast_tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(ActivityLogInner {
                broadcast_tx,
                records: RwLock::new(VecDeque::with_capacity(capacity)),
                capacity,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Subscribe to records appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityRecord> {
        self.inner.broadcast_tx.subscribe()
    }

    pub async fn record(&self, record: ActivityRecord) {
        debug!("Recording {:?} activity {}", record.variant(), record.id());
        {
            let mut records = self.inner.records.write().await;
            records.push_back(record.clone());
            self.evict(&mut records);
        }
        let _ = self.inner.broadcast_tx.send(record);
    }

    /// Append without notifying subscribers.
    pub async fn extend<I>(&self, records: I)
    where
        I: IntoIterator<Item = ActivityRecord>,
    {
        let mut held = self.inner.records.write().await;
        held.extend(records);
        self.evict(&mut held);
    }

    /// Swap the whole contents for `records` without notifying subscribers.
    /// Only the last `capacity` of them are kept.
    pub async fn replace<I>(&self, records: I)
    where
        I: IntoIterator<Item = ActivityRecord>,
    {
        let mut held = self.inner.records.write().await;
        held.clear();
        held.extend(records);
        self.evict(&mut held);
    }

    fn evict(&self, records: &mut VecDeque<ActivityRecord>) {
        let excess = records.len().saturating_sub(self.inner.capacity);
        records.drain(..excess);
    }

    pub async fn len(&self) -> usize {
        self.inner.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.records.read().await.is_empty()
    }

    /// All held records in append order.
    pub async fn snapshot(&self) -> Vec<ActivityRecord> {
        self.inner.records.read().await.iter().cloned().collect()
    }

    /// Up to `limit` records, ordered by creation time.
    pub async fn timeline(&self, order: Order, limit: usize) -> Vec<ActivityRecord> {
        let mut records = self.snapshot().await;
        feed::sort_timeline(&mut records, order);
        records.truncate(limit);
        records
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
