use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

/// FIFO buffer of attendance events awaiting peripheral pickup.
///
/// In-process and volatile: contents are lost when the process exits. An
/// event is removed the moment it is handed out; there is no redelivery.
#[derive(Clone, Default)]
pub struct PendingQueue {
    inner: Arc<Mutex<VecDeque<Value>>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, event: Value) {
        self.inner.lock().await.push_back(event);
    }

    /// Removes and returns the oldest pending event, or `None` when the
    /// queue is empty. Never waits for an event to arrive.
    pub async fn try_next(&self) -> Option<Value> {
        self.inner.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
