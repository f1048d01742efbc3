use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct SlotValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// A single cache slot holding the last value put into it, optionally
/// expiring after a fixed time-to-live.
#[derive(Clone)]
pub struct TimedSlot<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<Option<SlotValue<V>>>>,
    ttl: Option<Duration>,
}

impl<V> TimedSlot<V>
where
    V: Clone + Send + Sync,
{
    /// Creates an empty slot. `None` keeps values until replaced.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    pub async fn get(&self) -> Option<V> {
        let mut slot = self.inner.lock().await;
        match slot.as_ref() {
            Some(entry) if entry.expires_at.is_some_and(|at| at <= Instant::now()) => {
                debug!("Cache entry expired");
                *slot = None;
                None
            }
            Some(entry) => {
                debug!("Cache HIT");
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, value: V) {
        let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
        let mut slot = self.inner.lock().await;
        debug!("Cache PUT");
        *slot = Some(SlotValue { value, expires_at });
    }
}
