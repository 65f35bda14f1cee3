//! Subscriber registry and subscription streams.
//!
//! Each subscriber owns an unbounded channel, so the worker hands off a
//! value without waiting on the consumer. Cancellation removes the entry
//! under the registry lock: once `cancel` returns, no later fan-out can
//! reach that subscriber.

use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

struct Entry<T> {
    id: u64,
    cancelled: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<T>,
}

/// Ordered set of subscribers for one kind of notification.
pub(crate) struct Registry<T> {
    entries: Mutex<Vec<Entry<T>>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

trait Deregister: Send + Sync {
    fn remove(&self, id: u64);
}

impl<T: Send + 'static> Deregister for Registry<T> {
    fn remove(&self, id: u64) {
        self.lock().retain(|entry| entry.id != id);
    }
}

impl<T> Registry<T> {
    fn lock(&self) -> MutexGuard<'_, Vec<Entry<T>>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Registry<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Register a new subscriber that sees every value published from now on.
    pub(crate) fn subscribe(self: &Arc<Self>) -> Subscription<T> {
        self.subscribe_with(|| ()).0
    }

    /// Register a subscriber and take `snapshot` under the same lock that
    /// guards publishing.
    ///
    /// Every value published after the snapshot reaches the subscription.
    /// On a closed registry the subscription ends immediately.
    pub(crate) fn subscribe_with<R>(
        self: &Arc<Self>,
        snapshot: impl FnOnce() -> R,
    ) -> (Subscription<T>, R) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let registry: Arc<dyn Deregister> = self.clone();

        let mut entries = self.lock();
        let taken = snapshot();
        if !self.closed.load(Ordering::Acquire) {
            entries.push(Entry {
                id,
                cancelled: Arc::clone(&cancelled),
                tx,
            });
        }
        drop(entries);

        let subscription = Subscription {
            rx,
            cancel: CancelHandle {
                id,
                cancelled,
                registry: Arc::downgrade(&registry),
            },
        };
        (subscription, taken)
    }

    /// End every subscription and refuse new ones.
    pub(crate) fn close(&self) {
        let mut entries = self.lock();
        self.closed.store(true, Ordering::Release);
        entries.clear();
    }

    /// Deliver `value` to every live subscriber.
    pub(crate) fn publish(&self, value: &T) {
        self.publish_after(value, || {});
    }

    /// Run `commit`, then deliver `value`, all under the registry lock.
    ///
    /// A subscriber registering concurrently either sees the committed value
    /// or registers after it and does not.
    pub(crate) fn publish_after(&self, value: &T, commit: impl FnOnce()) {
        let mut entries = self.lock();
        commit();
        entries.retain(|entry| {
            !entry.cancelled.load(Ordering::Acquire) && entry.tx.send(value.clone()).is_ok()
        });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Cancels a [`Subscription`] from anywhere, including other threads.
#[derive(Clone)]
pub struct CancelHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
    registry: Weak<dyn Deregister>,
}

impl CancelHandle {
    /// Stop deliveries. Idempotent.
    ///
    /// After this returns, no value published later reaches the
    /// subscription. A value already being yielded concurrently may still
    /// surface once.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Stream of published values, in publish order, with no gaps.
///
/// Dropping the subscription cancels it.
///
/// # Example
///
/// ```rust
/// use statestore::core::{Reducer, Reduction};
/// use statestore::Store;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Store::new(0u32, Reducer::infallible(|n: &u32, by: u32| Reduction::new(n + by))).unwrap();
/// let mut updates = store.subscribe();
///
/// store.dispatch(2).unwrap();
/// store.dispatch(3).unwrap();
///
/// assert_eq!(updates.recv().await, Some(2));
/// assert_eq!(updates.recv().await, Some(5));
///
/// updates.cancel();
/// assert_eq!(updates.recv().await, None);
/// # }
/// ```
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
    cancel: CancelHandle,
}

impl<T> Subscription<T> {
    /// Wait for the next value. `None` once cancelled or the store is gone.
    pub async fn recv(&mut self) -> Option<T> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.rx.recv().await
    }

    /// Take the next value if one is already waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Cancel this subscription.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle that cancels this subscription from another task or thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
