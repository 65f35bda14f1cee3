//! Inbox channels and the dispatch-only capability.

use super::error::StoreError;
use super::stats::Counters;
use crate::core::Action;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendError, TrySendError};
use tracing::trace;

/// Sending half of a store's inbox.
pub(crate) enum Inbox<A> {
    Unbounded(mpsc::UnboundedSender<A>),
    Bounded(mpsc::Sender<A>),
}

/// Receiving half, owned by the worker.
pub(crate) enum Outbox<A> {
    Unbounded(mpsc::UnboundedReceiver<A>),
    Bounded(mpsc::Receiver<A>),
}

enum WeakInbox<A> {
    Unbounded(mpsc::WeakUnboundedSender<A>),
    Bounded(mpsc::WeakSender<A>),
}

pub(crate) fn inbox<A>(capacity: Option<usize>) -> (Inbox<A>, Outbox<A>) {
    match capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity);
            (Inbox::Bounded(tx), Outbox::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Inbox::Unbounded(tx), Outbox::Unbounded(rx))
        }
    }
}

impl<A> Inbox<A> {
    /// Enqueue without waiting.
    pub(crate) fn send(&self, action: A) -> Result<(), StoreError> {
        match self {
            Inbox::Unbounded(tx) => tx.send(action).map_err(|SendError(_)| StoreError::Closed),
            Inbox::Bounded(tx) => tx.try_send(action).map_err(|e| match e {
                TrySendError::Full(_) => StoreError::QueueFull {
                    capacity: tx.max_capacity(),
                },
                TrySendError::Closed(_) => StoreError::Closed,
            }),
        }
    }

    fn downgrade(&self) -> WeakInbox<A> {
        match self {
            Inbox::Unbounded(tx) => WeakInbox::Unbounded(tx.downgrade()),
            Inbox::Bounded(tx) => WeakInbox::Bounded(tx.downgrade()),
        }
    }
}

impl<A> Clone for Inbox<A> {
    fn clone(&self) -> Self {
        match self {
            Inbox::Unbounded(tx) => Inbox::Unbounded(tx.clone()),
            Inbox::Bounded(tx) => Inbox::Bounded(tx.clone()),
        }
    }
}

impl<A> WeakInbox<A> {
    fn upgrade(&self) -> Option<Inbox<A>> {
        match self {
            WeakInbox::Unbounded(tx) => tx.upgrade().map(Inbox::Unbounded),
            WeakInbox::Bounded(tx) => tx.upgrade().map(Inbox::Bounded),
        }
    }
}

impl<A> Clone for WeakInbox<A> {
    fn clone(&self) -> Self {
        match self {
            WeakInbox::Unbounded(tx) => WeakInbox::Unbounded(tx.clone()),
            WeakInbox::Bounded(tx) => WeakInbox::Bounded(tx.clone()),
        }
    }
}

impl<A> Outbox<A> {
    pub(crate) async fn recv(&mut self) -> Option<A> {
        match self {
            Outbox::Unbounded(rx) => rx.recv().await,
            Outbox::Bounded(rx) => rx.recv().await,
        }
    }
}

/// Dispatch-only handle to a store.
///
/// Hand this to code that performs effects and reports results back. It
/// cannot read state or subscribe, and it does not keep the store alive:
/// once every `Store` handle is dropped, dispatching returns
/// [`StoreError::Closed`].
pub struct Dispatcher<A> {
    inbox: WeakInbox<A>,
    counters: Arc<Counters>,
}

impl<A: Action> Dispatcher<A> {
    pub(crate) fn new(inbox: &Inbox<A>, counters: Arc<Counters>) -> Self {
        Self {
            inbox: inbox.downgrade(),
            counters,
        }
    }

    /// Enqueue `action` and return immediately.
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        let inbox = self.inbox.upgrade().ok_or(StoreError::Closed)?;
        send(&inbox, &self.counters, action)
    }

    /// Whether the store behind this handle is gone.
    pub fn is_closed(&self) -> bool {
        self.inbox.upgrade().is_none()
    }
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            inbox: self.inbox.clone(),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<A> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

pub(crate) fn send<A: Action>(
    inbox: &Inbox<A>,
    counters: &Counters,
    action: A,
) -> Result<(), StoreError> {
    trace!(?action, "enqueue");
    inbox.send(action)?;
    counters.record_accepted();
    Ok(())
}
