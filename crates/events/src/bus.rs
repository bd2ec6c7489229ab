//! Publish/notify abstraction (mechanics only).
//!
//! Independently mounted views (cart badge, checkout, admin listings) stay
//! consistent by listening for named signals: after a mutating action the
//! actor publishes a signal, and every interested view re-fetches what it
//! shows. The bus only distributes; it holds no state of its own.
//!
//! Delivery is best-effort broadcast:
//!
//! - every live subscription receives its own copy of each message
//! - messages published before a subscription exists are not replayed
//! - a message already pending for a subscriber is not queued again (views
//!   must treat a signal as "something changed", never as a delta)

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Pending messages of one subscriber, shared with the bus.
pub type Mailbox<M> = Arc<Mutex<VecDeque<M>>>;

/// A subscription to a bus.
///
/// ```ignore
/// let signals = bus.subscribe();
/// // ... later, when the view gets a chance to run:
/// if signals.drain().iter().any(|s| *s == Signal::CartUpdated) {
///     badge.refresh(&client).await?;
/// }
/// ```
///
/// Subscriptions are consumed by one owner; dropping it unsubscribes (the bus
/// prunes it on the next publish).
#[derive(Debug)]
pub struct Subscription<M> {
    mailbox: Mailbox<M>,
}

impl<M> Subscription<M> {
    pub fn new(mailbox: Mailbox<M>) -> Self {
        Self { mailbox }
    }

    /// Oldest pending message, if any.
    pub fn try_recv(&self) -> Option<M> {
        self.lock().pop_front()
    }

    /// Everything queued right now, oldest first, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned mailbox still holds a valid queue.
    fn lock(&self) -> MutexGuard<'_, VecDeque<M>> {
        self.mailbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Broadcast bus.
///
/// `publish` may fail (e.g. a poisoned lock); callers log and carry on, since
/// a missed signal only means a view shows stale data until its next refresh.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
