//! In-process bus: one coalescing mailbox per subscriber.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use thiserror::Error;

use crate::bus::{EventBus, Mailbox, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// The subscriber list lock was poisoned.
    #[error("bus lock poisoned")]
    Poisoned,
}

/// In-memory fan-out bus.
///
/// Messages mean "this changed", so a mailbox never holds the same message
/// twice: publishing `CartUpdated` three times before a view drains yields
/// one pending `CartUpdated`. Mailboxes whose subscription was dropped are
/// pruned on publish.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    mailboxes: Mutex<Vec<Weak<Mutex<VecDeque<M>>>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            mailboxes: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + PartialEq + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut mailboxes = self.mailboxes.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        mailboxes.retain(|weak| {
            let Some(mailbox) = weak.upgrade() else {
                return false;
            };
            let mut pending = mailbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if !pending.contains(&message) {
                pending.push_back(message.clone());
            }
            true
        });

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let mailbox: Mailbox<M> = Arc::new(Mutex::new(VecDeque::new()));

        // On a poisoned lock the subscription is still returned; it simply
        // never receives anything.
        if let Ok(mut mailboxes) = self.mailboxes.lock() {
            mailboxes.push(Arc::downgrade(&mailbox));
        }

        Subscription::new(mailbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signal;

    fn live(bus: &InMemoryEventBus<Signal>) -> usize {
        bus.mailboxes.lock().unwrap().len()
    }

    #[test]
    fn every_subscriber_gets_a_copy() {
        let bus = InMemoryEventBus::new();
        let badge = bus.subscribe();
        let checkout = bus.subscribe();

        bus.publish(Signal::CartUpdated).unwrap();

        assert_eq!(badge.drain(), vec![Signal::CartUpdated]);
        assert_eq!(checkout.drain(), vec![Signal::CartUpdated]);
    }

    #[test]
    fn late_subscribers_miss_earlier_signals() {
        let bus = InMemoryEventBus::new();
        bus.publish(Signal::SessionChanged).unwrap();

        let late = bus.subscribe();
        assert!(late.is_empty());
    }

    #[test]
    fn repeated_signals_coalesce_until_drained() {
        let bus = InMemoryEventBus::new();
        let badge = bus.subscribe();

        bus.publish(Signal::CartUpdated).unwrap();
        bus.publish(Signal::SessionChanged).unwrap();
        bus.publish(Signal::CartUpdated).unwrap();

        assert_eq!(badge.drain(), vec![Signal::CartUpdated, Signal::SessionChanged]);

        bus.publish(Signal::CartUpdated).unwrap();
        assert_eq!(badge.try_recv(), Some(Signal::CartUpdated));
        assert_eq!(badge.try_recv(), None);
    }

    #[test]
    fn dropped_subscriptions_are_pruned() {
        let bus = InMemoryEventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(live(&bus), 2);

        bus.publish(Signal::SessionExpired).unwrap();

        assert_eq!(live(&bus), 1);
        assert_eq!(keep.drain(), vec![Signal::SessionExpired]);
    }
}
