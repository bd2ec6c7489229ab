//! Storefront-wide change notifications.

use serde::{Deserialize, Serialize};

/// Something changed; views that show it should re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Cart contents changed (item added, quantity edited, removed, checkout).
    CartUpdated,
    /// A user logged in or out.
    SessionChanged,
    /// The backend rejected the token (HTTP 401); local session was cleared.
    SessionExpired,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::CartUpdated => "cart_updated",
            Signal::SessionChanged => "session_changed",
            Signal::SessionExpired => "session_expired",
        }
    }

    /// Whether views showing per-user data (cart, profile) must reload.
    pub fn affects_session(&self) -> bool {
        matches!(self, Signal::SessionChanged | Signal::SessionExpired)
    }
}

impl core::fmt::Display for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publish `signal`, logging instead of failing: a lost signal only delays a
/// view refresh.
pub fn notify<B>(bus: &B, signal: Signal)
where
    B: crate::EventBus<Signal> + ?Sized,
{
    match bus.publish(signal) {
        Ok(()) => tracing::debug!(%signal, "signal published"),
        Err(err) => tracing::warn!(%signal, ?err, "failed to publish signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventBus, InMemoryEventBus};

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&Signal::CartUpdated).unwrap(), "\"cart_updated\"");
        assert_eq!(Signal::SessionExpired.to_string(), "session_expired");
    }

    #[test]
    fn notify_reaches_subscribers() {
        let bus = InMemoryEventBus::new();
        let sub = bus.subscribe();
        notify(&bus, Signal::SessionChanged);
        assert_eq!(sub.try_recv().unwrap(), Signal::SessionChanged);
        assert!(Signal::SessionChanged.affects_session());
        assert!(!Signal::CartUpdated.affects_session());
    }
}
