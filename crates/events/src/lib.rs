//! Change notifications between independently mounted storefront views.

pub mod bus;
pub mod in_memory_bus;
pub mod signal;

pub use bus::{EventBus, Mailbox, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use signal::{Signal, notify};
