//! `hazellab-client`: the storefront's client runtime.
//!
//! Wires the pure crates (validation, auth, products, sales) to the backend:
//! - `api`: typed REST calls with bearer auth and 401 handling
//! - `session`: persisted token + user, observable through the signal bus
//! - `storefront`: login, cart, checkout and admin flows
//! - `views`: fetch guards and derived view state

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod storefront;
pub mod views;

pub use api::{FALLBACK_REGIONS, REQUEST_ID_HEADER, RestClient};
pub use config::{ClientConfig, ConfigArgs, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, ClientResult};
pub use session::{SessionStore, SignalBus};
pub use storefront::{CheckoutOutcome, Storefront};
pub use views::{CartBadge, CartView, DashboardSummary, FetchOnce};
