//! `hazellab-core`: storefront foundation building blocks.
//!
//! This crate contains **pure** primitives shared by every other crate
//! (no HTTP, no storage).

pub mod entity;
pub mod error;
pub mod fields;
pub mod id;
pub mod listing;

pub use entity::{Entity, remove_by_id};
pub use error::{DomainError, DomainResult};
pub use fields::FieldErrors;
pub use id::{CartItemId, CategoryId, ProductId, ReceiptId, UserId};
pub use listing::{ADMIN_PAGE_SIZE, Page, contains_ci, paginate};
