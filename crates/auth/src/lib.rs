//! `hazellab-auth`: who the user is and what they may do.
//!
//! Roles, the capability table that gates every screen, the session token
//! and the user forms. No HTTP here; the client crate does the calls.

pub mod authorize;
pub mod permissions;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{
    AuthorizationExplanation, AuthzError, Landing, RoleDefinition, authorize, authorize_optional,
    capability_matrix, explain_authorization, landing,
};
pub use permissions::{Capability, UnknownCapability};
pub use roles::{Role, UnknownRole};
pub use token::{LoginRequest, LoginResponse, SessionToken};
pub use user::{
    LoginForm, NewUser, UnknownStatus, User, UserFilter, UserForm, UserRef, UserSearch,
    UserStatus, UserUpdate,
};
