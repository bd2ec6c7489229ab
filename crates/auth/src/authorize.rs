//! Capability table and authorization checks.
//!
//! - No IO
//! - No panics
//! - One static table; every UI gate and admin client call asks it

use serde::Serialize;
use thiserror::Error;

use crate::{Capability, Role};

use crate::permissions::Capability::*;

const CLIENTE: &[Capability] = &[
    BrowseCatalog,
    ManageOwnCart,
    Checkout,
    ViewOwnReceipts,
    EditOwnProfile,
];

const VENDEDOR: &[Capability] = &[
    BrowseCatalog,
    ManageOwnCart,
    Checkout,
    ViewOwnReceipts,
    EditOwnProfile,
    ViewUsers,
    EditUsers,
    ViewProducts,
    EditProducts,
    ViewSales,
];

const ADMINISTRADOR: &[Capability] = &[
    BrowseCatalog,
    ManageOwnCart,
    Checkout,
    ViewOwnReceipts,
    EditOwnProfile,
    AccessAdminPanel,
    ViewUsers,
    CreateUsers,
    EditUsers,
    ViewProducts,
    CreateProducts,
    EditProducts,
    ViewSales,
    ManageReceipts,
];

const SUPER_ADMIN: &[Capability] = &Capability::ALL;

impl Role {
    /// Capabilities granted to this role.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Cliente => CLIENTE,
            Role::Vendedor => VENDEDOR,
            Role::Administrador => ADMINISTRADOR,
            Role::SuperAdmin => SUPER_ADMIN,
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Cliente => "Storefront customer: catalog, own cart, checkout and receipts",
            Role::Vendedor => "Sales staff: edit users and products, view sales history",
            Role::Administrador => "Back-office administrator: create users and products, manage receipts",
            Role::SuperAdmin => "Full access, including deleting users and products",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not logged in")]
    Unauthenticated,

    #[error("forbidden: role '{role}' lacks '{capability}'")]
    Forbidden { role: Role, capability: Capability },
}

/// Check `capability` against the role's table entry.
pub fn authorize(role: Role, capability: Capability) -> Result<(), AuthzError> {
    if role.can(capability) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { role, capability })
    }
}

/// Same as [`authorize`] for a possibly anonymous visitor.
pub fn authorize_optional(role: Option<Role>, capability: Capability) -> Result<(), AuthzError> {
    match role {
        Some(role) => authorize(role, capability),
        // Anonymous visitors may only browse.
        None if capability == BrowseCatalog => Ok(()),
        None => Err(AuthzError::Unauthenticated),
    }
}

/// Where a user lands right after logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Landing {
    Storefront,
    AdminPanel,
}

impl Landing {
    pub fn path(&self) -> &'static str {
        match self {
            Landing::Storefront => "/",
            Landing::AdminPanel => "/admin",
        }
    }
}

pub fn landing(role: Role) -> Landing {
    if role.can(AccessAdminPanel) {
        Landing::AdminPanel
    } else {
        Landing::Storefront
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (audit / display)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a role was (or would be) allowed or denied a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub role: Role,
    pub capability: Capability,
    pub granted: bool,
    pub reason: String,
    /// Roles that do hold the capability (empty when granted).
    pub granting_roles: Vec<Role>,
}

pub fn explain_authorization(role: Role, capability: Capability) -> AuthorizationExplanation {
    if role.can(capability) {
        return AuthorizationExplanation {
            role,
            capability,
            granted: true,
            reason: format!("role '{role}' grants '{capability}'"),
            granting_roles: Vec::new(),
        };
    }

    let granting_roles: Vec<Role> = Role::ALL.into_iter().filter(|r| r.can(capability)).collect();
    let names: Vec<&str> = granting_roles.iter().map(Role::as_str).collect();

    AuthorizationExplanation {
        role,
        capability,
        granted: false,
        reason: format!(
            "role '{role}' lacks '{capability}'; granted to: {}",
            names.join(", ")
        ),
        granting_roles,
    }
}

/// One row of the capability matrix.
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub description: &'static str,
    pub capabilities: Vec<Capability>,
}

/// The whole table, for display (e.g. an admin "who can do what" page).
pub fn capability_matrix() -> Vec<RoleDefinition> {
    Role::ALL
        .into_iter()
        .map(|role| RoleDefinition {
            role,
            description: role.description(),
            capabilities: role.capabilities().to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cliente_can_shop_but_not_administer() {
        assert!(authorize(Role::Cliente, Checkout).is_ok());
        assert_eq!(
            authorize(Role::Cliente, ViewUsers),
            Err(AuthzError::Forbidden {
                role: Role::Cliente,
                capability: ViewUsers
            })
        );
    }

    #[test]
    fn vendedor_edits_but_cannot_create_or_delete() {
        assert!(Role::Vendedor.can(EditProducts));
        assert!(Role::Vendedor.can(EditUsers));
        assert!(!Role::Vendedor.can(CreateUsers));
        assert!(!Role::Vendedor.can(DeleteProducts));
    }

    #[test]
    fn only_super_admin_deletes() {
        for role in Role::ALL {
            assert_eq!(role.can(DeleteUsers), role == Role::SuperAdmin, "{role}");
            assert_eq!(role.can(DeleteProducts), role == Role::SuperAdmin, "{role}");
        }
    }

    #[test]
    fn capability_sets_grow_with_rank() {
        for pair in Role::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            for cap in lower.capabilities() {
                assert!(higher.can(*cap), "{higher} should include {cap} from {lower}");
            }
        }
    }

    #[test]
    fn landing_follows_admin_panel_capability() {
        assert_eq!(landing(Role::Cliente), Landing::Storefront);
        assert_eq!(landing(Role::Vendedor), Landing::Storefront);
        assert_eq!(landing(Role::Administrador).path(), "/admin");
        assert_eq!(landing(Role::SuperAdmin), Landing::AdminPanel);
    }

    #[test]
    fn anonymous_visitors_only_browse() {
        assert!(authorize_optional(None, BrowseCatalog).is_ok());
        assert_eq!(
            authorize_optional(None, ManageOwnCart),
            Err(AuthzError::Unauthenticated)
        );
    }

    #[test]
    fn explanation_lists_granting_roles() {
        let denied = explain_authorization(Role::Vendedor, DeleteUsers);
        assert!(!denied.granted);
        assert_eq!(denied.granting_roles, vec![Role::SuperAdmin]);

        let granted = explain_authorization(Role::Administrador, ManageReceipts);
        assert!(granted.granted);
        assert!(granted.granting_roles.is_empty());
    }

    #[test]
    fn matrix_covers_every_role() {
        let matrix = capability_matrix();
        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix[3].capabilities.len(), Capability::ALL.len());
    }
}
