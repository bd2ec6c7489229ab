use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Something a role may do in the storefront or back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    BrowseCatalog,
    ManageOwnCart,
    Checkout,
    ViewOwnReceipts,
    EditOwnProfile,
    AccessAdminPanel,
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,
    ViewProducts,
    CreateProducts,
    EditProducts,
    DeleteProducts,
    ViewSales,
    /// Void receipts and change their status.
    ManageReceipts,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::BrowseCatalog,
        Capability::ManageOwnCart,
        Capability::Checkout,
        Capability::ViewOwnReceipts,
        Capability::EditOwnProfile,
        Capability::AccessAdminPanel,
        Capability::ViewUsers,
        Capability::CreateUsers,
        Capability::EditUsers,
        Capability::DeleteUsers,
        Capability::ViewProducts,
        Capability::CreateProducts,
        Capability::EditProducts,
        Capability::DeleteProducts,
        Capability::ViewSales,
        Capability::ManageReceipts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::BrowseCatalog => "browse_catalog",
            Capability::ManageOwnCart => "manage_own_cart",
            Capability::Checkout => "checkout",
            Capability::ViewOwnReceipts => "view_own_receipts",
            Capability::EditOwnProfile => "edit_own_profile",
            Capability::AccessAdminPanel => "access_admin_panel",
            Capability::ViewUsers => "view_users",
            Capability::CreateUsers => "create_users",
            Capability::EditUsers => "edit_users",
            Capability::DeleteUsers => "delete_users",
            Capability::ViewProducts => "view_products",
            Capability::CreateProducts => "create_products",
            Capability::EditProducts => "edit_products",
            Capability::DeleteProducts => "delete_products",
            Capability::ViewSales => "view_sales",
            Capability::ManageReceipts => "manage_receipts",
        }
    }

    /// Grouping used when listing the capability matrix.
    pub fn category(&self) -> &'static str {
        match self {
            Capability::BrowseCatalog
            | Capability::ManageOwnCart
            | Capability::Checkout
            | Capability::ViewOwnReceipts
            | Capability::EditOwnProfile => "storefront",
            Capability::AccessAdminPanel => "admin",
            Capability::ViewUsers
            | Capability::CreateUsers
            | Capability::EditUsers
            | Capability::DeleteUsers => "users",
            Capability::ViewProducts
            | Capability::CreateProducts
            | Capability::EditProducts
            | Capability::DeleteProducts => "products",
            Capability::ViewSales | Capability::ManageReceipts => "sales",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    /// Accepts the snake_case name, with `-` allowed for `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(cap.as_str().parse::<Capability>(), Ok(cap));
        }
        assert_eq!("delete-users".parse::<Capability>(), Ok(Capability::DeleteUsers));
        assert!("fly".parse::<Capability>().is_err());
    }
}
