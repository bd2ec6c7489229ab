use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Account role, as assigned by the backend.
///
/// Closed set: UI gating goes through the capability table
/// ([`crate::authorize`]), never through string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Role {
    /// Storefront customer.
    #[default]
    Cliente,
    /// Sales staff: can edit users/products and see sales.
    Vendedor,
    /// Back-office administrator.
    Administrador,
    /// Full access, including deletions.
    SuperAdmin,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::Cliente, Role::Vendedor, Role::Administrador, Role::SuperAdmin];

    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cliente => "cliente",
            Role::Vendedor => "vendedor",
            Role::Administrador => "administrador",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Parse, falling back to [`Role::Cliente`] for missing or unrecognized
    /// values (least privilege).
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::parse::<Role>) {
            Some(Ok(role)) => role,
            Some(Err(err)) => {
                tracing::warn!(%err, "treating unrecognized role as cliente");
                Role::Cliente
            }
            None => Role::Cliente,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive; also accepts the legacy aliases `admin`, `user`
    /// and `usuario`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cliente" | "user" | "usuario" => Ok(Role::Cliente),
            "vendedor" => Ok(Role::Vendedor),
            "administrador" | "admin" => Ok(Role::Administrador),
            "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Role::parse_lenient(raw.as_deref()))
    }
}
