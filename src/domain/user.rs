use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Customer,
    Merchant,
    Courier,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
            Role::Merchant => "merchant",
            Role::Courier => "courier",
        }
    }

    /// Merchants and admins run the store side of the order lifecycle.
    pub fn can_manage_orders(self) -> bool {
        matches!(self, Role::Admin | Role::Merchant)
    }

    pub fn is_courier(self) -> bool {
        self == Role::Courier
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            "merchant" => Ok(Role::Merchant),
            "courier" => Ok(Role::Courier),
            other => Err(DomainError::Internal(format!("unknown role '{other}'"))),
        }
    }
}

/// A user as seen through the directory: identity, role and contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: String,
}
