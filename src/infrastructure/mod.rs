pub mod cart_repo;
pub mod inventory;
pub mod message_repo;
pub mod models;
pub mod order_repo;
pub mod user_repo;
mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use cart_repo::DieselCartRepository;
pub use message_repo::DieselMessageRepository;
pub use order_repo::DieselOrderRepository;
pub use user_repo::DieselUserDirectory;

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
