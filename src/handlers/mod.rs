pub mod cart;
pub mod chat;
pub mod identity;
pub mod orders;

use actix_web::web;
use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::LineItemView;
use crate::domain::user::{Role, User};
use crate::errors::AppError;

/// Envelope of every response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: String,
}

impl From<User> for ContactResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            role: u.role,
            full_name: u.full_name,
            phone: u.phone,
            email: u.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub merchant_id: Uuid,
    pub quantity: i32,
    /// Decimal as a string, e.g. "2.50"
    pub unit_price: String,
    pub subtotal: String,
}

impl From<LineItemView> for LineItemResponse {
    fn from(l: LineItemView) -> Self {
        Self {
            subtotal: money(&l.subtotal()),
            unit_price: money(&l.unit_price),
            product_id: l.product_id,
            product_name: l.product_name,
            merchant_id: l.merchant_id,
            quantity: l.quantity,
        }
    }
}

pub(crate) fn money(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_string()
}

/// Runs a synchronous service call on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(money(&BigDecimal::from(7)), "7.00");
        assert_eq!(money(&BigDecimal::from_str("2.5").unwrap()), "2.50");
    }

    #[test]
    fn envelope_serializes_message_and_data() {
        let body = serde_json::to_value(ApiResponse::new("ok", Option::<u8>::None)).unwrap();
        assert_eq!(body, serde_json::json!({"message": "ok", "data": null}));
    }
}
