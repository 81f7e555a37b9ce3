use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    InsufficientStock {
        message: String,
        product_id: Uuid,
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::Validation(_) | DomainError::InvalidTransition { .. } => {
                AppError::BadRequest(message)
            }
            DomainError::Unauthenticated => AppError::Unauthenticated,
            DomainError::Forbidden(_) | DomainError::InvalidRole(_) => AppError::Forbidden(message),
            DomainError::NotFound(_) => AppError::NotFound(message),
            DomainError::Conflict(_) => AppError::Conflict(message),
            DomainError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            } => AppError::InsufficientStock {
                message,
                product_id,
                product: product_name,
                available,
                requested,
            },
            DomainError::Internal(detail) => AppError::Internal(detail),
        }
    }
}

impl AppError {
    fn details(&self) -> Value {
        match self {
            AppError::InsufficientStock {
                product_id,
                product,
                available,
                requested,
                ..
            } => json!({
                "product_id": product_id,
                "product": product,
                "available": available,
                "requested": requested,
            }),
            _ => Value::Null,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("request failed: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "message": message,
            "data": self.details(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    use super::*;
    use crate::domain::order::OrderStatus;

    async fn body_of(err: AppError) -> Value {
        let bytes = to_bytes(err.error_response().into_body())
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                DomainError::InvalidTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Delivered,
                },
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::InvalidRole("not a courier".into()), StatusCode::FORBIDDEN),
            (DomainError::NotFound("Order"), StatusCode::NOT_FOUND),
            (DomainError::conflict("taken"), StatusCode::CONFLICT),
            (DomainError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (domain, status) in cases {
            let label = domain.to_string();
            assert_eq!(AppError::from(domain).status_code(), status, "{label}");
        }
    }

    #[actix_web::test]
    async fn insufficient_stock_carries_details() {
        let product_id = Uuid::new_v4();
        let err = AppError::from(DomainError::InsufficientStock {
            product_id,
            product_name: "Arepa".to_string(),
            available: 2,
            requested: 5,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = body_of(err).await;
        assert_eq!(body["data"]["available"], 2);
        assert_eq!(body["data"]["requested"], 5);
        assert_eq!(body["data"]["product"], "Arepa");
        assert_eq!(body["data"]["product_id"], product_id.to_string());
        assert!(body["message"].as_str().unwrap().contains("2 units available"));
    }

    #[actix_web::test]
    async fn internal_detail_is_not_leaked() {
        let body = body_of(AppError::Internal("connection refused".to_string())).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(body["data"].is_null());
    }

    #[actix_web::test]
    async fn not_found_names_the_entity() {
        let body = body_of(DomainError::NotFound("Order").into()).await;
        assert_eq!(body["message"], "Order not found");
    }
}
