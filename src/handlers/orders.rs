use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    Checkout, CheckoutLine, Delivery, DeliveryMode, OrderStatus, OrderView,
};
use crate::errors::AppError;
use crate::AppOrderService;

use super::identity::CallerId;
use super::{money, run_blocking, ApiResponse, ContactResponse, LineItemResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price the client displayed, as a decimal string, e.g. "2.50". When
    /// present it must match the catalog price.
    pub unit_price: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmOrderRequest {
    pub delivery_mode: DeliveryMode,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub items: Vec<CheckoutLineRequest>,
}

impl ConfirmOrderRequest {
    fn into_checkout(self) -> Result<Checkout, DomainError> {
        let delivery = Delivery::new(
            self.delivery_mode,
            self.delivery_address,
            self.delivery_latitude,
            self.delivery_longitude,
        )?;
        let lines = self
            .items
            .into_iter()
            .map(|item| {
                let expected_unit_price = item
                    .unit_price
                    .map(|raw| {
                        BigDecimal::from_str(raw.trim()).map_err(|_| {
                            DomainError::Validation(format!("Invalid unit_price '{raw}'"))
                        })
                    })
                    .transpose()?;
                Ok::<_, DomainError>(CheckoutLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    expected_unit_price,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Checkout::new(delivery, lines)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignCourierRequest {
    pub courier_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: OrderStatus,
    pub delivery_mode: DeliveryMode,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub customer: ContactResponse,
    pub courier: Option<ContactResponse>,
    pub lines: Vec<LineItemResponse>,
    pub item_count: usize,
    pub total: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        let destination = o.delivery.destination().cloned();
        Self {
            total: money(&o.total()),
            item_count: o.lines.len(),
            id: o.id,
            status: o.status,
            delivery_mode: o.delivery.mode(),
            delivery_address: destination.as_ref().map(|d| d.address.clone()),
            delivery_latitude: destination.as_ref().map(|d| d.latitude),
            delivery_longitude: destination.as_ref().map(|d| d.longitude),
            customer: o.customer.into(),
            courier: o.courier.map(ContactResponse::from),
            lines: o.lines.into_iter().map(LineItemResponse::from).collect(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

fn listing(message: &str, orders: Vec<OrderView>) -> HttpResponse {
    let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    HttpResponse::Ok().json(ApiResponse::new(message, orders))
}

fn single(message: impl Into<String>, order: OrderView) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::new(message, OrderResponse::from(order)))
}

// ── Checkout ─────────────────────────────────────────────────────────────────

/// POST /cart/crear-pedido
///
/// Confirms an order from the submitted line items. The caller's open cart is
/// discarded and stock is taken in the same transaction; if any product is
/// short, nothing changes.
#[utoipa::path(
    post,
    path = "/cart/crear-pedido",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    request_body = ConfirmOrderRequest,
    responses(
        (status = 201, description = "Order confirmed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request, stale price or insufficient stock"),
        (status = 401, description = "Unknown caller"),
        (status = 404, description = "Product not found"),
    ),
    tag = "orders"
)]
pub async fn confirm_order(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
    body: web::Json<ConfirmOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();

    let order =
        run_blocking(move || orders.confirm_order(caller.0, || request.into_checkout())).await?;

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Order confirmed",
        OrderResponse::from(order),
    )))
}

// ── Listings ─────────────────────────────────────────────────────────────────

/// GET /cart/mis-pedidos
#[utoipa::path(
    get,
    path = "/cart/mis-pedidos",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    responses(
        (
            status = 200,
            description = "Caller's orders, newest first",
            body = ApiResponse<Vec<OrderResponse>>
        ),
        (status = 401, description = "Unknown caller"),
    ),
    tag = "orders"
)]
pub async fn my_orders(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
) -> Result<HttpResponse, AppError> {
    let found = run_blocking(move || orders.my_orders(caller.0)).await?;
    Ok(listing("Your orders", found))
}

/// GET /cart/pedidos-tienda
#[utoipa::path(
    get,
    path = "/cart/pedidos-tienda",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    responses(
        (
            status = 200,
            description = "Active orders, oldest first",
            body = ApiResponse<Vec<OrderResponse>>
        ),
        (status = 403, description = "Caller is not a merchant or admin"),
    ),
    tag = "orders"
)]
pub async fn store_orders(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
) -> Result<HttpResponse, AppError> {
    let found = run_blocking(move || orders.store_orders(caller.0)).await?;
    Ok(listing("Active store orders", found))
}

/// GET /cart/mis-entregas
#[utoipa::path(
    get,
    path = "/cart/mis-entregas",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    responses(
        (
            status = 200,
            description = "Deliveries assigned to the caller",
            body = ApiResponse<Vec<OrderResponse>>
        ),
        (status = 403, description = "Caller is not a courier"),
    ),
    tag = "orders"
)]
pub async fn my_deliveries(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
) -> Result<HttpResponse, AppError> {
    let found = run_blocking(move || orders.my_deliveries(caller.0)).await?;
    Ok(listing("Your deliveries", found))
}

/// GET /cart/pedidos-disponibles
#[utoipa::path(
    get,
    path = "/cart/pedidos-disponibles",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    responses(
        (
            status = 200,
            description = "Ready delivery orders without a courier",
            body = ApiResponse<Vec<OrderResponse>>
        ),
        (status = 403, description = "Caller is not a courier"),
    ),
    tag = "orders"
)]
pub async fn available_orders(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
) -> Result<HttpResponse, AppError> {
    let found = run_blocking(move || orders.available_orders(caller.0)).await?;
    Ok(listing("Orders available for delivery", found))
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// PUT /cart/{cart}/estado
#[utoipa::path(
    put,
    path = "/cart/{cart}/estado",
    params(
        ("cart" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller is not a merchant or admin"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order changed concurrently"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;

    let order = run_blocking(move || orders.update_status(caller.0, order_id, status)).await?;

    Ok(single(format!("Status updated to {status}"), order))
}

/// PUT /cart/{cart}/asignar-domiciliario
#[utoipa::path(
    put,
    path = "/cart/{cart}/asignar-domiciliario",
    params(
        ("cart" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = AssignCourierRequest,
    responses(
        (status = 200, description = "Courier assigned", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Not a delivery order, or already finished"),
        (status = 403, description = "Caller is not staff, or target is not a courier"),
        (status = 404, description = "Order or courier not found"),
    ),
    tag = "orders"
)]
pub async fn assign_courier(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
    path: web::Path<Uuid>,
    body: web::Json<AssignCourierRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let courier_id = body.into_inner().courier_id;

    let order =
        run_blocking(move || orders.assign_courier(caller.0, order_id, courier_id)).await?;

    Ok(single("Courier assigned", order))
}

/// PUT /cart/{cart}/tomar-pedido
///
/// A courier takes a ready delivery order. When several couriers race for
/// the same order exactly one succeeds; the others get 409.
#[utoipa::path(
    put,
    path = "/cart/{cart}/tomar-pedido",
    params(
        ("cart" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (
            status = 200,
            description = "Order taken, now en_camino",
            body = ApiResponse<OrderResponse>
        ),
        (status = 400, description = "Not a delivery order, or not ready"),
        (status = 403, description = "Caller is not a courier"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Already taken by a courier"),
    ),
    tag = "orders"
)]
pub async fn claim_order(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = run_blocking(move || orders.claim_order(caller.0, order_id)).await?;
    Ok(single("Order taken", order))
}

/// PUT /cart/{cart}/marcar-entregado
#[utoipa::path(
    put,
    path = "/cart/{cart}/marcar-entregado",
    params(
        ("cart" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (status = 200, description = "Order delivered", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Not a delivery order, or wrong status"),
        (status = 403, description = "Order is not assigned to the caller"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn mark_delivered(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = run_blocking(move || orders.mark_delivered(caller.0, order_id)).await?;
    Ok(single("Order marked as delivered", order))
}

/// PUT /cart/{cart}/marcar-recogido
#[utoipa::path(
    put,
    path = "/cart/{cart}/marcar-recogido",
    params(
        ("cart" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (status = 200, description = "Order picked up", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Not a pickup order, or not ready"),
        (status = 403, description = "Caller is not the customer"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn mark_picked_up(
    orders: web::Data<AppOrderService>,
    caller: CallerId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = run_blocking(move || orders.mark_picked_up(caller.0, order_id)).await?;
    Ok(single("Order marked as picked up", order))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(value: serde_json::Value) -> ConfirmOrderRequest {
        serde_json::from_value(value).expect("valid request JSON")
    }

    #[test]
    fn pickup_request_ignores_address_fields() {
        let checkout = request(json!({
            "delivery_mode": "pickup",
            "delivery_address": "ignored",
            "items": [{"product_id": Uuid::new_v4(), "quantity": 2, "unit_price": "2.50"}]
        }))
        .into_checkout()
        .unwrap();
        assert_eq!(checkout.delivery(), &Delivery::Pickup);
        assert_eq!(
            checkout.lines()[0].expected_unit_price,
            Some(BigDecimal::from_str("2.50").unwrap())
        );
    }

    #[test]
    fn delivery_request_needs_coordinates() {
        let result = request(json!({
            "delivery_mode": "delivery",
            "delivery_address": "Calle 1",
            "items": [{"product_id": Uuid::new_v4(), "quantity": 1}]
        }))
        .into_checkout();
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn malformed_price_is_a_validation_error() {
        let result = request(json!({
            "delivery_mode": "pickup",
            "items": [{"product_id": Uuid::new_v4(), "quantity": 1, "unit_price": "two"}]
        }))
        .into_checkout();
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn statuses_use_wire_names() {
        let body: UpdateStatusRequest =
            serde_json::from_value(json!({"status": "en_preparacion"})).unwrap();
        assert_eq!(body.status, OrderStatus::Preparing);
    }
}
