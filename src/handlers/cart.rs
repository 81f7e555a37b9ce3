use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::CartView;
use crate::errors::AppError;
use crate::AppCartService;

use super::identity::CallerId;
use super::{money, run_blocking, ApiResponse, LineItemResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub lines: Vec<LineItemResponse>,
    pub item_count: usize,
    pub total: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CartView> for CartResponse {
    fn from(c: CartView) -> Self {
        Self {
            total: money(&c.total()),
            item_count: c.lines.len(),
            id: c.id,
            customer_id: c.customer_id,
            lines: c.lines.into_iter().map(LineItemResponse::from).collect(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedLineResponse {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    /// False when the product was not in the cart.
    pub removed: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /cart/{product}
///
/// Adds units of a product to the caller's open cart, creating the cart on
/// first use. Quantities accumulate and may not exceed the live stock.
#[utoipa::path(
    post,
    path = "/cart/{product}",
    params(
        ("product" = Uuid, Path, description = "Product UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Product added", body = ApiResponse<CartResponse>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 401, description = "Unknown caller"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_line_item(
    carts: web::Data<AppCartService>,
    caller: CallerId,
    path: web::Path<Uuid>,
    body: web::Json<QuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let quantity = body.into_inner().quantity;

    let cart = run_blocking(move || carts.add_line_item(caller.0, product_id, quantity)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Product added to cart",
        CartResponse::from(cart),
    )))
}

/// PUT /cart/{cart}/products/{product}
///
/// Overwrites the quantity of a line item. The price captured when the item
/// was added is kept.
#[utoipa::path(
    put,
    path = "/cart/{cart}/products/{product}",
    params(
        ("cart" = Uuid, Path, description = "Cart UUID"),
        ("product" = Uuid, Path, description = "Product UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ApiResponse<LineItemResponse>),
        (
            status = 400,
            description = "Invalid quantity, insufficient stock or cart already confirmed"
        ),
        (status = 404, description = "Cart, product or line item not found"),
    ),
    tag = "cart"
)]
pub async fn update_line_item(
    carts: web::Data<AppCartService>,
    caller: CallerId,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<QuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, product_id) = path.into_inner();
    let quantity = body.into_inner().quantity;

    let line = run_blocking(move || {
        carts.update_line_item(caller.0, cart_id, product_id, quantity)
    })
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Quantity updated",
        LineItemResponse::from(line),
    )))
}

/// DELETE /cart/{cart}/products/{product}
///
/// Removing a product that is not in the cart succeeds.
#[utoipa::path(
    delete,
    path = "/cart/{cart}/products/{product}",
    params(
        ("cart" = Uuid, Path, description = "Cart UUID"),
        ("product" = Uuid, Path, description = "Product UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (status = 200, description = "Line item removed", body = ApiResponse<RemovedLineResponse>),
        (status = 400, description = "Cart already confirmed"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "cart"
)]
pub async fn remove_line_item(
    carts: web::Data<AppCartService>,
    caller: CallerId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (cart_id, product_id) = path.into_inner();

    let removed =
        run_blocking(move || carts.remove_line_item(caller.0, cart_id, product_id)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Product removed from cart",
        RemovedLineResponse {
            cart_id,
            product_id,
            removed,
        },
    )))
}

/// GET /cart/view
#[utoipa::path(
    get,
    path = "/cart/view",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    responses(
        (
            status = 200,
            description = "The open cart, or null when there is none",
            body = ApiResponse<CartResponse>
        ),
        (status = 401, description = "Unknown caller"),
    ),
    tag = "cart"
)]
pub async fn view_open_cart(
    carts: web::Data<AppCartService>,
    caller: CallerId,
) -> Result<HttpResponse, AppError> {
    let cart = run_blocking(move || carts.view_open_cart(caller.0)).await?;

    let response = match cart {
        Some(cart) => ApiResponse::new("Cart", Some(CartResponse::from(cart))),
        None => ApiResponse::new("Cart is empty", None),
    };
    Ok(HttpResponse::Ok().json(response))
}
