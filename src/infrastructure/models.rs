use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::chat::{Attachment, AttachmentKind, Message};
use crate::domain::errors::DomainError;
use crate::domain::inventory::Product;
use crate::domain::order::{
    CartView, Delivery, DeliveryMode, Destination, LineItemView, OrderStatus,
};
use crate::domain::user::User;
use crate::schema::{cart_items, carts, messages, products, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            role: row.role.parse()?,
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub is_cart: bool,
    pub delivery_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub courier_id: Option<Uuid>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartRow {
    /// Line items can only change while the aggregate is still a cart.
    pub fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_cart {
            Ok(())
        } else {
            Err(DomainError::validation(
                "This order is already confirmed and can no longer be modified",
            ))
        }
    }

    pub fn order_status(&self) -> Result<OrderStatus, DomainError> {
        self.status
            .as_deref()
            .ok_or_else(|| DomainError::Internal(format!("order {} has no status", self.id)))?
            .parse()
    }

    pub fn delivery(&self) -> Result<Delivery, DomainError> {
        let mode: DeliveryMode = self
            .delivery_mode
            .as_deref()
            .ok_or_else(|| {
                DomainError::Internal(format!("order {} has no delivery mode", self.id))
            })?
            .parse()?;
        match mode {
            DeliveryMode::Pickup => Ok(Delivery::Pickup),
            DeliveryMode::Delivery => match (
                &self.delivery_address,
                self.delivery_latitude,
                self.delivery_longitude,
            ) {
                (Some(address), Some(latitude), Some(longitude)) => {
                    Ok(Delivery::Delivery(Destination {
                        address: address.clone(),
                        latitude,
                        longitude,
                    }))
                }
                _ => Err(DomainError::Internal(format!(
                    "delivery order {} has no destination",
                    self.id
                ))),
            },
        }
    }

    pub fn into_cart_view(self, lines: Vec<LineItemView>) -> CartView {
        CartView {
            id: self.id,
            customer_id: self.customer_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lines,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub is_cart: bool,
    pub delivery_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub status: Option<String>,
}

impl NewCartRow {
    pub fn open_cart(customer_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            is_cart: true,
            delivery_mode: None,
            delivery_address: None,
            delivery_latitude: None,
            delivery_longitude: None,
            status: None,
        }
    }

    pub fn pending_order(customer_id: Uuid, delivery: &Delivery) -> Self {
        let destination = delivery.destination();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            is_cart: false,
            delivery_mode: Some(delivery.mode().as_str().to_string()),
            delivery_address: destination.map(|d| d.address.clone()),
            delivery_latitude: destination.map(|d| d.latitude),
            delivery_longitude: destination.map(|d| d.longitude),
            status: Some(OrderStatus::Pending.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: i64,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItemRow {
    pub fn into_line_item(self, product: &Product) -> LineItemView {
        LineItemView {
            product_id: self.product_id,
            product_name: product.name.clone(),
            merchant_id: product.owner_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub order_id: Option<Uuid>,
    pub body: String,
    pub attachment_url: Option<String>,
    pub attachment_kind: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageRow {
    pub fn into_message(self, sender_name: String) -> Result<Message, DomainError> {
        let attachment = match (self.attachment_url, self.attachment_kind) {
            (Some(url), Some(kind)) => Some(Attachment {
                url,
                kind: kind.parse()?,
            }),
            (Some(url), None) => Some(Attachment {
                url,
                kind: AttachmentKind::Receipt,
            }),
            (None, _) => None,
        };
        Ok(Message {
            id: self.id,
            sender_id: self.sender_id,
            sender_name,
            recipient_id: self.recipient_id,
            order_id: self.order_id,
            body: self.body,
            attachment,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub order_id: Option<Uuid>,
    pub body: String,
    pub attachment_url: Option<String>,
    pub attachment_kind: Option<String>,
}
