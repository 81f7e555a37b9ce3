use std::collections::HashMap;

use uuid::Uuid;

use super::chat::{Message, NewMessage};
use super::errors::DomainError;
use super::order::{CartView, Checkout, LineItemView, OrderScope, OrderStatus, OrderView};
use super::user::User;

#[cfg_attr(test, mockall::automock)]
pub trait UserDirectory: Send + Sync + 'static {
    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait CartRepository: Send + Sync + 'static {
    fn open_cart(&self, customer_id: Uuid) -> Result<Option<CartView>, DomainError>;

    /// Adds `quantity` units to the customer's open cart, creating the cart
    /// when it does not exist yet.
    fn add_line_item(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError>;

    fn update_line_item(
        &self,
        customer_id: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItemView, DomainError>;

    /// Returns whether a line item was actually removed.
    fn remove_line_item(
        &self,
        customer_id: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait OrderRepository: Send + Sync + 'static {
    /// Confirmed orders only; open carts are never returned.
    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;

    /// Replaces the customer's open cart with a new `pending` order and takes
    /// the ordered units out of stock, all in one transaction.
    fn confirm_order(&self, customer_id: Uuid, checkout: Checkout)
        -> Result<OrderView, DomainError>;

    fn list_orders(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError>;

    /// Sets `to` only if the order is still in `from`.
    fn transition(&self, id: Uuid, from: OrderStatus, to: OrderStatus)
        -> Result<bool, DomainError>;

    /// Assigns a courier to a non-terminal delivery order.
    fn assign_courier(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError>;

    /// Takes an unassigned, ready delivery order for the courier.
    fn claim(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait MessageRepository: Send + Sync + 'static {
    fn insert(&self, message: NewMessage) -> Result<Message, DomainError>;

    /// Persisted messages of an order, oldest first.
    fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Message>, DomainError>;

    fn latest_for_orders(&self, order_ids: &[Uuid])
        -> Result<HashMap<Uuid, Message>, DomainError>;
}
