use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{CartView, LineItemView};
use crate::domain::ports::{CartRepository, UserDirectory};

use super::authenticate;

pub struct CartService<U, C> {
    users: U,
    carts: C,
}

fn ensure_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity < 1 {
        return Err(DomainError::validation("quantity must be at least 1"));
    }
    Ok(())
}

impl<U: UserDirectory, C: CartRepository> CartService<U, C> {
    pub fn new(users: U, carts: C) -> Self {
        Self { users, carts }
    }

    pub fn add_line_item(
        &self,
        caller: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        ensure_quantity(quantity)?;
        let customer = authenticate(&self.users, caller)?;
        self.carts.add_line_item(customer.id, product_id, quantity)
    }

    pub fn update_line_item(
        &self,
        caller: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItemView, DomainError> {
        ensure_quantity(quantity)?;
        let customer = authenticate(&self.users, caller)?;
        self.carts
            .update_line_item(customer.id, cart_id, product_id, quantity)
    }

    pub fn remove_line_item(
        &self,
        caller: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DomainError> {
        let customer = authenticate(&self.users, caller)?;
        self.carts.remove_line_item(customer.id, cart_id, product_id)
    }

    pub fn view_open_cart(&self, caller: Uuid) -> Result<Option<CartView>, DomainError> {
        let customer = authenticate(&self.users, caller)?;
        self.carts.open_cart(customer.id)
    }
}
