use log::{info, warn};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Actor, Checkout, DeliveryMode, OrderScope, OrderStatus, OrderView};
use crate::domain::ports::{OrderRepository, UserDirectory};
use crate::domain::user::User;

use super::authenticate;

pub struct OrderService<U, R> {
    users: U,
    repo: R,
}

impl<U: UserDirectory, R: OrderRepository> OrderService<U, R> {
    pub fn new(users: U, repo: R) -> Self {
        Self { users, repo }
    }

    fn staff(&self, caller: Uuid) -> Result<User, DomainError> {
        let user = authenticate(&self.users, caller)?;
        if !user.role.can_manage_orders() {
            return Err(DomainError::forbidden(
                "Only merchants and admins can manage orders",
            ));
        }
        Ok(user)
    }

    fn courier(&self, caller: Uuid) -> Result<User, DomainError> {
        let user = authenticate(&self.users, caller)?;
        if !user.role.is_courier() {
            return Err(DomainError::forbidden("Only couriers can do this"));
        }
        Ok(user)
    }

    fn load(&self, order_id: Uuid) -> Result<OrderView, DomainError> {
        self.repo
            .find_order(order_id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    /// Writes `to` over the status `order` was read with.
    fn advance(&self, order: &OrderView, to: OrderStatus) -> Result<OrderView, DomainError> {
        if !self.repo.transition(order.id, order.status, to)? {
            return Err(DomainError::conflict(
                "The order changed while it was being updated; reload and try again",
            ));
        }
        info!("order {} moved {} -> {}", order.id, order.status, to);
        self.load(order.id)
    }

    /// The checkout is built only once the caller is known, so an unknown
    /// caller is reported before anything about the request body.
    pub fn confirm_order<F>(&self, caller: Uuid, checkout: F) -> Result<OrderView, DomainError>
    where
        F: FnOnce() -> Result<Checkout, DomainError>,
    {
        let customer = authenticate(&self.users, caller)?;
        let order = self.repo.confirm_order(customer.id, checkout()?)?;
        info!(
            "order {} confirmed by customer {} ({} line items, total {})",
            order.id,
            customer.id,
            order.lines.len(),
            order.total()
        );
        Ok(order)
    }

    pub fn my_orders(&self, caller: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let customer = authenticate(&self.users, caller)?;
        self.repo.list_orders(OrderScope::PlacedBy(customer.id))
    }

    pub fn store_orders(&self, caller: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.staff(caller)?;
        self.repo.list_orders(OrderScope::Active)
    }

    pub fn my_deliveries(&self, caller: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let courier = self.courier(caller)?;
        self.repo.list_orders(OrderScope::DeliveriesOf(courier.id))
    }

    pub fn available_orders(&self, caller: Uuid) -> Result<Vec<OrderView>, DomainError> {
        self.courier(caller)?;
        self.repo.list_orders(OrderScope::Unclaimed)
    }

    pub fn update_status(
        &self,
        caller: Uuid,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderView, DomainError> {
        self.staff(caller)?;
        let order = self.load(order_id)?;
        order.ensure_transition(status, Actor::Staff)?;
        self.advance(&order, status)
    }

    pub fn assign_courier(
        &self,
        caller: Uuid,
        order_id: Uuid,
        courier_id: Uuid,
    ) -> Result<OrderView, DomainError> {
        self.staff(caller)?;
        let order = self.load(order_id)?;
        if order.delivery.mode() != DeliveryMode::Delivery {
            return Err(DomainError::validation(
                "Couriers can only be assigned to delivery orders",
            ));
        }
        if order.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "Order is already {} and can no longer be assigned",
                order.status
            )));
        }
        let courier = self
            .users
            .find_user(courier_id)?
            .ok_or(DomainError::NotFound("Courier"))?;
        if !courier.role.is_courier() {
            return Err(DomainError::InvalidRole(
                "The selected user is not a courier".to_string(),
            ));
        }
        if !self.repo.assign_courier(order.id, courier.id)? {
            return Err(DomainError::conflict(
                "The order changed while it was being assigned; reload and try again",
            ));
        }
        info!("courier {} assigned to order {}", courier.id, order.id);
        self.load(order.id)
    }

    pub fn claim_order(&self, caller: Uuid, order_id: Uuid) -> Result<OrderView, DomainError> {
        let courier = self.courier(caller)?;
        if self.repo.claim(order_id, courier.id)? {
            info!("order {} claimed by courier {}", order_id, courier.id);
            return self.load(order_id);
        }

        // Nothing matched; read the row only to explain why.
        let order = self.load(order_id)?;
        if order.delivery.mode() != DeliveryMode::Delivery {
            return Err(DomainError::validation("This order is not a delivery order"));
        }
        if let Some(holder) = order.courier_id() {
            warn!(
                "courier {} lost order {} to courier {}",
                courier.id, order.id, holder
            );
            return Err(DomainError::conflict(
                "This order was already taken by a courier",
            ));
        }
        if order.status != OrderStatus::Ready {
            return Err(DomainError::Validation(format!(
                "Order is not ready for delivery yet. Current status: {}",
                order.status
            )));
        }
        Err(DomainError::conflict(
            "The order changed while it was being claimed; reload and try again",
        ))
    }

    pub fn mark_delivered(&self, caller: Uuid, order_id: Uuid) -> Result<OrderView, DomainError> {
        let user = authenticate(&self.users, caller)?;
        let order = self.load(order_id)?;
        if order.courier_id() != Some(user.id) {
            return Err(DomainError::forbidden("This order is not assigned to you"));
        }
        order.ensure_transition(OrderStatus::Delivered, Actor::Courier)?;
        self.advance(&order, OrderStatus::Delivered)
    }

    pub fn mark_picked_up(&self, caller: Uuid, order_id: Uuid) -> Result<OrderView, DomainError> {
        let user = authenticate(&self.users, caller)?;
        let order = self.load(order_id)?;
        if order.customer.id != user.id {
            return Err(DomainError::forbidden("Only the customer can confirm the pickup"));
        }
        order.ensure_transition(OrderStatus::PickedUp, Actor::Customer)?;
        self.advance(&order, OrderStatus::PickedUp)
    }
}
