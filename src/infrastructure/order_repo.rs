use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Checkout, DeliveryMode, OrderScope, OrderStatus, OrderView};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, carts, products};

use super::inventory::{lock_products, take_stock};
use super::models::{CartRow, NewCartItemRow, NewCartRow};
use super::views::load_order_views;

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn statuses(list: &[OrderStatus]) -> Vec<&'static str> {
    list.iter().map(|s| s.as_str()).collect()
}

impl OrderRepository for DieselOrderRepository {
    fn find_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = carts::table
            .find(id)
            .filter(carts::is_cart.eq(false))
            .select(CartRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(load_order_views(&mut conn, vec![row])?.pop())
    }

    fn confirm_order(
        &self,
        customer_id: Uuid,
        checkout: Checkout,
    ) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Whatever was in the open cart is superseded by this checkout.
            let open_cart: Option<Uuid> = carts::table
                .filter(carts::customer_id.eq(customer_id))
                .filter(carts::is_cart.eq(true))
                .select(carts::id)
                .for_update()
                .first(conn)
                .optional()?;
            if let Some(cart_id) = open_cart {
                diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
                    .execute(conn)?;
                diesel::delete(carts::table.find(cart_id)).execute(conn)?;
            }

            // 2. The order itself.
            let order = diesel::insert_into(carts::table)
                .values(&NewCartRow::pending_order(customer_id, checkout.delivery()))
                .returning(CartRow::as_returning())
                .get_result(conn)?;

            // 3. Stock and line items; any failure rolls back everything above.
            // Locks are taken in id order, lines are still stored as submitted.
            let product_ids: Vec<Uuid> = checkout.lines().iter().map(|l| l.product_id).collect();
            lock_products(conn, &product_ids)?;
            let mut items = Vec::with_capacity(checkout.lines().len());
            for line in checkout.lines() {
                let product = take_stock(conn, line.product_id, line.quantity)?;
                items.push(NewCartItemRow {
                    cart_id: order.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price_for(&product)?,
                });
            }
            diesel::insert_into(cart_items::table)
                .values(&items)
                .execute(conn)?;

            load_order_views(conn, vec![order])?
                .pop()
                .ok_or_else(|| DomainError::Internal("confirmed order vanished".to_string()))
        })
    }

    fn list_orders(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let query = carts::table
            .filter(carts::is_cart.eq(false))
            .select(CartRow::as_select())
            .into_boxed();

        let query = match scope {
            OrderScope::PlacedBy(customer_id) => query
                .filter(carts::customer_id.eq(customer_id))
                .order(carts::created_at.desc()),
            OrderScope::Active => query
                .filter(carts::status.eq_any(statuses(&OrderStatus::ACTIVE)))
                .order(carts::created_at.asc()),
            OrderScope::DeliveriesOf(courier_id) => query
                .filter(carts::courier_id.eq(courier_id))
                .filter(
                    carts::status.eq_any(statuses(&[OrderStatus::Ready, OrderStatus::OnTheWay])),
                )
                .order(carts::created_at.asc()),
            OrderScope::Unclaimed => query
                .filter(carts::courier_id.is_null())
                .filter(carts::delivery_mode.eq(DeliveryMode::Delivery.as_str()))
                .filter(carts::status.eq(OrderStatus::Ready.as_str()))
                .order(carts::created_at.asc()),
            OrderScope::WithProductsOf(merchant_id) => {
                let ids: Vec<Uuid> = cart_items::table
                    .inner_join(products::table)
                    .filter(products::owner_id.eq(merchant_id))
                    .select(cart_items::cart_id)
                    .distinct()
                    .load(&mut conn)?;
                query
                    .filter(carts::id.eq_any(ids))
                    .order(carts::created_at.asc())
            }
            OrderScope::AssignedTo(courier_id) => query
                .filter(carts::courier_id.eq(courier_id))
                .order(carts::created_at.desc()),
        };

        let rows = query.load(&mut conn)?;
        load_order_views(&mut conn, rows)
    }

    fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            carts::table
                .find(id)
                .filter(carts::is_cart.eq(false))
                .filter(carts::status.eq(from.as_str())),
        )
        .set((
            carts::status.eq(to.as_str()),
            carts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        Ok(updated == 1)
    }

    fn assign_courier(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            carts::table
                .find(id)
                .filter(carts::is_cart.eq(false))
                .filter(carts::delivery_mode.eq(DeliveryMode::Delivery.as_str()))
                .filter(carts::status.eq_any(statuses(&OrderStatus::ACTIVE))),
        )
        .set((
            carts::courier_id.eq(courier_id),
            carts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        Ok(updated == 1)
    }

    fn claim(&self, id: Uuid, courier_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        // Compare-and-set: of several couriers racing, exactly one matches.
        let updated = diesel::update(
            carts::table
                .find(id)
                .filter(carts::is_cart.eq(false))
                .filter(carts::courier_id.is_null())
                .filter(carts::delivery_mode.eq(DeliveryMode::Delivery.as_str()))
                .filter(carts::status.eq(OrderStatus::Ready.as_str())),
        )
        .set((
            carts::courier_id.eq(courier_id),
            carts::status.eq(OrderStatus::OnTheWay.as_str()),
            carts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;
        Ok(updated == 1)
    }
}
