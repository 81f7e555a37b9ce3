use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{CartView, LineItemView};
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, carts};

use super::inventory::find_product;
use super::models::{CartItemRow, CartRow, NewCartItemRow, NewCartRow};
use super::views::load_line_items;

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Locks the customer's cart row for the rest of the transaction.
fn lock_owned_cart(
    conn: &mut PgConnection,
    customer_id: Uuid,
    cart_id: Uuid,
) -> Result<CartRow, DomainError> {
    let cart = carts::table
        .find(cart_id)
        .filter(carts::customer_id.eq(customer_id))
        .select(CartRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Cart"))?;
    cart.ensure_open()?;
    Ok(cart)
}

fn touch(conn: &mut PgConnection, cart_id: Uuid) -> Result<CartRow, DomainError> {
    Ok(diesel::update(carts::table.find(cart_id))
        .set(carts::updated_at.eq(Utc::now()))
        .returning(CartRow::as_returning())
        .get_result(conn)?)
}

fn cart_view(conn: &mut PgConnection, cart: CartRow) -> Result<CartView, DomainError> {
    let lines = load_line_items(conn, &[cart.id])?
        .remove(&cart.id)
        .unwrap_or_default();
    Ok(cart.into_cart_view(lines))
}

impl CartRepository for DieselCartRepository {
    fn open_cart(&self, customer_id: Uuid) -> Result<Option<CartView>, DomainError> {
        let mut conn = self.pool.get()?;

        let cart = carts::table
            .filter(carts::customer_id.eq(customer_id))
            .filter(carts::is_cart.eq(true))
            .select(CartRow::as_select())
            .first(&mut conn)
            .optional()?;

        cart.map(|cart| cart_view(&mut conn, cart)).transpose()
    }

    fn add_line_item(
        &self,
        customer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let product = find_product(conn, product_id)?.ok_or(DomainError::NotFound("Product"))?;

            // The partial unique index keeps this to one open cart per customer
            // even when two requests race to create it.
            diesel::insert_into(carts::table)
                .values(&NewCartRow::open_cart(customer_id))
                .on_conflict_do_nothing()
                .execute(conn)?;
            let cart = carts::table
                .filter(carts::customer_id.eq(customer_id))
                .filter(carts::is_cart.eq(true))
                .select(CartRow::as_select())
                .for_update()
                .first(conn)?;

            let in_cart: Option<i32> = cart_items::table
                .filter(cart_items::cart_id.eq(cart.id))
                .filter(cart_items::product_id.eq(product_id))
                .select(cart_items::quantity)
                .first(conn)
                .optional()?;
            let requested = in_cart.unwrap_or(0).saturating_add(quantity);
            product.ensure_stock_covers(requested)?;

            diesel::insert_into(cart_items::table)
                .values(&NewCartItemRow {
                    cart_id: cart.id,
                    product_id,
                    quantity: requested,
                    unit_price: product.price.clone(),
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set((
                    cart_items::quantity.eq(requested),
                    cart_items::unit_price.eq(&product.price),
                    cart_items::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            let cart = touch(conn, cart.id)?;
            cart_view(conn, cart)
        })
    }

    fn update_line_item(
        &self,
        customer_id: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItemView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_owned_cart(conn, customer_id, cart_id)?;
            let product = find_product(conn, product_id)?.ok_or(DomainError::NotFound("Product"))?;
            product.ensure_stock_covers(quantity)?;

            let item = diesel::update(
                cart_items::table
                    .filter(cart_items::cart_id.eq(cart_id))
                    .filter(cart_items::product_id.eq(product_id)),
            )
            .set((
                cart_items::quantity.eq(quantity),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .returning(CartItemRow::as_returning())
            .get_result(conn)
            .optional()?
            .ok_or(DomainError::NotFound("Cart item"))?;

            touch(conn, cart_id)?;
            Ok(item.into_line_item(&product))
        })
    }

    fn remove_line_item(
        &self,
        customer_id: Uuid,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_owned_cart(conn, customer_id, cart_id)?;
            let removed = diesel::delete(
                cart_items::table
                    .filter(cart_items::cart_id.eq(cart_id))
                    .filter(cart_items::product_id.eq(product_id)),
            )
            .execute(conn)?;
            if removed > 0 {
                touch(conn, cart_id)?;
            }
            Ok(removed > 0)
        })
    }
}
