//! Assembles read models from rows. Shared by the cart and order repositories.

use std::collections::HashMap;

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inventory::Product;
use crate::domain::order::{LineItemView, OrderView};
use crate::domain::user::User;
use crate::schema::{cart_items, products, users};

use super::models::{CartItemRow, CartRow, ProductRow, UserRow};

/// Line items of the given carts, keyed by cart id, each list in insertion order.
pub(super) fn load_line_items(
    conn: &mut PgConnection,
    cart_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LineItemView>>, DomainError> {
    let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::cart_id.eq_any(cart_ids))
        .order(cart_items::id.asc())
        .select((CartItemRow::as_select(), ProductRow::as_select()))
        .load(conn)?;

    let mut by_cart: HashMap<Uuid, Vec<LineItemView>> = HashMap::new();
    for (item, product) in rows {
        let product = Product::from(product);
        by_cart
            .entry(item.cart_id)
            .or_default()
            .push(item.into_line_item(&product));
    }
    Ok(by_cart)
}

pub(super) fn load_users(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, User>, DomainError> {
    users::table
        .filter(users::id.eq_any(ids))
        .select(UserRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|row| User::try_from(row).map(|user| (user.id, user)))
        .collect()
}

/// Turns order rows into full views, keeping the order of `rows`.
pub(super) fn load_order_views(
    conn: &mut PgConnection,
    rows: Vec<CartRow>,
) -> Result<Vec<OrderView>, DomainError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut lines = load_line_items(conn, &ids)?;

    let mut user_ids: Vec<Uuid> = rows
        .iter()
        .map(|r| r.customer_id)
        .chain(rows.iter().filter_map(|r| r.courier_id))
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let users = load_users(conn, &user_ids)?;

    let lookup = |id: Uuid| {
        users
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                DomainError::Internal(format!("user {id} referenced by an order is missing"))
            })
    };

    rows.into_iter()
        .map(|row| {
            Ok::<_, DomainError>(OrderView {
                id: row.id,
                customer: lookup(row.customer_id)?,
                delivery: row.delivery()?,
                courier: row.courier_id.map(&lookup).transpose()?,
                status: row.order_status()?,
                created_at: row.created_at,
                updated_at: row.updated_at,
                lines: lines.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}
