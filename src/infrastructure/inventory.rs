//! Stock bookkeeping on the `products` table.
//!
//! Every decrement is a single conditional `UPDATE`, so concurrent checkouts
//! of the same product can never drive its quantity below zero.

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inventory::Product;
use crate::schema::products;

use super::models::ProductRow;

pub fn find_product(conn: &mut PgConnection, id: Uuid) -> Result<Option<Product>, DomainError> {
    let row = products::table
        .find(id)
        .select(ProductRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Product::from))
}

/// Row-locks the given products in id order for the rest of the transaction.
///
/// Writers that touch several products must lock them through here first, so
/// two transactions never hold one product each while waiting on the other.
pub fn lock_products(conn: &mut PgConnection, ids: &[Uuid]) -> Result<(), DomainError> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    products::table
        .filter(products::id.eq_any(ids))
        .order(products::id.asc())
        .select(products::id)
        .for_update()
        .load::<Uuid>(conn)?;
    Ok(())
}

/// Takes `quantity` units of the product out of stock and returns the product
/// as it is after the decrement.
pub fn take_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<Product, DomainError> {
    let updated = diesel::update(products::table)
        .filter(products::id.eq(product_id))
        .filter(products::quantity.ge(quantity))
        .set((
            products::quantity.eq(products::quantity - quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .returning(ProductRow::as_returning())
        .get_result(conn)
        .optional()?;

    match updated {
        Some(row) => Ok(row.into()),
        None => match find_product(conn, product_id)? {
            Some(product) => Err(product.insufficient(quantity)),
            None => Err(DomainError::NotFound("Product")),
        },
    }
}
