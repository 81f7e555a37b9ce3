use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;

/// A catalog product together with its live stock.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

impl Product {
    /// Fails unless `requested` units can be taken from the current stock.
    pub fn ensure_stock_covers(&self, requested: i32) -> Result<(), DomainError> {
        if requested > self.quantity {
            return Err(self.insufficient(requested));
        }
        Ok(())
    }

    pub fn insufficient(&self, requested: i32) -> DomainError {
        DomainError::InsufficientStock {
            product_id: self.id,
            product_name: self.name.clone(),
            available: self.quantity,
            requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(quantity: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Empanada".to_string(),
            price: BigDecimal::from_str("2.50").unwrap(),
            quantity,
        }
    }

    #[test]
    fn exact_stock_is_enough() {
        assert!(product(5).ensure_stock_covers(5).is_ok());
    }

    #[test]
    fn over_request_reports_available_and_requested() {
        let p = product(2);
        match p.ensure_stock_covers(3) {
            Err(DomainError::InsufficientStock {
                product_id,
                available,
                requested,
                ..
            }) => {
                assert_eq!(product_id, p.id);
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }
}
