pub mod cart_service;
pub mod chat_service;
pub mod order_service;

pub use cart_service::CartService;
pub use chat_service::ChatService;
pub use order_service::OrderService;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::UserDirectory;
use crate::domain::user::User;

/// Resolves the caller named by the request. Unknown ids are unauthenticated.
pub(crate) fn authenticate<U: UserDirectory>(users: &U, caller: Uuid) -> Result<User, DomainError> {
    users.find_user(caller)?.ok_or(DomainError::Unauthenticated)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::domain::order::{Delivery, LineItemView, OrderStatus, OrderView};
    use crate::domain::ports::MockUserDirectory;
    use crate::domain::user::{Role, User};

    pub fn user(role: Role) -> User {
        let id = Uuid::new_v4();
        User {
            id,
            role,
            full_name: format!("{role} {}", &id.to_string()[..8]),
            phone: None,
            email: format!("{id}@example.com"),
        }
    }

    pub fn order(
        customer: &User,
        merchant: &User,
        delivery: Delivery,
        status: OrderStatus,
    ) -> OrderView {
        let now = Utc::now();
        OrderView {
            id: Uuid::new_v4(),
            customer: customer.clone(),
            delivery,
            courier: None,
            status,
            created_at: now,
            updated_at: now,
            lines: vec![LineItemView {
                product_id: Uuid::new_v4(),
                product_name: "Arepa".to_string(),
                merchant_id: merchant.id,
                quantity: 2,
                unit_price: 3.into(),
            }],
        }
    }

    /// A directory that knows exactly the given users.
    pub fn directory(known: Vec<User>) -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users
            .expect_find_user()
            .returning(move |id| Ok(known.iter().find(|u| u.id == id).cloned()));
        users
    }
}
