use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserDirectory;
use crate::domain::user::User;
use crate::schema::users;

use super::models::UserRow;

pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for DieselUserDirectory {
    fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;
    use crate::infrastructure::test_support::{seed_user, setup_db};

    #[tokio::test]
    async fn find_user_maps_role_and_contact() {
        let (_container, pool) = setup_db().await;
        let id = {
            let mut conn = pool.get().expect("Failed to get connection");
            seed_user(&mut conn, Role::Courier, "Carla Ruiz")
        };
        let directory = DieselUserDirectory::new(pool);

        let user = directory.find_user(id).expect("lookup failed").expect("user exists");
        assert_eq!(user.role, Role::Courier);
        assert_eq!(user.full_name, "Carla Ruiz");
        assert_eq!(user.phone.as_deref(), Some("3001234567"));

        assert!(directory.find_user(Uuid::new_v4()).unwrap().is_none());
    }
}
