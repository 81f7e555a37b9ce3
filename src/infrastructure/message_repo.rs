use std::collections::HashMap;

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::chat::{Message, NewMessage};
use crate::domain::errors::DomainError;
use crate::domain::ports::MessageRepository;
use crate::schema::{messages, users};

use super::models::{MessageRow, NewMessageRow};

pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for DieselMessageRepository {
    fn insert(&self, message: NewMessage) -> Result<Message, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::insert_into(messages::table)
                .values(&NewMessageRow {
                    id: Uuid::new_v4(),
                    sender_id: message.sender_id,
                    recipient_id: message.recipient_id,
                    order_id: Some(message.order_id),
                    body: message.body,
                    attachment_url: Some(message.attachment.url),
                    attachment_kind: Some(message.attachment.kind.as_str().to_string()),
                })
                .returning(MessageRow::as_returning())
                .get_result(conn)?;

            let sender_name: String = users::table
                .find(row.sender_id)
                .select(users::full_name)
                .first(conn)?;
            row.into_message(sender_name)
        })
    }

    fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Message>, DomainError> {
        let mut conn = self.pool.get()?;

        messages::table
            .inner_join(users::table)
            .filter(messages::order_id.eq(order_id))
            .order((messages::created_at.asc(), messages::id.asc()))
            .select((MessageRow::as_select(), users::full_name))
            .load::<(MessageRow, String)>(&mut conn)?
            .into_iter()
            .map(|(row, sender_name)| row.into_message(sender_name))
            .collect()
    }

    fn latest_for_orders(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Message>, DomainError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get()?;

        let rows = messages::table
            .inner_join(users::table)
            .filter(messages::order_id.eq_any(order_ids))
            .distinct_on(messages::order_id)
            .order((messages::order_id, messages::created_at.desc()))
            .select((MessageRow::as_select(), users::full_name))
            .load::<(MessageRow, String)>(&mut conn)?;

        let mut latest = HashMap::with_capacity(rows.len());
        for (row, sender_name) in rows {
            if let Some(order_id) = row.order_id {
                latest.insert(order_id, row.into_message(sender_name)?);
            }
        }
        Ok(latest)
    }
}
