use log::info;
use uuid::Uuid;

use crate::domain::chat::{infer_recipient, Conversation, Draft, Message, NewMessage, SentMessage};
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderScope, OrderView, Participant};
use crate::domain::ports::{MessageRepository, OrderRepository, UserDirectory};
use crate::domain::user::{Role, User};

use super::authenticate;

pub struct ChatService<U, O, M> {
    users: U,
    orders: O,
    messages: M,
}

impl<U: UserDirectory, O: OrderRepository, M: MessageRepository> ChatService<U, O, M> {
    pub fn new(users: U, orders: O, messages: M) -> Self {
        Self {
            users,
            orders,
            messages,
        }
    }

    fn open(&self, user: &User, order_id: Uuid) -> Result<(OrderView, Participant), DomainError> {
        let order = self
            .orders
            .find_order(order_id)?
            .ok_or(DomainError::NotFound("Order"))?;
        let participant = order
            .participant(user)
            .ok_or_else(|| DomainError::forbidden("You are not a participant of this order"))?;
        Ok((order, participant))
    }

    pub fn list_messages(&self, caller: Uuid, order_id: Uuid) -> Result<Vec<Message>, DomainError> {
        let user = authenticate(&self.users, caller)?;
        self.open(&user, order_id)?;
        self.messages.list_for_order(order_id)
    }

    /// Text-only messages are relayed but not stored.
    pub fn send_message(
        &self,
        caller: Uuid,
        order_id: Uuid,
        draft: Draft,
    ) -> Result<SentMessage, DomainError> {
        let sender = authenticate(&self.users, caller)?;
        let (order, participant) = self.open(&sender, order_id)?;

        let recipient_id = match draft.recipient_id {
            Some(id) => {
                self.users
                    .find_user(id)?
                    .ok_or(DomainError::NotFound("Recipient"))?
                    .id
            }
            None => infer_recipient(&order, participant)?,
        };

        let Some(attachment) = draft.attachment.clone() else {
            return Ok(SentMessage::transient(&sender, recipient_id, order.id, draft));
        };
        let message = self.messages.insert(NewMessage {
            sender_id: sender.id,
            recipient_id,
            order_id: order.id,
            body: draft.body,
            attachment,
        })?;
        info!(
            "stored message {} on order {} from {} to {}",
            message.id, order.id, sender.id, recipient_id
        );
        Ok(SentMessage {
            message,
            stored: true,
        })
    }

    pub fn list_conversations(&self, caller: Uuid) -> Result<Vec<Conversation>, DomainError> {
        let user = authenticate(&self.users, caller)?;
        let scope = match user.role {
            Role::Customer => OrderScope::PlacedBy(user.id),
            Role::Merchant => OrderScope::WithProductsOf(user.id),
            Role::Courier => OrderScope::AssignedTo(user.id),
            Role::Admin => OrderScope::Active,
        };

        let mut orders = self.orders.list_orders(scope)?;
        orders.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut latest = self.messages.latest_for_orders(&ids)?;

        Ok(orders
            .into_iter()
            .map(|order| Conversation {
                order_id: order.id,
                status: order.status,
                delivery_mode: order.delivery.mode(),
                created_at: order.created_at,
                last_message: latest.remove(&order.id),
                customer: order.customer,
            })
            .collect())
    }
}
