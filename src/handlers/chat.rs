use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::chat::{AttachmentKind, Conversation, Draft, Message, SentMessage};
use crate::domain::order::{DeliveryMode, OrderStatus};
use crate::errors::AppError;
use crate::AppChatService;

use super::identity::CallerId;
use super::{run_blocking, ApiResponse, ContactResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub body: String,
    /// Absolute http(s) URL. Only messages with an attachment are stored.
    pub attachment_url: Option<String>,
    /// Defaults to `comprobante` when an attachment is present.
    pub attachment_kind: Option<AttachmentKind>,
    /// Inferred from the sender's role on the order when omitted.
    pub recipient_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Null for messages that were not stored.
    pub id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub recipient_id: Uuid,
    pub body: String,
    pub attachment_url: Option<String>,
    pub attachment_kind: Option<AttachmentKind>,
    pub created_at: DateTime<Utc>,
}

impl MessageResponse {
    fn new(m: Message, stored: bool) -> Self {
        let (attachment_url, attachment_kind) = match m.attachment {
            Some(a) => (Some(a.url), Some(a.kind)),
            None => (None, None),
        };
        Self {
            id: stored.then_some(m.id),
            order_id: m.order_id,
            sender_id: m.sender_id,
            sender_name: m.sender_name,
            recipient_id: m.recipient_id,
            body: m.body,
            attachment_url,
            attachment_kind,
            created_at: m.created_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self::new(m, true)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SentMessageResponse {
    pub message: MessageResponse,
    /// Whether the message was kept in the order's history.
    pub stored: bool,
}

impl From<SentMessage> for SentMessageResponse {
    fn from(s: SentMessage) -> Self {
        Self {
            message: MessageResponse::new(s.message, s.stored),
            stored: s.stored,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub order_id: Uuid,
    pub messages: Vec<MessageResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub order_id: Uuid,
    pub customer: ContactResponse,
    pub status: OrderStatus,
    pub delivery_mode: DeliveryMode,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<MessageResponse>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            order_id: c.order_id,
            customer: c.customer.into(),
            status: c.status,
            delivery_mode: c.delivery_mode,
            created_at: c.created_at,
            last_message: c.last_message.map(MessageResponse::from),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /chat/{order}
///
/// Stored messages of an order, oldest first. Text-only messages are never
/// stored and so never listed.
#[utoipa::path(
    get,
    path = "/chat/{order}",
    params(
        ("order" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    responses(
        (status = 200, description = "Message history", body = ApiResponse<MessagesResponse>),
        (status = 403, description = "Caller does not take part in the order"),
        (status = 404, description = "Order not found"),
    ),
    tag = "chat"
)]
pub async fn list_messages(
    chat: web::Data<AppChatService>,
    caller: CallerId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let messages = run_blocking(move || chat.list_messages(caller.0, order_id)).await?;

    let messages: Vec<MessageResponse> = messages.into_iter().map(MessageResponse::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Messages",
        MessagesResponse {
            order_id,
            total: messages.len(),
            messages,
        },
    )))
}

/// POST /chat/{order}/enviar
#[utoipa::path(
    post,
    path = "/chat/{order}/enviar",
    params(
        ("order" = Uuid, Path, description = "Order UUID"),
        ("X-User-Id" = Uuid, Header, description = "Caller id"),
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = ApiResponse<SentMessageResponse>),
        (status = 400, description = "Invalid body or attachment, or no recipient can be inferred"),
        (status = 403, description = "Caller does not take part in the order"),
        (status = 404, description = "Order or recipient not found"),
    ),
    tag = "chat"
)]
pub async fn send_message(
    chat: web::Data<AppChatService>,
    caller: CallerId,
    path: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let draft = Draft::new(
        body.body,
        body.attachment_url,
        body.attachment_kind,
        body.recipient_id,
    )?;

    let sent = run_blocking(move || chat.send_message(caller.0, order_id, draft)).await?;

    let message = if sent.stored {
        "Message sent"
    } else {
        "Message sent (not stored: no attachment)"
    };
    Ok(HttpResponse::Created().json(ApiResponse::new(
        message,
        SentMessageResponse::from(sent),
    )))
}

/// GET /conversaciones
#[utoipa::path(
    get,
    path = "/conversaciones",
    params(("X-User-Id" = Uuid, Header, description = "Caller id")),
    responses(
        (
            status = 200,
            description = "Order conversations, most recently updated first",
            body = ApiResponse<Vec<ConversationResponse>>
        ),
        (status = 401, description = "Unknown caller"),
    ),
    tag = "chat"
)]
pub async fn list_conversations(
    chat: web::Data<AppChatService>,
    caller: CallerId,
) -> Result<HttpResponse, AppError> {
    let conversations = run_blocking(move || chat.list_conversations(caller.0)).await?;

    let conversations: Vec<ConversationResponse> = conversations
        .into_iter()
        .map(ConversationResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::new("Conversations", conversations)))
}
