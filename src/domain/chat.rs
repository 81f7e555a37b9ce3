use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{DeliveryMode, OrderStatus, OrderView, Participant};
use super::user::User;

pub const MAX_BODY_CHARS: usize = 1000;
pub const MAX_ATTACHMENT_URL_CHARS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AttachmentKind {
    /// Proof of payment.
    #[serde(rename = "comprobante")]
    Receipt,
    #[serde(rename = "producto")]
    Product,
    #[serde(rename = "otro")]
    Other,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::Receipt => "comprobante",
            AttachmentKind::Product => "producto",
            AttachmentKind::Other => "otro",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comprobante" => Ok(AttachmentKind::Receipt),
            "producto" => Ok(AttachmentKind::Product),
            "otro" => Ok(AttachmentKind::Other),
            other => Err(DomainError::Internal(format!("unknown attachment kind '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub url: String,
    pub kind: AttachmentKind,
}

/// A message as it arrives from the sender, before a recipient is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub body: String,
    pub attachment: Option<Attachment>,
    pub recipient_id: Option<Uuid>,
}

impl Draft {
    pub fn new(
        body: String,
        attachment_url: Option<String>,
        attachment_kind: Option<AttachmentKind>,
        recipient_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::validation("Message body cannot be empty"));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(DomainError::Validation(format!(
                "Message body cannot exceed {MAX_BODY_CHARS} characters"
            )));
        }
        let attachment = match attachment_url.filter(|u| !u.trim().is_empty()) {
            Some(raw) => {
                let parsed = Url::parse(raw.trim())
                    .map_err(|e| DomainError::Validation(format!("Invalid attachment_url: {e}")))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(DomainError::validation("attachment_url must use http or https"));
                }
                let url = parsed.to_string();
                if url.chars().count() > MAX_ATTACHMENT_URL_CHARS {
                    return Err(DomainError::Validation(format!(
                        "attachment_url cannot exceed {MAX_ATTACHMENT_URL_CHARS} characters"
                    )));
                }
                Some(Attachment {
                    url,
                    kind: attachment_kind.unwrap_or(AttachmentKind::Receipt),
                })
            }
            None => None,
        };
        Ok(Self {
            body,
            attachment,
            recipient_id,
        })
    }

    /// Only messages carrying an attachment are kept in the history.
    pub fn is_persistent(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Picks the implicit recipient of a message sent on `order`.
pub fn infer_recipient(order: &OrderView, sender: Participant) -> Result<Uuid, DomainError> {
    match sender {
        Participant::Customer => order.merchant_ids().first().copied().ok_or_else(|| {
            DomainError::validation("Cannot determine the merchant for this order")
        }),
        Participant::Merchant | Participant::Admin | Participant::Courier => Ok(order.customer.id),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub order_id: Uuid,
    pub body: String,
    pub attachment: Attachment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub recipient_id: Uuid,
    pub order_id: Option<Uuid>,
    pub body: String,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
}

/// What the sender gets back: the stored message, or a transient echo.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub message: Message,
    pub stored: bool,
}

impl SentMessage {
    pub fn transient(sender: &User, recipient_id: Uuid, order_id: Uuid, draft: Draft) -> Self {
        Self {
            message: Message {
                id: Uuid::nil(),
                sender_id: sender.id,
                sender_name: sender.full_name.clone(),
                recipient_id,
                order_id: Some(order_id),
                body: draft.body,
                attachment: draft.attachment,
                created_at: Utc::now(),
            },
            stored: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub order_id: Uuid,
    pub customer: User,
    pub status: OrderStatus,
    pub delivery_mode: DeliveryMode,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<Message>,
}
