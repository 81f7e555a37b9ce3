use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::inventory::Product;
use super::user::{Role, User};

// ── Delivery ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Pickup,
    Delivery,
}

impl DeliveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMode::Pickup => "pickup",
            DeliveryMode::Delivery => "delivery",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(DeliveryMode::Pickup),
            "delivery" => Ok(DeliveryMode::Delivery),
            other => Err(DomainError::Internal(format!("unknown delivery mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub const MAX_ADDRESS_CHARS: usize = 255;

/// How a confirmed order reaches its customer.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Pickup,
    Delivery(Destination),
}

impl Delivery {
    /// Builds delivery details from request fields. A destination is required
    /// for `delivery` and ignored for `pickup`.
    pub fn new(
        mode: DeliveryMode,
        address: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Self, DomainError> {
        match mode {
            DeliveryMode::Pickup => Ok(Delivery::Pickup),
            DeliveryMode::Delivery => {
                let address = address
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| {
                        DomainError::validation("delivery_address is required for delivery orders")
                    })?;
                if address.chars().count() > MAX_ADDRESS_CHARS {
                    return Err(DomainError::Validation(format!(
                        "delivery_address cannot exceed {MAX_ADDRESS_CHARS} characters"
                    )));
                }
                let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
                    return Err(DomainError::validation(
                        "delivery_latitude and delivery_longitude are required for delivery orders",
                    ));
                };
                if !(-90.0..=90.0).contains(&latitude) {
                    return Err(DomainError::validation(
                        "delivery_latitude must be between -90 and 90",
                    ));
                }
                if !(-180.0..=180.0).contains(&longitude) {
                    return Err(DomainError::validation(
                        "delivery_longitude must be between -180 and 180",
                    ));
                }
                Ok(Delivery::Delivery(Destination {
                    address,
                    latitude,
                    longitude,
                }))
            }
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        match self {
            Delivery::Pickup => DeliveryMode::Pickup,
            Delivery::Delivery(_) => DeliveryMode::Delivery,
        }
    }

    pub fn destination(&self) -> Option<&Destination> {
        match self {
            Delivery::Pickup => None,
            Delivery::Delivery(d) => Some(d),
        }
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "en_preparacion")]
    Preparing,
    #[serde(rename = "listo")]
    Ready,
    #[serde(rename = "en_camino")]
    OnTheWay,
    #[serde(rename = "entregado")]
    Delivered,
    #[serde(rename = "recogido")]
    PickedUp,
}

/// Who is driving a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// A merchant or an admin.
    Staff,
    Courier,
    Customer,
}

use OrderStatus::*;

const TRANSITIONS: &[(OrderStatus, OrderStatus, Actor)] = &[
    (Pending, Confirmed, Actor::Staff),
    (Pending, Preparing, Actor::Staff),
    (Pending, Ready, Actor::Staff),
    (Confirmed, Preparing, Actor::Staff),
    (Confirmed, Ready, Actor::Staff),
    (Preparing, Ready, Actor::Staff),
    (Ready, OnTheWay, Actor::Courier),
    (Ready, Delivered, Actor::Courier),
    (OnTheWay, Delivered, Actor::Courier),
    (Ready, PickedUp, Actor::Customer),
];

impl OrderStatus {
    pub const ACTIVE: [OrderStatus; 5] = [Pending, Confirmed, Preparing, Ready, OnTheWay];

    pub fn as_str(self) -> &'static str {
        match self {
            Pending => "pending",
            Confirmed => "confirmed",
            Preparing => "en_preparacion",
            Ready => "listo",
            OnTheWay => "en_camino",
            Delivered => "entregado",
            PickedUp => "recogido",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Delivered | PickedUp)
    }

    pub fn can_transition(self, to: OrderStatus, actor: Actor) -> bool {
        TRANSITIONS
            .iter()
            .any(|&(f, t, a)| f == self && t == to && a == actor)
    }

    pub fn ensure_transition(self, to: OrderStatus, actor: Actor) -> Result<(), DomainError> {
        if self.can_transition(to, actor) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Pending),
            "confirmed" => Ok(Confirmed),
            "en_preparacion" => Ok(Preparing),
            "listo" => Ok(Ready),
            "en_camino" => Ok(OnTheWay),
            "entregado" => Ok(Delivered),
            "recogido" => Ok(PickedUp),
            other => Err(DomainError::Internal(format!("unknown order status '{other}'"))),
        }
    }
}

// ── Checkout ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price the client saw. Only used to detect a stale catalog view.
    pub expected_unit_price: Option<BigDecimal>,
}

impl CheckoutLine {
    /// The price to charge is always the catalog price.
    pub fn unit_price_for(&self, product: &Product) -> Result<BigDecimal, DomainError> {
        match &self.expected_unit_price {
            Some(expected) if *expected != product.price => Err(DomainError::Validation(format!(
                "Price of {} changed; current price is {}",
                product.name, product.price
            ))),
            _ => Ok(product.price.clone()),
        }
    }
}

/// A checkout request that passed every check not needing the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    delivery: Delivery,
    lines: Vec<CheckoutLine>,
}

impl Checkout {
    pub fn new(delivery: Delivery, lines: Vec<CheckoutLine>) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::validation("An order needs at least one product"));
        }
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.quantity < 1 {
                return Err(DomainError::validation("quantity must be at least 1"));
            }
            if let Some(price) = &line.expected_unit_price {
                if *price < BigDecimal::from(0) {
                    return Err(DomainError::validation("unit_price cannot be negative"));
                }
            }
            if !seen.insert(line.product_id) {
                return Err(DomainError::Validation(format!(
                    "product {} appears more than once",
                    line.product_id
                )));
            }
        }
        Ok(Self { delivery, lines })
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn lines(&self) -> &[CheckoutLine] {
        &self.lines
    }
}

// ── Views ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LineItemView {
    pub product_id: Uuid,
    pub product_name: String,
    /// Owner of the product.
    pub merchant_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl LineItemView {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

fn total_of(lines: &[LineItemView]) -> BigDecimal {
    lines
        .iter()
        .fold(BigDecimal::from(0), |acc, l| acc + l.subtotal())
}

/// An open, still editable cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<LineItemView>,
}

impl CartView {
    pub fn total(&self) -> BigDecimal {
        total_of(&self.lines)
    }
}

/// The capacity in which a user takes part in an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Customer,
    Courier,
    Merchant,
    Admin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub id: Uuid,
    pub customer: User,
    pub delivery: Delivery,
    pub courier: Option<User>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<LineItemView>,
}

impl OrderView {
    pub fn total(&self) -> BigDecimal {
        total_of(&self.lines)
    }

    pub fn courier_id(&self) -> Option<Uuid> {
        self.courier.as_ref().map(|c| c.id)
    }

    /// Merchants owning products on this order, in line-item order.
    pub fn merchant_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for line in &self.lines {
            if !ids.contains(&line.merchant_id) {
                ids.push(line.merchant_id);
            }
        }
        ids
    }

    pub fn participant(&self, user: &User) -> Option<Participant> {
        if self.customer.id == user.id {
            Some(Participant::Customer)
        } else if self.courier_id() == Some(user.id) {
            Some(Participant::Courier)
        } else if user.role == Role::Merchant
            && self.lines.iter().any(|l| l.merchant_id == user.id)
        {
            Some(Participant::Merchant)
        } else if user.role.is_admin() {
            Some(Participant::Admin)
        } else {
            None
        }
    }

    /// Checks the delivery mode and the transition table for a status change.
    pub fn ensure_transition(&self, to: OrderStatus, actor: Actor) -> Result<(), DomainError> {
        let mode = self.delivery.mode();
        match to {
            OnTheWay | Delivered if mode != DeliveryMode::Delivery => {
                return Err(DomainError::validation(
                    "Only delivery orders can be taken or delivered by a courier",
                ));
            }
            PickedUp if mode != DeliveryMode::Pickup => {
                return Err(DomainError::validation(
                    "Only pickup orders can be marked as picked up",
                ));
            }
            _ => {}
        }
        self.status.ensure_transition(to, actor)
    }
}

/// Which confirmed orders a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Orders placed by the customer, newest first.
    PlacedBy(Uuid),
    /// Every order in a non-terminal status, oldest first.
    Active,
    /// Orders assigned to the courier that are ready or on the way.
    DeliveriesOf(Uuid),
    /// Delivery orders that are ready and have no courier yet.
    Unclaimed,
    /// Orders containing at least one product of the merchant.
    WithProductsOf(Uuid),
    /// Every order ever assigned to the courier.
    AssignedTo(Uuid),
}
