use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use oms_common::Price;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been stored, but the inventory service has not yet confirmed stock for it.
    OnHold,
    /// The inventory service confirmed that the order can be fulfilled.
    NewOrder,
}

impl OrderStatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::OnHold => "on_hold",
            OrderStatusType::NewOrder => "new_order",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_hold" => Ok(Self::OnHold),
            "new_order" => Ok(Self::NewOrder),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::random()
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl From<Uuid> for OrderId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
/// A stored order. The serialized form of this struct is also the lifecycle event payload and the webhook body.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub sku_id: Uuid,
    pub hub_id: Uuid,
    pub seller_id: Uuid,
    pub tenant_id: Uuid,
    pub quantity: i64,
    pub price: Price,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}


//--------------------------------------        NewOrder       ---------------------------------------------------------
/// An order as it arrives from one of the entry paths (a CSV row or the order API), before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Generated when the caller does not supply one.
    #[serde(default)]
    pub order_id: OrderId,
    pub sku_id: Uuid,
    pub hub_id: Uuid,
    pub seller_id: Uuid,
    /// Filled from the `X-Tenant-ID` header on the API path, so it may be absent in request bodies.
    #[serde(default)]
    pub tenant_id: Uuid,
    pub quantity: i64,
    pub price: Price,
}

impl NewOrder {
    pub fn new(sku_id: Uuid, hub_id: Uuid, seller_id: Uuid, tenant_id: Uuid, quantity: i64, price: Price) -> Self {
        Self { order_id: OrderId::random(), sku_id, hub_id, seller_id, tenant_id, quantity, price }
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = order_id;
        self
    }

    pub fn with_tenant_id(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn is_equivalent(&self, order: &Order) -> bool {
        self.order_id == order.order_id &&
            self.sku_id == order.sku_id &&
            self.hub_id == order.hub_id &&
            self.seller_id == order.seller_id &&
            self.tenant_id == order.tenant_id &&
            self.quantity == order.quantity &&
            self.price == order.price
    }
}

//--------------------------------------  WebhookRegistration  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct WebhookRegistration {
    pub tenant_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
