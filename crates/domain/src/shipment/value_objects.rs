//! Value objects for the shipment domain.

use chrono::{DateTime, Utc};
use common::CustomerId;
use serde::{Deserialize, Serialize};

use super::ShipmentStatus;

/// Identifier for an article (SKU) on an ordered line item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Creates a new article ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the article ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ArticleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A monetary amount in cents.
///
/// Uses integer cents to avoid floating-point issues with money.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Hash,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies the amount by a quantity.
    pub fn multiply(&self, quantity: u32) -> Self {
        Self(self.0 * i64::from(quantity))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

/// The party that triggered a domain operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Creates an actor from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The system itself, for operations triggered by inbound notifications.
    pub fn system() -> Self {
        Self("system".to_string())
    }

    /// Returns the actor name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Actor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Actor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of shipment: a regular outbound shipment or the replacement leg
/// of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentKind {
    /// Regular outbound shipment.
    #[default]
    Normal,

    /// Replacement shipment created by an exchange, linked to the original.
    Exchange,
}

impl ShipmentKind {
    /// Returns the kind name as used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentKind::Normal => "NORMAL",
            ShipmentKind::Exchange => "EXCHANGE",
        }
    }
}

impl std::fmt::Display for ShipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Condition of returned goods, assessed when an exchange is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCondition {
    /// Goods came back in resellable condition.
    Good,

    /// Goods came back damaged.
    Damaged,

    /// Goods were defective on arrival.
    Defective,
}

impl std::fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProductCondition::Good => "GOOD",
            ProductCondition::Damaged => "DAMAGED",
            ProductCondition::Defective => "DEFECTIVE",
        };
        write!(f, "{s}")
    }
}

/// An ordered line item, captured at shipment creation and immutable
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The ordered article.
    pub article_id: ArticleId,

    /// Quantity ordered.
    pub quantity: u32,

    /// Unit price at creation time.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(article_id: impl Into<ArticleId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            article_id: article_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (unit price times quantity).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Customer contact and address snapshot, captured at shipment creation
/// and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// The customer the shipment is addressed to.
    pub customer_id: CustomerId,

    /// Recipient name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Delivery address as a single formatted string.
    pub address: String,
}

impl CustomerInfo {
    /// Creates a new customer snapshot.
    pub fn new(
        customer_id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            name: name.into(),
            email: email.into(),
            address: address.into(),
        }
    }
}

/// One entry in a shipment's tracking history.
///
/// Every status change appends exactly one entry; the history and the
/// event log must never diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEntry {
    /// Status after the change.
    pub status: ShipmentStatus,

    /// Free-text note attached to the change.
    pub note: String,

    /// When the change happened.
    pub at: DateTime<Utc>,

    /// Who triggered the change.
    pub by: Actor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_multiply() {
        let price = Money::from_cents(1250);
        assert_eq!(price.multiply(3).cents(), 3750);
        assert_eq!(Money::zero().multiply(10), Money::zero());
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn line_item_total() {
        let item = LineItem::new("SKU-001", 4, Money::from_cents(500));
        assert_eq!(item.total_price().cents(), 2000);
    }

    #[test]
    fn actor_system() {
        assert_eq!(Actor::system().as_str(), "system");
        assert_eq!(Actor::new("warehouse").to_string(), "warehouse");
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(ShipmentKind::Normal.as_str(), "NORMAL");
        assert_eq!(ShipmentKind::Exchange.as_str(), "EXCHANGE");
        let json = serde_json::to_string(&ShipmentKind::Exchange).unwrap();
        assert_eq!(json, "\"EXCHANGE\"");
    }

    #[test]
    fn customer_info_serialization() {
        let customer = CustomerInfo::new(
            common::CustomerId::new(),
            "Jane Doe",
            "jane@example.com",
            "1 Main St, Springfield",
        );
        let json = serde_json::to_string(&customer).unwrap();
        let back: CustomerInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, customer);
    }
}
