use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use wop_common::Cents;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh, random order id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------        ClientId       ---------------------------------------------------------
/// The stable id of an authenticated identity, as issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for ClientId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//--------------------------------------        Identity       ---------------------------------------------------------
/// An authenticated identity. Always passed explicitly into the wizard and the submission gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: ClientId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: ClientId::from(id), email: None }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The persisted order lifecycle. Variants are declared in lifecycle order; `Cancelled` sits outside the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The onboarding wizard wrote the order. No payment has been requested yet.
    Submitted,
    WaitingForConfirmation,
    Confirmed,
    /// The initial payment succeeded and work has started.
    InProgress,
    InDesign,
    Review,
    FinalDelivery,
    /// The final payment succeeded.
    Completed,
    Cancelled,
}

impl OrderStatusType {
    pub const LIFECYCLE: [OrderStatusType; 8] = [
        OrderStatusType::Submitted,
        OrderStatusType::WaitingForConfirmation,
        OrderStatusType::Confirmed,
        OrderStatusType::InProgress,
        OrderStatusType::InDesign,
        OrderStatusType::Review,
        OrderStatusType::FinalDelivery,
        OrderStatusType::Completed,
    ];

    /// Position in the forward lifecycle. `None` for `Cancelled`, which cannot be compared with the others.
    pub fn rank(&self) -> Option<usize> {
        Self::LIFECYCLE.iter().position(|s| s == self)
    }

    /// True if moving from `self` to `target` is a strictly forward step in the lifecycle.
    pub fn can_advance_to(&self, target: OrderStatusType) -> bool {
        match (self.rank(), target.rank()) {
            (Some(current), Some(target)) => target > current,
            _ => false,
        }
    }

    /// All statuses from which `target` is a forward move.
    pub fn predecessors_of(target: OrderStatusType) -> Vec<OrderStatusType> {
        Self::LIFECYCLE.iter().copied().filter(|s| s.can_advance_to(target)).collect()
    }

    /// The dashboard stage this status is shown as. The persisted status is authoritative; the stage is derived.
    pub fn stage(&self) -> ProjectStage {
        match self {
            Self::Submitted | Self::WaitingForConfirmation => ProjectStage::Submitted,
            Self::Confirmed => ProjectStage::Confirmed,
            Self::InProgress | Self::InDesign => ProjectStage::InProgress,
            Self::Review => ProjectStage::Review,
            Self::FinalDelivery => ProjectStage::Delivery,
            Self::Completed => ProjectStage::Completed,
            Self::Cancelled => ProjectStage::Cancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::WaitingForConfirmation => "waiting_for_confirmation",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::InDesign => "in_design",
            Self::Review => "review",
            Self::FinalDelivery => "final_delivery",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LIFECYCLE
            .iter()
            .chain(std::iter::once(&Self::Cancelled))
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| ConversionError(format!("Invalid order status: {s}")))
    }
}

//--------------------------------------     ProjectStage      ---------------------------------------------------------
/// The six-stage progress view shown on the client dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Submitted,
    Confirmed,
    InProgress,
    Review,
    Delivery,
    Completed,
    Cancelled,
}

impl ProjectStage {
    /// 1-based step number for progress bars, or `None` for cancelled projects.
    pub fn step_number(&self) -> Option<usize> {
        match self {
            Self::Submitted => Some(1),
            Self::Confirmed => Some(2),
            Self::InProgress => Some(3),
            Self::Review => Some(4),
            Self::Delivery => Some(5),
            Self::Completed => Some(6),
            Self::Cancelled => None,
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_id: ClientId,
    pub title: String,
    pub description: String,
    pub total_amount: Cents,
    pub status: OrderStatusType,
    pub purpose_type: String,
    pub contact_email: String,
    pub contact_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub id: OrderId,
    pub client_id: ClientId,
    pub title: String,
    pub description: String,
    pub total_amount: Cents,
    pub purpose_type: String,
    pub contact_email: String,
    pub contact_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(client_id: ClientId, title: String, total_amount: Cents) -> Self {
        Self {
            id: OrderId::random(),
            client_id,
            title,
            description: String::default(),
            total_amount,
            purpose_type: String::default(),
            contact_email: String::default(),
            contact_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    pub fn with_contact(mut self, email: String, name: Option<String>) -> Self {
        self.contact_email = email;
        self.contact_name = name;
        self
    }

    pub fn with_purpose_type(mut self, purpose_type: String) -> Self {
        self.purpose_type = purpose_type;
        self
    }
}

//--------------------------------------      PaymentType      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// The deposit that starts the project.
    Initial,
    /// The balance paid on delivery.
    Final,
}

impl PaymentType {
    /// The order status a successful payment of this type moves the order to.
    pub fn target_order_status(&self) -> OrderStatusType {
        match self {
            Self::Initial => OrderStatusType::InProgress,
            Self::Final => OrderStatusType::Completed,
        }
    }
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Final => write!(f, "final"),
        }
    }
}

//-----------------------------------------   PaymentStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

impl PaymentStatus {
    /// Everything except `Pending` is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

//-----------------------------------------   PaymentRecord   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    pub order_id: OrderId,
    pub stripe_payment_intent_id: String,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub amount: Cents,
    pub payment_method: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaymentRecord {
    pub order_id: OrderId,
    pub stripe_payment_intent_id: String,
    pub payment_type: PaymentType,
    pub amount: Cents,
}

impl NewPaymentRecord {
    pub fn new(order_id: OrderId, intent_id: &str, payment_type: PaymentType, amount: Cents) -> Self {
        Self { order_id, stripe_payment_intent_id: intent_id.to_string(), payment_type, amount }
    }
}
