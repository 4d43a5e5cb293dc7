use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use crate::domain::medicine::Medicine;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Rejected,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Payment has already been taken (or the order moved past it).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
        )
    }

    /// The order was closed by a doctor and can never be paid.
    pub fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| OrderError::UnknownStatus(value.to_string()))
    }
}

/// Read-only projection of the medicine an item points at.
///
/// Absent when the medicine has been soft-deleted since the item was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRef {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub medicine_id: Uuid,
    pub quantity: f64,
    pub medicine: Option<MedicineRef>,
}

impl OrderItem {
    pub fn new(order_id: Uuid, medicine: &Medicine, quantity: f64) -> Self {
        Self {
            id: Uuid::now_v7(),
            order_id,
            medicine_id: medicine.id,
            quantity,
            medicine: Some(MedicineRef {
                name: medicine.name.clone(),
                price: medicine.price,
            }),
        }
    }

    pub fn medicine_name(&self) -> &str {
        self.medicine.as_ref().map(|m| m.name.as_str()).unwrap_or("")
    }

    pub fn line_total(&self) -> f64 {
        self.medicine
            .as_ref()
            .map(|m| m.price * self.quantity)
            .unwrap_or(0.0)
    }
}

/// Largest value a NUMERIC(12,2) column holds.
pub const MAX_AMOUNT: f64 = 9_999_999_999.99;

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Σ(price × quantity), rounded to cents to match the NUMERIC(12,2) column.
pub fn total_amount(items: &[OrderItem]) -> f64 {
    round_to_cents(items.iter().map(OrderItem::line_total).sum())
}

// ============================================================================
// Unit Tests
// ============================================================================
