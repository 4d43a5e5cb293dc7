use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Delivery Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    InTransit,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_method_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Flash,
    PickUp,
}

// ============================================================================
// Delivery - fulfilment tracking, one per order
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Delivery {
    pub id: Uuid,
    pub order_id: Uuid,
    pub delivery_information_id: Uuid,
    pub tracking_number: Option<String>,
    pub status: DeliveryStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    #[cfg(test)]
    pub fn new(order_id: Uuid, delivery_information_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            delivery_information_id,
            tracking_number: None,
            status: DeliveryStatus::Pending,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// DeliveryInformation - address/contact record owned by a user
// ============================================================================

/// Updated in place; `version` counts the edits but no history is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeliveryInformation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub phone_number: String,
    pub version: i32,
    pub delivery_method: DeliveryMethod,
    pub created_at: DateTime<Utc>,
}

impl DeliveryInformation {
    pub fn new(user_id: Uuid, address: String, phone_number: String, delivery_method: DeliveryMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            address,
            phone_number,
            version: 1,
            delivery_method,
            created_at: Utc::now(),
        }
    }

    /// Overwrite the contact fields and bump the version.
    pub fn revise(&mut self, address: String, phone_number: String, delivery_method: DeliveryMethod) {
        self.address = address;
        self.phone_number = phone_number;
        self.delivery_method = delivery_method;
        self.version += 1;
    }
}
