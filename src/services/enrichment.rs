use chrono::{DateTime, Utc};

use crate::domain::delivery::{Delivery, DeliveryStatus};

/// Outcome of a best-effort lookup attached to a response.
///
/// `Missing` means the lookup succeeded and found nothing; `Unavailable`
/// means the lookup itself failed and the data may well exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Found(T),
    Missing,
    Unavailable,
}

impl<T> Enrichment<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Enrichment::Found(value) => Some(value),
            Enrichment::Missing | Enrichment::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Enrichment::Unavailable)
    }
}

impl<T> From<Option<T>> for Enrichment<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Enrichment::Missing, Enrichment::Found)
    }
}

/// The delivery fields surfaced on an order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySummary {
    pub status: DeliveryStatus,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl From<Delivery> for DeliverySummary {
    fn from(delivery: Delivery) -> Self {
        Self {
            status: delivery.status,
            delivered_at: delivery.delivered_at,
        }
    }
}
