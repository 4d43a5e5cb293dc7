use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::{round_to_cents, total_amount, OrderItem, OrderStatus, MAX_AMOUNT};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Lifecycle observed in the service:
//
//   pending  -> approved | rejected | cancelled | paid
//   approved -> paid
//   (any)    -> cancelled
//
// paid -> processing -> shipped -> delivered has no command here; those
// states are only reached by other systems writing to the store.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,

    // Current State
    pub total_amount: f64,
    pub note: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,

    // Audit Trail
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A freshly submitted order: pending, no items, zero total.
    pub fn place(patient_id: Uuid, doctor_id: Uuid, note: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            patient_id,
            doctor_id: Some(doctor_id),
            total_amount: 0.0,
            note,
            status: OrderStatus::Pending,
            items: Vec::new(),
            submitted_at: Some(now),
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_assigned_to(&self, doctor_id: Uuid) -> bool {
        self.doctor_id == Some(doctor_id)
    }

    pub fn belongs_to(&self, patient_id: Uuid) -> bool {
        self.patient_id == patient_id
    }

    /// Derive the total from the current items, ignoring whatever was stored.
    pub fn recalculate_total(&mut self) {
        self.total_amount = total_amount(&self.items);
    }

    /// Validate a command against the current state and apply it.
    ///
    /// Role and ownership checks belong to the caller; this only enforces
    /// the rules that depend on the order itself.
    pub fn handle_command(&mut self, command: OrderCommand, now: DateTime<Utc>) -> Result<(), OrderError> {
        match command {
            OrderCommand::ReplaceItems { mut items } => {
                Self::normalize_items(&mut items)?;
                let total = total_amount(&items);
                if total > MAX_AMOUNT {
                    return Err(OrderError::TotalOutOfRange(total));
                }
                self.items = items;
                self.total_amount = total;
            }

            OrderCommand::Approve => {
                self.recalculate_total();
                self.status = OrderStatus::Approved;
                self.reviewed_at = Some(now);
            }

            OrderCommand::Reject => {
                self.recalculate_total();
                self.status = OrderStatus::Rejected;
                self.reviewed_at = Some(now);
            }

            // Unconditional: a delivered order can still be cancelled.
            OrderCommand::Cancel => {
                self.status = OrderStatus::Cancelled;
            }

            OrderCommand::Pay => {
                if self.status.is_settled() {
                    return Err(OrderError::AlreadySettled(self.status));
                }
                if self.status.is_closed() {
                    return Err(OrderError::NotPayable(self.status));
                }
                self.recalculate_total();
                self.status = OrderStatus::Paid;
            }
        }

        self.updated_at = now;
        Ok(())
    }

    /// Round quantities to the stored precision, then check the result is
    /// still a positive amount the column can hold.
    fn normalize_items(items: &mut [OrderItem]) -> Result<(), OrderError> {
        for item in items.iter_mut() {
            if !item.quantity.is_finite() {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
            let quantity = round_to_cents(item.quantity);
            if quantity <= 0.0 || quantity > MAX_AMOUNT {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
            item.quantity = quantity;
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::medicine::Medicine;

    fn medicine(price: f64) -> Medicine {
        let now = Utc::now();
        Medicine {
            id: Uuid::new_v4(),
            name: "Amoxicillin".to_string(),
            price,
            stock: 10.0,
            unit: "capsule".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn pending_order() -> Order {
        Order::place(Uuid::new_v4(), Uuid::new_v4(), Some("after meals".into()), Utc::now())
    }

    #[test]
    fn test_place_starts_pending_with_zero_total() {
        let now = Utc::now();
        let order = Order::place(Uuid::new_v4(), Uuid::new_v4(), None, now);

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 0.0);
        assert_eq!(order.submitted_at, Some(now));
        assert!(order.items.is_empty());
        assert!(order.reviewed_at.is_none());
    }

    #[test]
    fn test_replace_items_recomputes_total_without_status_change() {
        let mut order = pending_order();
        let items = vec![OrderItem::new(order.id, &medicine(10.0), 2.0)];

        order
            .handle_command(OrderCommand::ReplaceItems { items }, Utc::now())
            .unwrap();

        assert_eq!(order.total_amount, 20.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_replace_items_rejects_non_positive_quantity() {
        let mut order = pending_order();
        let items = vec![OrderItem::new(order.id, &medicine(10.0), 0.0)];

        let result = order.handle_command(OrderCommand::ReplaceItems { items }, Utc::now());

        assert_eq!(result, Err(OrderError::InvalidQuantity(0.0)));
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_replace_items_rejects_quantity_that_rounds_to_zero() {
        let mut order = pending_order();
        let items = vec![OrderItem::new(order.id, &medicine(10.0), 0.001)];

        let result = order.handle_command(OrderCommand::ReplaceItems { items }, Utc::now());

        assert_eq!(result, Err(OrderError::InvalidQuantity(0.001)));
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_replace_items_totals_the_stored_quantity() {
        let mut order = pending_order();
        let items = vec![OrderItem::new(order.id, &medicine(10.0), 1.006)];

        order
            .handle_command(OrderCommand::ReplaceItems { items }, Utc::now())
            .unwrap();
        let total_after_update = order.total_amount;
        order.handle_command(OrderCommand::Approve, Utc::now()).unwrap();

        assert_eq!(order.items[0].quantity, 1.01);
        assert_eq!(total_after_update, 10.1);
        assert_eq!(order.total_amount, total_after_update);
    }

    #[test]
    fn test_replace_items_rejects_amounts_beyond_column_range() {
        let mut order = pending_order();
        let items = vec![OrderItem::new(order.id, &medicine(10.0), 1e12)];
        let result = order.handle_command(OrderCommand::ReplaceItems { items }, Utc::now());
        assert_eq!(result, Err(OrderError::InvalidQuantity(1e12)));

        let items = vec![OrderItem::new(order.id, &medicine(1e6), 1e6)];
        let result = order.handle_command(OrderCommand::ReplaceItems { items }, Utc::now());
        assert!(matches!(result, Err(OrderError::TotalOutOfRange(_))));
        assert_eq!(order.total_amount, 0.0);
    }

    #[test]
    fn test_approve_ignores_stale_total_and_stamps_review() {
        let mut order = pending_order();
        order.items = vec![OrderItem::new(order.id, &medicine(10.0), 2.0)];
        order.total_amount = 1.0;
        let now = Utc::now();

        order.handle_command(OrderCommand::Approve, now).unwrap();

        assert_eq!(order.status, OrderStatus::Approved);
        assert_eq!(order.total_amount, 20.0);
        assert_eq!(order.reviewed_at, Some(now));
    }

    #[test]
    fn test_reject_stamps_review() {
        let mut order = pending_order();
        order.handle_command(OrderCommand::Reject, Utc::now()).unwrap();

        assert_eq!(order.status, OrderStatus::Rejected);
        assert!(order.reviewed_at.is_some());
    }

    #[test]
    fn test_cancel_is_unconditional() {
        for status in OrderStatus::ALL {
            let mut order = pending_order();
            order.status = status;
            order.handle_command(OrderCommand::Cancel, Utc::now()).unwrap();
            assert_eq!(order.status, OrderStatus::Cancelled);
        }
    }

    #[test]
    fn test_pay_from_pending_or_approved() {
        for status in [OrderStatus::Pending, OrderStatus::Approved] {
            let mut order = pending_order();
            order.status = status;
            order.handle_command(OrderCommand::Pay, Utc::now()).unwrap();
            assert_eq!(order.status, OrderStatus::Paid);
        }
    }

    #[test]
    fn test_pay_settled_order_conflicts() {
        for status in [
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let mut order = pending_order();
            order.status = status;
            let result = order.handle_command(OrderCommand::Pay, Utc::now());
            assert_eq!(result, Err(OrderError::AlreadySettled(status)));
            assert_eq!(order.status, status);
        }
    }

    #[test]
    fn test_pay_closed_order_is_refused() {
        for status in [OrderStatus::Cancelled, OrderStatus::Rejected] {
            let mut order = pending_order();
            order.status = status;
            let result = order.handle_command(OrderCommand::Pay, Utc::now());
            assert_eq!(result, Err(OrderError::NotPayable(status)));
        }
    }

    #[test]
    fn test_ownership_helpers() {
        let patient = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let order = Order::place(patient, doctor, None, Utc::now());

        assert!(order.belongs_to(patient));
        assert!(!order.belongs_to(doctor));
        assert!(order.is_assigned_to(doctor));
        assert!(!order.is_assigned_to(patient));
    }
}
