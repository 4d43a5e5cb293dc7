use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OrderError {
    #[error("order already paid or processed (status: {0})")]
    AlreadySettled(OrderStatus),

    #[error("order cannot be paid in current state (status: {0})")]
    NotPayable(OrderStatus),

    #[error("invalid item quantity: {0}")]
    InvalidQuantity(f64),

    #[error("order total out of range: {0}")]
    TotalOutOfRange(f64),

    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}
