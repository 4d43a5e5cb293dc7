// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// - Value objects (OrderStatus, OrderItem, MedicineRef)
// - Commands (Approve, Reject, Pay, ...)
// - Errors (OrderError enum)
// - Aggregate (Order with its transition rules)
//
// ============================================================================

pub mod aggregate;
pub mod commands;
pub mod errors;
pub mod value_objects;

pub use aggregate::*;
pub use commands::*;
pub use errors::*;
pub use value_objects::*;
