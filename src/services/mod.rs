// ============================================================================
// Application Services
// ============================================================================
//
// Each call takes the authenticated `Principal` explicitly, checks role and
// ownership, then drives the domain through the repository seams.
//
// ============================================================================

mod delivery_service;
mod enrichment;
mod medicine_service;
mod order_service;

pub use delivery_service::{DeliveryInformationChanges, DeliveryService};
pub use enrichment::Enrichment;
pub use medicine_service::MedicineService;
pub use order_service::{DoctorOrderView, OrderService, OrderView, RequestedItem};
