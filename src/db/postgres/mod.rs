mod deliveries;
mod medicines;
mod orders;

pub use deliveries::{PgDeliveryInformationRepository, PgDeliveryRepository};
pub use medicines::PgMedicineRepository;
pub use orders::{PgOrderItemRepository, PgOrderRepository};
