use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryResult;
use crate::domain::delivery::{Delivery, DeliveryInformation};
use crate::domain::medicine::Medicine;
use crate::domain::order::{Order, OrderItem, OrderStatus};

// ============================================================================
// Repository Traits
// ============================================================================
//
// Orders always come back with their items attached, each item carrying the
// name/price of its medicine when that medicine is still active. List queries
// are ordered newest first.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: &Order) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Order>>;

    async fn find_by_patient_id(&self, patient_id: Uuid) -> RepositoryResult<Vec<Order>>;

    /// Most recent order for the patient whose status is not `pending`.
    async fn find_latest_reviewed_by_patient_id(&self, patient_id: Uuid) -> RepositoryResult<Option<Order>>;

    async fn find_pending_by_doctor_id(&self, doctor_id: Uuid) -> RepositoryResult<Vec<Order>>;

    async fn find_by_doctor_id_and_statuses(
        &self,
        doctor_id: Uuid,
        statuses: &[OrderStatus],
    ) -> RepositoryResult<Vec<Order>>;

    /// Persist the scalar fields of the order (items are left alone).
    async fn update(&self, order: &Order) -> RepositoryResult<()>;

    /// Atomically delete the stored items, insert `order.items` and write
    /// `order.total_amount`.
    async fn replace_items(&self, order: &Order) -> RepositoryResult<()>;
}

#[async_trait]
pub trait OrderItemRepository: Send + Sync {
    async fn find_by_order_id(&self, order_id: Uuid) -> RepositoryResult<Vec<OrderItem>>;
}

#[async_trait]
pub trait MedicineRepository: Send + Sync {
    async fn find_all(&self) -> RepositoryResult<Vec<Medicine>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Medicine>>;
}

#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn create(&self, delivery: &Delivery) -> RepositoryResult<()>;

    async fn find_by_order_id(&self, order_id: Uuid) -> RepositoryResult<Option<Delivery>>;
}

#[async_trait]
pub trait DeliveryInformationRepository: Send + Sync {
    async fn create(&self, info: &DeliveryInformation) -> RepositoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<DeliveryInformation>>;

    async fn find_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<DeliveryInformation>>;

    async fn find_all(&self) -> RepositoryResult<Vec<DeliveryInformation>>;

    async fn update(&self, info: &DeliveryInformation) -> RepositoryResult<()>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
