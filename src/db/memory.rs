use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    DeliveryInformationRepository, DeliveryRepository, MedicineLifecycle, MedicineRepository, OrderItemRepository,
    OrderRepository, RepositoryError, RepositoryResult,
};
use crate::domain::delivery::{Delivery, DeliveryInformation};
use crate::domain::medicine::Medicine;
use crate::domain::order::{MedicineRef, Order, OrderItem, OrderStatus};

// ============================================================================
// InMemoryStore - every repository trait over one mutex-guarded state
// ============================================================================
//
// Mirrors the Postgres semantics the services rely on: items are joined with
// active medicines on read, soft-deleted medicines are invisible, lists come
// back newest first and replace_items is all-or-nothing.
//
// ============================================================================

#[derive(Default)]
struct MemoryState {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    medicines: Vec<(Medicine, MedicineLifecycle)>,
    deliveries: Vec<Delivery>,
    delivery_infos: Vec<DeliveryInformation>,
    failing_delivery_lookups: bool,
}

impl MemoryState {
    fn active_medicine(&self, id: Uuid) -> Option<&Medicine> {
        self.medicines
            .iter()
            .find(|(m, lifecycle)| m.id == id && *lifecycle == MedicineLifecycle::Active)
            .map(|(m, _)| m)
    }

    fn items_for(&self, order_id: Uuid) -> Vec<OrderItem> {
        self.items
            .iter()
            .filter(|item| item.order_id == order_id)
            .map(|item| {
                let mut item = item.clone();
                item.medicine = self.active_medicine(item.medicine_id).map(|m| MedicineRef {
                    name: m.name.clone(),
                    price: m.price,
                });
                item
            })
            .collect()
    }

    fn hydrate(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.items = self.items_for(order.id);
        order
    }

    fn select(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| predicate(order))
            .map(|order| self.hydrate(order))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_medicine(&self, medicine: Medicine) {
        self.state().medicines.push((medicine, MedicineLifecycle::Active));
    }

    pub fn soft_delete_medicine(&self, id: Uuid) {
        for (medicine, lifecycle) in self.state().medicines.iter_mut() {
            if medicine.id == id {
                *lifecycle = MedicineLifecycle::Deleted;
                medicine.updated_at = Utc::now();
            }
        }
    }

    /// Make every delivery lookup fail, as an unreachable store would.
    pub fn fail_delivery_lookups(&self, failing: bool) {
        self.state().failing_delivery_lookups = failing;
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(&self, order: &Order) -> RepositoryResult<()> {
        let mut state = self.state();
        let mut stored = order.clone();
        state.items.extend(std::mem::take(&mut stored.items));
        state.orders.push(stored);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Order>> {
        let state = self.state();
        Ok(state.orders.iter().find(|o| o.id == id).map(|o| state.hydrate(o)))
    }

    async fn find_by_patient_id(&self, patient_id: Uuid) -> RepositoryResult<Vec<Order>> {
        Ok(self.state().select(|o| o.patient_id == patient_id))
    }

    async fn find_latest_reviewed_by_patient_id(&self, patient_id: Uuid) -> RepositoryResult<Option<Order>> {
        Ok(self
            .state()
            .select(|o| o.patient_id == patient_id && o.status != OrderStatus::Pending)
            .into_iter()
            .next())
    }

    async fn find_pending_by_doctor_id(&self, doctor_id: Uuid) -> RepositoryResult<Vec<Order>> {
        Ok(self
            .state()
            .select(|o| o.doctor_id == Some(doctor_id) && o.status == OrderStatus::Pending))
    }

    async fn find_by_doctor_id_and_statuses(
        &self,
        doctor_id: Uuid,
        statuses: &[OrderStatus],
    ) -> RepositoryResult<Vec<Order>> {
        Ok(self
            .state()
            .select(|o| o.doctor_id == Some(doctor_id) && statuses.contains(&o.status)))
    }

    async fn update(&self, order: &Order) -> RepositoryResult<()> {
        let mut state = self.state();
        let stored = state
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(RepositoryError::NotFound("order"))?;

        *stored = order.clone();
        stored.items.clear();
        Ok(())
    }

    async fn replace_items(&self, order: &Order) -> RepositoryResult<()> {
        let mut guard = self.state();
        let state = &mut *guard;
        let stored = state
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(RepositoryError::NotFound("order"))?;

        stored.total_amount = order.total_amount;
        stored.updated_at = order.updated_at;
        state.items.retain(|item| item.order_id != order.id);
        state.items.extend(order.items.iter().cloned().map(|mut item| {
            item.medicine = None;
            item
        }));
        Ok(())
    }
}

#[async_trait]
impl OrderItemRepository for InMemoryStore {
    async fn find_by_order_id(&self, order_id: Uuid) -> RepositoryResult<Vec<OrderItem>> {
        Ok(self.state().items_for(order_id))
    }
}

#[async_trait]
impl MedicineRepository for InMemoryStore {
    async fn find_all(&self) -> RepositoryResult<Vec<Medicine>> {
        let state = self.state();
        let mut medicines: Vec<Medicine> = state
            .medicines
            .iter()
            .filter(|(_, lifecycle)| *lifecycle == MedicineLifecycle::Active)
            .map(|(m, _)| m.clone())
            .collect();
        medicines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(medicines)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Medicine>> {
        Ok(self.state().active_medicine(id).cloned())
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryStore {
    async fn create(&self, delivery: &Delivery) -> RepositoryResult<()> {
        self.state().deliveries.push(delivery.clone());
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: Uuid) -> RepositoryResult<Option<Delivery>> {
        let state = self.state();
        if state.failing_delivery_lookups {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(state.deliveries.iter().find(|d| d.order_id == order_id).cloned())
    }
}

#[async_trait]
impl DeliveryInformationRepository for InMemoryStore {
    async fn create(&self, info: &DeliveryInformation) -> RepositoryResult<()> {
        self.state().delivery_infos.push(info.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<DeliveryInformation>> {
        Ok(self.state().delivery_infos.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<DeliveryInformation>> {
        let mut infos: Vec<DeliveryInformation> = self
            .state()
            .delivery_infos
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(infos)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<DeliveryInformation>> {
        let mut infos = self.state().delivery_infos.clone();
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(infos)
    }

    async fn update(&self, info: &DeliveryInformation) -> RepositoryResult<()> {
        let mut state = self.state();
        let stored = state
            .delivery_infos
            .iter_mut()
            .find(|i| i.id == info.id)
            .ok_or(RepositoryError::NotFound("delivery information"))?;
        *stored = info.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state();
        let before = state.delivery_infos.len();
        state.delivery_infos.retain(|i| i.id != id);
        if state.delivery_infos.len() == before {
            return Err(RepositoryError::NotFound("delivery information"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicine(name: &str, price: f64) -> Medicine {
        let now = Utc::now();
        Medicine {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            stock: 5.0,
            unit: "box".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_soft_deleted_medicine_is_invisible() {
        let store = InMemoryStore::new();
        let kept = medicine("Cetirizine", 3.0);
        let dropped = medicine("Codeine", 8.0);
        store.insert_medicine(kept.clone());
        store.insert_medicine(dropped.clone());

        store.soft_delete_medicine(dropped.id);

        assert!(MedicineRepository::find_by_id(&store, dropped.id).await.unwrap().is_none());
        let all = MedicineRepository::find_all(&store).await.unwrap();
        assert_eq!(all, vec![kept]);
    }

    #[tokio::test]
    async fn test_replace_items_discards_previous_items() {
        let store = InMemoryStore::new();
        let med = medicine("Metformin", 2.0);
        store.insert_medicine(med.clone());

        let mut order = Order::place(Uuid::new_v4(), Uuid::new_v4(), None, Utc::now());
        OrderRepository::create(&store, &order).await.unwrap();

        order.items = vec![OrderItem::new(order.id, &med, 1.0), OrderItem::new(order.id, &med, 2.0)];
        order.total_amount = 6.0;
        store.replace_items(&order).await.unwrap();

        order.items = vec![OrderItem::new(order.id, &med, 5.0)];
        order.total_amount = 10.0;
        store.replace_items(&order).await.unwrap();

        let stored = OrderRepository::find_by_id(&store, order.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].quantity, 5.0);
        assert_eq!(stored.total_amount, 10.0);
    }

    #[tokio::test]
    async fn test_latest_reviewed_skips_pending_orders() {
        let store = InMemoryStore::new();
        let patient = Uuid::new_v4();

        let mut reviewed = Order::place(patient, Uuid::new_v4(), None, Utc::now());
        reviewed.status = OrderStatus::Approved;
        OrderRepository::create(&store, &reviewed).await.unwrap();
        let pending = Order::place(patient, Uuid::new_v4(), None, Utc::now());
        OrderRepository::create(&store, &pending).await.unwrap();

        let latest = store.find_latest_reviewed_by_patient_id(patient).await.unwrap().unwrap();
        assert_eq!(latest.id, reviewed.id);
    }

    #[tokio::test]
    async fn test_update_missing_delivery_information_is_not_found() {
        let store = InMemoryStore::new();
        let info = DeliveryInformation::new(
            Uuid::new_v4(),
            "1 Main St".into(),
            "0800000000".into(),
            crate::domain::delivery::DeliveryMethod::Flash,
        );

        let result = DeliveryInformationRepository::update(&store, &info).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
