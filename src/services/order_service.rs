use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::enrichment::{DeliverySummary, Enrichment};
use crate::auth::{Principal, Role};
use crate::clients::{AppointmentClient, PatientProfile, UserClient};
use crate::db::{DeliveryRepository, MedicineRepository, OrderItemRepository, OrderRepository};
use crate::domain::order::{Order, OrderCommand, OrderItem, OrderStatus};
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;

// ============================================================================
// OrderService - role-gated order lifecycle
// ============================================================================
//
// Every operation follows the same shape:
//
//   role check -> load order -> ownership check -> OrderCommand -> persist
//
// Totals are always derived from the stored items and the current medicine
// prices; a client never supplies an amount.
//
// ============================================================================

/// One line of an UpdateOrder request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedItem {
    pub medicine_id: Uuid,
    pub quantity: f64,
}

/// An order plus its best-effort delivery state.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub order: Order,
    pub delivery: Enrichment<DeliverySummary>,
}

/// What a doctor sees: the order, its delivery state and who the patient is.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorOrderView {
    pub order: Order,
    pub delivery: Enrichment<DeliverySummary>,
    pub patient: Enrichment<PatientProfile>,
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    order_items: Arc<dyn OrderItemRepository>,
    medicines: Arc<dyn MedicineRepository>,
    deliveries: Arc<dyn DeliveryRepository>,
    users: Arc<dyn UserClient>,
    appointments: Arc<dyn AppointmentClient>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        order_items: Arc<dyn OrderItemRepository>,
        medicines: Arc<dyn MedicineRepository>,
        deliveries: Arc<dyn DeliveryRepository>,
        users: Arc<dyn UserClient>,
        appointments: Arc<dyn AppointmentClient>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            orders,
            order_items,
            medicines,
            deliveries,
            users,
            appointments,
            metrics,
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Open a pending order assigned to the doctor of the patient's latest
    /// appointment. Items are added later by that doctor.
    pub async fn create_order(&self, principal: &Principal, note: Option<String>) -> AppResult<Order> {
        principal.require(Role::Patient, "only patients can create orders")?;

        let appointment = self
            .appointments
            .get_latest_appointment(principal.subject_id)
            .await
            .map_err(|err| AppError::internal("failed to get latest appointment", err))?
            .ok_or_else(|| AppError::BadRequest("patient has no appointment history".into()))?;

        let order = Order::place(principal.subject_id, appointment.doctor_id, note, Utc::now());
        self.orders
            .create(&order)
            .await
            .map_err(|err| AppError::internal("failed to create order", err))?;

        tracing::info!(
            order_id = %order.id,
            patient_id = %order.patient_id,
            doctor_id = %appointment.doctor_id,
            "Order created"
        );
        self.metrics.record_transition(order.status.as_str());
        Ok(order)
    }

    /// Replace the order's items wholesale and recompute its total.
    pub async fn update_order(
        &self,
        principal: &Principal,
        order_id: Uuid,
        requested: Vec<RequestedItem>,
    ) -> AppResult<Order> {
        principal.require(Role::Doctor, "only doctors can update orders")?;

        let mut order = self.load(order_id).await?;
        if !order.is_assigned_to(principal.subject_id) {
            return Err(AppError::Forbidden("doctor can only edit their own orders".into()));
        }

        // Resolve everything up front so an unknown medicine leaves the
        // stored items untouched.
        let mut items = Vec::with_capacity(requested.len());
        for line in requested {
            let medicine = self
                .medicines
                .find_by_id(line.medicine_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("medicine not found".into()))?;
            items.push(OrderItem::new(order.id, &medicine, line.quantity));
        }

        order.handle_command(OrderCommand::ReplaceItems { items }, Utc::now())?;
        self.orders.replace_items(&order).await?;

        tracing::info!(
            order_id = %order.id,
            item_count = order.items.len(),
            total_amount = order.total_amount,
            "Order items replaced"
        );
        Ok(order)
    }

    pub async fn cancel_order(&self, principal: &Principal, order_id: Uuid) -> AppResult<Order> {
        principal.require(Role::Doctor, "only doctors can cancel orders")?;
        let order = self
            .load_assigned(principal, order_id, "doctor can only cancel their own orders")
            .await?;
        self.apply(order, OrderCommand::Cancel).await
    }

    pub async fn approve_order(&self, principal: &Principal, order_id: Uuid) -> AppResult<Order> {
        principal.require(Role::Doctor, "only doctors can approve orders")?;
        let order = self
            .load_assigned(principal, order_id, "doctor can only approve their own orders")
            .await?;
        self.apply(order, OrderCommand::Approve).await
    }

    pub async fn reject_order(&self, principal: &Principal, order_id: Uuid) -> AppResult<Order> {
        principal.require(Role::Doctor, "only doctors can reject orders")?;
        let order = self
            .load_assigned(principal, order_id, "doctor can only reject their own orders")
            .await?;
        self.apply(order, OrderCommand::Reject).await
    }

    pub async fn pay_order(&self, principal: &Principal, order_id: Uuid) -> AppResult<Order> {
        principal.require(Role::Patient, "only patients can pay orders")?;

        let order = self.load(order_id).await?;
        if !order.belongs_to(principal.subject_id) {
            return Err(AppError::Forbidden("patient can only pay their own orders".into()));
        }
        self.apply(order, OrderCommand::Pay).await
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn get_order_by_id(&self, principal: &Principal, order_id: Uuid) -> AppResult<OrderView> {
        let order = self.load(order_id).await?;
        tracing::debug!(order_id = %order_id, caller = %principal.subject_id, "Fetched order");
        Ok(self.with_delivery(order).await)
    }

    /// The caller's orders as a patient, newest first.
    pub async fn get_order_history(&self, principal: &Principal) -> AppResult<Vec<OrderView>> {
        let orders = self
            .orders
            .find_by_patient_id(principal.subject_id)
            .await
            .map_err(|err| AppError::internal("failed to retrieve orders", err))?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.with_delivery(order).await);
        }
        Ok(views)
    }

    /// The caller's most recent order that a doctor has already acted on.
    pub async fn get_latest_order(&self, principal: &Principal) -> AppResult<OrderView> {
        let order = self.latest_reviewed(principal.subject_id).await?;
        Ok(self.with_delivery(order).await)
    }

    pub async fn get_latest_order_for_doctor(&self, principal: &Principal, patient_id: Uuid) -> AppResult<OrderView> {
        principal.require(Role::Doctor, "only doctors can access this endpoint")?;

        let order = self.latest_reviewed(patient_id).await?;
        if !order.is_assigned_to(principal.subject_id) {
            return Err(AppError::Forbidden(
                "doctor can only access their own patient's orders".into(),
            ));
        }
        Ok(self.with_delivery(order).await)
    }

    /// Pending orders waiting on the calling doctor.
    pub async fn get_pending_orders_for_doctor(&self, principal: &Principal) -> AppResult<Vec<DoctorOrderView>> {
        principal.require(Role::Doctor, "only doctors can access this endpoint")?;

        let orders = self
            .orders
            .find_pending_by_doctor_id(principal.subject_id)
            .await
            .map_err(|err| AppError::internal("failed to retrieve orders", err))?;
        Ok(self.for_doctor(orders).await)
    }

    /// Orders the doctor already reviewed, or only those in `status` when given.
    pub async fn get_order_history_for_doctor(
        &self,
        principal: &Principal,
        status: Option<OrderStatus>,
    ) -> AppResult<Vec<DoctorOrderView>> {
        principal.require(Role::Doctor, "only doctors can access this endpoint")?;

        let statuses = match status {
            Some(status) => vec![status],
            None => vec![OrderStatus::Approved, OrderStatus::Rejected],
        };
        let orders = self
            .orders
            .find_by_doctor_id_and_statuses(principal.subject_id, &statuses)
            .await
            .map_err(|err| AppError::internal("failed to retrieve orders", err))?;
        Ok(self.for_doctor(orders).await)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn load(&self, order_id: Uuid) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await
            .map_err(|err| AppError::internal("failed to retrieve order", err))?
            .ok_or_else(|| AppError::NotFound("order not found".into()))
    }

    async fn load_assigned(&self, principal: &Principal, order_id: Uuid, denied: &str) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        if !order.is_assigned_to(principal.subject_id) {
            return Err(AppError::Forbidden(denied.to_string()));
        }
        Ok(order)
    }

    async fn latest_reviewed(&self, patient_id: Uuid) -> AppResult<Order> {
        self.orders
            .find_latest_reviewed_by_patient_id(patient_id)
            .await
            .map_err(|err| AppError::internal("failed to retrieve order", err))?
            .ok_or_else(|| AppError::NotFound("order not found".into()))
    }

    /// Run a status command against freshly loaded items and persist it.
    async fn apply(&self, mut order: Order, command: OrderCommand) -> AppResult<Order> {
        order.items = self.order_items.find_by_order_id(order.id).await?;

        let previous = order.status;
        let command_name = command.name();
        order.handle_command(command, Utc::now())?;
        self.orders.update(&order).await?;

        tracing::info!(
            order_id = %order.id,
            command = command_name,
            from = %previous,
            to = %order.status,
            total_amount = order.total_amount,
            "Order transitioned"
        );
        self.metrics.record_transition(order.status.as_str());
        Ok(order)
    }

    async fn delivery_for(&self, order_id: Uuid) -> Enrichment<DeliverySummary> {
        match self.deliveries.find_by_order_id(order_id).await {
            Ok(delivery) => delivery.map(DeliverySummary::from).into(),
            Err(err) => {
                tracing::warn!(order_id = %order_id, error = %err, "Delivery lookup failed");
                self.metrics.record_enrichment_unavailable("delivery");
                Enrichment::Unavailable
            }
        }
    }

    async fn with_delivery(&self, order: Order) -> OrderView {
        let delivery = self.delivery_for(order.id).await;
        OrderView { order, delivery }
    }

    /// Attach delivery and patient data, resolving all patients in one batch.
    async fn for_doctor(&self, orders: Vec<Order>) -> Vec<DoctorOrderView> {
        let mut patient_ids: Vec<Uuid> = Vec::new();
        for order in &orders {
            if !patient_ids.contains(&order.patient_id) {
                patient_ids.push(order.patient_id);
            }
        }

        let profiles: Option<HashMap<Uuid, PatientProfile>> = if patient_ids.is_empty() {
            Some(HashMap::new())
        } else {
            match self.users.get_patients_by_ids(&patient_ids).await {
                Ok(profiles) => Some(profiles.into_iter().map(|p| (p.id, p)).collect()),
                Err(err) => {
                    tracing::warn!(patients = patient_ids.len(), error = %err, "Patient lookup failed");
                    self.metrics.record_enrichment_unavailable("user_service");
                    None
                }
            }
        };

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let patient = match &profiles {
                Some(profiles) => profiles.get(&order.patient_id).cloned().into(),
                None => Enrichment::Unavailable,
            };
            let delivery = self.delivery_for(order.id).await;
            views.push(DoctorOrderView {
                order,
                delivery,
                patient,
            });
        }
        views
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
