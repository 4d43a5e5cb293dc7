use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clients::PatientProfile;
use crate::domain::delivery::{DeliveryInformation, DeliveryMethod, DeliveryStatus};
use crate::domain::medicine::Medicine;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::services::{DoctorOrderView, OrderView};

// ============================================================================
// Wire Types - request bodies and response shapes
// ============================================================================

pub fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// Requests ------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub medicine_id: String,
    pub quantity: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub order_items: Vec<OrderItemRequest>,
}

/// Body of cancel/confirm/reject/pay.
#[derive(Debug, Deserialize)]
pub struct OrderIdRequest {
    #[serde(default)]
    pub order_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorHistoryQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeliveryInfoRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    pub delivery_method: DeliveryMethod,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryInfoRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    pub delivery_method: DeliveryMethod,
}

#[derive(Debug, Deserialize)]
pub struct DeleteDeliveryInfoRequest {
    #[serde(default)]
    pub id: String,
}

// Orders --------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OrderIdResponse {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

impl From<&Order> for TransitionResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemDto {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub quantity: f64,
}

impl From<&OrderItem> for OrderItemDto {
    fn from(item: &OrderItem) -> Self {
        Self {
            medicine_id: item.medicine_id,
            medicine_name: item.medicine_name().to_string(),
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailDto {
    pub order_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub total_amount: f64,
    pub note: Option<String>,
    pub submitted_at: Option<String>,
    pub reviewed_at: Option<String>,
    pub status: OrderStatus,
    pub delivery_status: Option<DeliveryStatus>,
    pub delivery_at: Option<String>,
    pub order_items: Vec<OrderItemDto>,
}

impl From<&OrderView> for OrderDetailDto {
    fn from(view: &OrderView) -> Self {
        let order = &view.order;
        let delivery = view.delivery.found();

        Self {
            order_id: order.id,
            patient_id: order.patient_id,
            doctor_id: order.doctor_id,
            total_amount: order.total_amount,
            note: order.note.clone(),
            submitted_at: order.submitted_at.as_ref().map(rfc3339),
            reviewed_at: order.reviewed_at.as_ref().map(rfc3339),
            status: order.status,
            delivery_status: delivery.map(|d| d.status),
            delivery_at: delivery.and_then(|d| d.delivered_at.as_ref()).map(rfc3339),
            order_items: order.items.iter().map(OrderItemDto::from).collect(),
        }
    }
}

/// A list entry: the detail plus audit timestamps.
#[derive(Debug, Serialize)]
pub struct OrderHistoryDto {
    #[serde(flatten)]
    pub detail: OrderDetailDto,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&OrderView> for OrderHistoryDto {
    fn from(view: &OrderView) -> Self {
        Self {
            detail: OrderDetailDto::from(view),
            created_at: rfc3339(&view.order.created_at),
            updated_at: rfc3339(&view.order.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PatientInfoDto {
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub phone_number: String,
}

impl From<&PatientProfile> for PatientInfoDto {
    fn from(profile: &PatientProfile) -> Self {
        Self {
            patient_id: profile.id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            gender: profile.gender.clone(),
            phone_number: profile.phone_number.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorOrderDto {
    #[serde(flatten)]
    pub history: OrderHistoryDto,
    pub patient_info: Option<PatientInfoDto>,
}

impl From<DoctorOrderView> for DoctorOrderDto {
    fn from(view: DoctorOrderView) -> Self {
        let patient_info = view.patient.found().map(PatientInfoDto::from);
        let order_view = OrderView {
            order: view.order,
            delivery: view.delivery,
        };
        Self {
            history: OrderHistoryDto::from(&order_view),
            patient_info,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse<T> {
    pub orders: Vec<T>,
    pub total: usize,
}

impl<T> OrderListResponse<T> {
    pub fn new(orders: Vec<T>) -> Self {
        let total = orders.len();
        Self { orders, total }
    }
}

// Medicines -----------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MedicineDto {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: f64,
    pub unit: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Medicine> for MedicineDto {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            price: medicine.price,
            stock: medicine.stock,
            unit: medicine.unit,
            created_at: rfc3339(&medicine.created_at),
            updated_at: rfc3339(&medicine.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MedicineListResponse {
    pub medicines: Vec<MedicineDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct MedicineResponse {
    pub medicine: MedicineDto,
}

// Delivery information ------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DeliveryInfoDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub phone_number: String,
    pub version: i32,
    pub delivery_method: DeliveryMethod,
    pub created_at: String,
}

impl From<DeliveryInformation> for DeliveryInfoDto {
    fn from(info: DeliveryInformation) -> Self {
        Self {
            id: info.id,
            user_id: info.user_id,
            address: info.address,
            phone_number: info.phone_number,
            version: info.version,
            delivery_method: info.delivery_method,
            created_at: rfc3339(&info.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeliveryInfoResponse {
    pub delivery_info: DeliveryInfoDto,
}

#[derive(Debug, Serialize)]
pub struct DeliveryInfoListResponse {
    pub delivery_infos: Vec<DeliveryInfoDto>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted_at: String,
}
