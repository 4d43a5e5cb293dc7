//! Fakes and fixtures shared by service and HTTP tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::Principal;
use crate::clients::{Appointment, AppointmentClient, ClientError, ClientResult, PatientProfile, UserClient};
use crate::db::InMemoryStore;
use crate::domain::medicine::Medicine;
use crate::domain::order::Order;
use crate::metrics::Metrics;
use crate::services::{DeliveryService, MedicineService, OrderService};

pub fn medicine(name: &str, price: f64) -> Medicine {
    let now = Utc::now();
    Medicine {
        id: Uuid::new_v4(),
        name: name.to_string(),
        price,
        stock: 100.0,
        unit: "tablet".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn patient_profile(id: Uuid, first_name: &str) -> PatientProfile {
    PatientProfile {
        id,
        first_name: first_name.to_string(),
        last_name: "Jaidee".to_string(),
        gender: "male".to_string(),
        phone_number: "0811111111".to_string(),
    }
}

#[derive(Default)]
pub struct FakeUserClient {
    profiles: Mutex<Vec<PatientProfile>>,
    failing: AtomicBool,
}

impl FakeUserClient {
    pub fn add(&self, profile: PatientProfile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserClient for FakeUserClient {
    async fn get_patients_by_ids(&self, ids: &[Uuid]) -> ClientResult<Vec<PatientProfile>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::UnexpectedStatus {
                service: "user_service",
                status: 503,
            });
        }
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeAppointmentClient {
    latest: Mutex<HashMap<Uuid, Appointment>>,
    failing: AtomicBool,
}

impl FakeAppointmentClient {
    pub fn book(&self, patient_id: Uuid, doctor_id: Uuid) {
        self.latest.lock().unwrap().insert(
            patient_id,
            Appointment {
                id: Uuid::new_v4(),
                patient_id,
                doctor_id,
            },
        );
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AppointmentClient for FakeAppointmentClient {
    async fn get_latest_appointment(&self, patient_id: Uuid) -> ClientResult<Option<Appointment>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::CircuitOpen("appointment_service"));
        }
        Ok(self.latest.lock().unwrap().get(&patient_id).cloned())
    }
}

/// Every service wired against one in-memory store and fake clients.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub users: Arc<FakeUserClient>,
    pub appointments: Arc<FakeAppointmentClient>,
    pub metrics: Arc<Metrics>,
    pub orders: Arc<OrderService>,
    pub medicines: Arc<MedicineService>,
    pub deliveries: Arc<DeliveryService>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let users = Arc::new(FakeUserClient::default());
        let appointments = Arc::new(FakeAppointmentClient::default());
        let metrics = Arc::new(Metrics::new().unwrap());

        let orders = Arc::new(OrderService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            users.clone(),
            appointments.clone(),
            metrics.clone(),
        ));
        let medicines = Arc::new(MedicineService::new(store.clone()));
        let deliveries = Arc::new(DeliveryService::new(store.clone()));

        Self {
            store,
            users,
            appointments,
            metrics,
            orders,
            medicines,
            deliveries,
        }
    }

    /// A pending order from a fresh patient, assigned to a fresh doctor.
    pub async fn pending_order(&self) -> (Order, Principal, Principal) {
        let patient = Principal::patient(Uuid::new_v4());
        let doctor = Principal::doctor(Uuid::new_v4());
        self.appointments.book(patient.subject_id, doctor.subject_id);

        let order = self.orders.create_order(&patient, None).await.unwrap();
        (order, patient, doctor)
    }
}
