// ============================================================================
// External Clients - user profiles and appointments
// ============================================================================
//
// Both clients are black-box RPCs behind an `async_trait` seam so services can
// be tested with in-process fakes. The HTTP implementations share one
// reqwest client per service and fail fast when their circuit is open.
//
// ============================================================================

mod appointment;
mod user;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::CircuitBreakerError;

pub use appointment::HttpAppointmentClient;
pub use user::HttpUserClient;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("circuit breaker for {0} is open")]
    CircuitOpen(&'static str),
}

impl ClientError {
    fn from_breaker(service: &'static str, err: CircuitBreakerError<ClientError>) -> Self {
        match err {
            CircuitBreakerError::CircuitOpen => ClientError::CircuitOpen(service),
            CircuitBreakerError::OperationFailed(inner) => inner,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Display data for a patient, owned by the user service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

#[async_trait]
pub trait UserClient: Send + Sync {
    /// Profiles for the given patients; unknown IDs are simply absent.
    async fn get_patients_by_ids(&self, ids: &[Uuid]) -> ClientResult<Vec<PatientProfile>>;
}

#[async_trait]
pub trait AppointmentClient: Send + Sync {
    /// The patient's most recent appointment, `None` if they never had one.
    async fn get_latest_appointment(&self, patient_id: Uuid) -> ClientResult<Option<Appointment>>;
}

fn build_http_client(timeout: std::time::Duration) -> ClientResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
