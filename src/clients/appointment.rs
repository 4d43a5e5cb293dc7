use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use super::{build_http_client, Appointment, AppointmentClient, ClientError, ClientResult};
use crate::config::ServiceClientConfig;
use crate::utils::CircuitBreaker;

const SERVICE: &str = "appointment_service";

pub struct HttpAppointmentClient {
    http: reqwest::Client,
    base_url: String,
    breaker: CircuitBreaker,
}

impl HttpAppointmentClient {
    pub fn new(config: &ServiceClientConfig, breaker: CircuitBreaker) -> ClientResult<Self> {
        Ok(Self {
            http: build_http_client(config.timeout)?,
            base_url: config.base_url.clone(),
            breaker,
        })
    }

    fn latest_url(&self, patient_id: Uuid) -> String {
        format!(
            "{}/api/appointment/v1/appointments/patient/{patient_id}/latest",
            self.base_url
        )
    }

    async fn fetch(&self, patient_id: Uuid) -> ClientResult<Option<Appointment>> {
        let response = self.http.get(self.latest_url(patient_id)).send().await?;

        // 404 is an answer, not a failure: the patient has no appointments.
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(ClientError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl AppointmentClient for HttpAppointmentClient {
    async fn get_latest_appointment(&self, patient_id: Uuid) -> ClientResult<Option<Appointment>> {
        let appointment = self
            .breaker
            .call(self.fetch(patient_id))
            .await
            .map_err(|err| ClientError::from_breaker(SERVICE, err))?;

        tracing::debug!(
            patient_id = %patient_id,
            found = appointment.is_some(),
            "Looked up latest appointment"
        );
        Ok(appointment)
    }
}
