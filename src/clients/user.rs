use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::{build_http_client, ClientError, ClientResult, PatientProfile, UserClient};
use crate::config::ServiceClientConfig;
use crate::utils::CircuitBreaker;

const SERVICE: &str = "user_service";

pub struct HttpUserClient {
    http: reqwest::Client,
    base_url: String,
    breaker: CircuitBreaker,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [Uuid],
}

impl HttpUserClient {
    pub fn new(config: &ServiceClientConfig, breaker: CircuitBreaker) -> ClientResult<Self> {
        Ok(Self {
            http: build_http_client(config.timeout)?,
            base_url: config.base_url.clone(),
            breaker,
        })
    }

    fn batch_url(&self) -> String {
        format!("{}/api/user/v1/patients/batch", self.base_url)
    }

    async fn fetch(&self, ids: &[Uuid]) -> ClientResult<Vec<PatientProfile>> {
        let response = self
            .http
            .post(self.batch_url())
            .json(&BatchRequest { ids })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl UserClient for HttpUserClient {
    async fn get_patients_by_ids(&self, ids: &[Uuid]) -> ClientResult<Vec<PatientProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = self
            .breaker
            .call(self.fetch(ids))
            .await
            .map_err(|err| ClientError::from_breaker(SERVICE, err))?;

        tracing::debug!(requested = ids.len(), returned = profiles.len(), "Fetched patient profiles");
        Ok(profiles)
    }
}
