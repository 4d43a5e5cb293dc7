use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Principal;
use crate::db::DeliveryInformationRepository;
use crate::domain::delivery::{DeliveryInformation, DeliveryMethod};
use crate::error::{AppError, AppResult};

/// Fields a caller may set on a delivery information record.
#[derive(Debug, Clone)]
pub struct DeliveryInformationChanges {
    pub address: String,
    pub phone_number: String,
    pub delivery_method: DeliveryMethod,
}

impl DeliveryInformationChanges {
    fn validate(&self) -> AppResult<()> {
        if self.address.trim().is_empty() {
            return Err(AppError::BadRequest("address is required".into()));
        }
        if self.phone_number.trim().is_empty() {
            return Err(AppError::BadRequest("phone number is required".into()));
        }
        Ok(())
    }
}

pub struct DeliveryService {
    infos: Arc<dyn DeliveryInformationRepository>,
}

impl DeliveryService {
    pub fn new(infos: Arc<dyn DeliveryInformationRepository>) -> Self {
        Self { infos }
    }

    /// New record owned by the caller, starting at version 1.
    pub async fn create(
        &self,
        principal: &Principal,
        changes: DeliveryInformationChanges,
    ) -> AppResult<DeliveryInformation> {
        changes.validate()?;

        let info = DeliveryInformation::new(
            principal.subject_id,
            changes.address,
            changes.phone_number,
            changes.delivery_method,
        );
        self.infos
            .create(&info)
            .await
            .map_err(|err| AppError::internal("failed to create delivery information", err))?;

        tracing::info!(delivery_info_id = %info.id, user_id = %info.user_id, "Created delivery information");
        Ok(info)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<DeliveryInformation> {
        self.infos
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("delivery information not found".into()))
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<DeliveryInformation>> {
        Ok(self.infos.find_by_user_id(user_id).await?)
    }

    pub async fn get_all(&self) -> AppResult<Vec<DeliveryInformation>> {
        Ok(self.infos.find_all().await?)
    }

    /// Overwrite in place and bump the version. Last write wins.
    pub async fn update(&self, id: Uuid, changes: DeliveryInformationChanges) -> AppResult<DeliveryInformation> {
        changes.validate()?;

        let mut info = self.get_by_id(id).await?;
        info.revise(changes.address, changes.phone_number, changes.delivery_method);
        self.infos.update(&info).await?;

        tracing::info!(delivery_info_id = %info.id, version = info.version, "Updated delivery information");
        Ok(info)
    }

    /// Hard delete; returns when it happened.
    pub async fn delete(&self, id: Uuid) -> AppResult<DateTime<Utc>> {
        self.get_by_id(id).await?;
        self.infos.delete(id).await?;

        tracing::info!(delivery_info_id = %id, "Deleted delivery information");
        Ok(Utc::now())
    }
}
