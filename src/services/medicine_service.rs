use std::sync::Arc;

use uuid::Uuid;

use crate::db::MedicineRepository;
use crate::domain::medicine::Medicine;
use crate::error::{AppError, AppResult};

/// Read-only access to the catalog. Soft-deleted medicines never surface.
pub struct MedicineService {
    medicines: Arc<dyn MedicineRepository>,
}

impl MedicineService {
    pub fn new(medicines: Arc<dyn MedicineRepository>) -> Self {
        Self { medicines }
    }

    pub async fn get_all_medicines(&self) -> AppResult<Vec<Medicine>> {
        self.medicines
            .find_all()
            .await
            .map_err(|err| AppError::internal("failed to retrieve medicines", err))
    }

    pub async fn get_medicine_by_id(&self, id: Uuid) -> AppResult<Medicine> {
        self.medicines
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("medicine not found".into()))
    }
}
