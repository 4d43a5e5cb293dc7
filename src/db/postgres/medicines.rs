use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{Database, MedicineLifecycle, MedicineRepository, RepositoryResult};
use crate::domain::medicine::Medicine;

#[derive(FromRow)]
struct MedicineRow {
    id: Uuid,
    name: String,
    price: f64,
    stock: f64,
    unit: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl MedicineRow {
    fn lifecycle(&self) -> MedicineLifecycle {
        match self.deleted_at {
            Some(_) => MedicineLifecycle::Deleted,
            None => MedicineLifecycle::Active,
        }
    }

    fn into_active(self) -> Option<Medicine> {
        if self.lifecycle() == MedicineLifecycle::Deleted {
            return None;
        }

        Some(Medicine {
            id: self.id,
            name: self.name,
            price: self.price,
            stock: self.stock,
            unit: self.unit,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgMedicineRepository {
    db: Database,
}

impl PgMedicineRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MedicineRepository for PgMedicineRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Medicine>> {
        let rows = sqlx::query_as::<_, MedicineRow>(
            "SELECT id, name, price::float8 AS price, stock::float8 AS stock, unit, \
                    created_at, updated_at, deleted_at \
             FROM medicines WHERE deleted_at IS NULL ORDER BY name, id",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().filter_map(MedicineRow::into_active).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Medicine>> {
        let row = sqlx::query_as::<_, MedicineRow>(
            "SELECT id, name, price::float8 AS price, stock::float8 AS stock, unit, \
                    created_at, updated_at, deleted_at \
             FROM medicines WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.and_then(MedicineRow::into_active))
    }
}
