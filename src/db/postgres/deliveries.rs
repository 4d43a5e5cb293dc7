use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{Database, DeliveryInformationRepository, DeliveryRepository, RepositoryError, RepositoryResult};
use crate::domain::delivery::{Delivery, DeliveryInformation};

// ============================================================================
// PgDeliveryRepository
// ============================================================================

pub struct PgDeliveryRepository {
    db: Database,
}

impl PgDeliveryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryRepository for PgDeliveryRepository {
    async fn create(&self, delivery: &Delivery) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO deliveries (id, order_id, delivery_information_id, tracking_number, \
                                     status, delivered_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(delivery.id)
        .bind(delivery.order_id)
        .bind(delivery.delivery_information_id)
        .bind(&delivery.tracking_number)
        .bind(delivery.status)
        .bind(delivery.delivered_at)
        .bind(delivery.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: Uuid) -> RepositoryResult<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, Delivery>(
            "SELECT id, order_id, delivery_information_id, tracking_number, status, delivered_at, created_at \
             FROM deliveries WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(delivery)
    }
}

// ============================================================================
// PgDeliveryInformationRepository
// ============================================================================

const DELIVERY_INFO_COLUMNS: &str =
    "id, user_id, address, phone_number, version, delivery_method, created_at";

pub struct PgDeliveryInformationRepository {
    db: Database,
}

impl PgDeliveryInformationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryInformationRepository for PgDeliveryInformationRepository {
    async fn create(&self, info: &DeliveryInformation) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO delivery_informations (id, user_id, address, phone_number, version, \
                                                delivery_method, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(info.id)
        .bind(info.user_id)
        .bind(&info.address)
        .bind(&info.phone_number)
        .bind(info.version)
        .bind(info.delivery_method)
        .bind(info.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<DeliveryInformation>> {
        let sql = format!("SELECT {DELIVERY_INFO_COLUMNS} FROM delivery_informations WHERE id = $1");
        let info = sqlx::query_as::<_, DeliveryInformation>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(info)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepositoryResult<Vec<DeliveryInformation>> {
        let sql = format!(
            "SELECT {DELIVERY_INFO_COLUMNS} FROM delivery_informations \
             WHERE user_id = $1 ORDER BY created_at DESC, id"
        );
        let infos = sqlx::query_as::<_, DeliveryInformation>(&sql)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(infos)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<DeliveryInformation>> {
        let sql = format!(
            "SELECT {DELIVERY_INFO_COLUMNS} FROM delivery_informations ORDER BY created_at DESC, id"
        );
        let infos = sqlx::query_as::<_, DeliveryInformation>(&sql)
            .fetch_all(self.db.pool())
            .await?;
        Ok(infos)
    }

    async fn update(&self, info: &DeliveryInformation) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE delivery_informations \
             SET address = $2, phone_number = $3, delivery_method = $4, version = $5 \
             WHERE id = $1",
        )
        .bind(info.id)
        .bind(&info.address)
        .bind(&info.phone_number)
        .bind(info.delivery_method)
        .bind(info.version)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("delivery information"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM delivery_informations WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("delivery information"));
        }
        Ok(())
    }
}
