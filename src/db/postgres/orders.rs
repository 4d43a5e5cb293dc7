use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{Database, OrderItemRepository, OrderRepository, RepositoryError, RepositoryResult};
use crate::domain::order::{MedicineRef, Order, OrderItem, OrderStatus};

// NUMERIC columns are read back as float8.
const ORDER_COLUMNS: &str = "id, patient_id, doctor_id, total_amount::float8 AS total_amount, note, \
                             submitted_at, reviewed_at, status, created_at, updated_at";

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    patient_id: Uuid,
    doctor_id: Option<Uuid>,
    total_amount: f64,
    note: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    reviewed_at: Option<DateTime<Utc>>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            total_amount: self.total_amount,
            note: self.note,
            status: self.status,
            items,
            submitted_at: self.submitted_at,
            reviewed_at: self.reviewed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    medicine_id: Uuid,
    quantity: f64,
    medicine_name: Option<String>,
    medicine_price: Option<f64>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        let medicine = match (row.medicine_name, row.medicine_price) {
            (Some(name), Some(price)) => Some(MedicineRef { name, price }),
            _ => None,
        };

        OrderItem {
            id: row.id,
            order_id: row.order_id,
            medicine_id: row.medicine_id,
            quantity: row.quantity,
            medicine,
        }
    }
}

/// Items for the given orders, joined with their still-active medicine.
async fn load_items(pool: &PgPool, order_ids: &[Uuid]) -> RepositoryResult<Vec<OrderItem>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.id, oi.order_id, oi.medicine_id, oi.quantity::float8 AS quantity, \
                m.name AS medicine_name, m.price::float8 AS medicine_price \
         FROM order_items oi \
         LEFT JOIN medicines m ON m.id = oi.medicine_id AND m.deleted_at IS NULL \
         WHERE oi.order_id = ANY($1) \
         ORDER BY oi.id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(OrderItem::from).collect())
}

async fn hydrate(pool: &PgPool, rows: Vec<OrderRow>) -> RepositoryResult<Vec<Order>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in load_items(pool, &ids).await? {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect())
}

async fn delete_items(conn: &mut PgConnection, order_id: Uuid) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_item(conn: &mut PgConnection, item: &OrderItem) -> RepositoryResult<()> {
    sqlx::query("INSERT INTO order_items (id, order_id, medicine_id, quantity) VALUES ($1, $2, $3, $4)")
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.medicine_id)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn write_total(
    conn: &mut PgConnection,
    order_id: Uuid,
    total_amount: f64,
    updated_at: DateTime<Utc>,
) -> RepositoryResult<()> {
    let result = sqlx::query("UPDATE orders SET total_amount = $2, updated_at = $3 WHERE id = $1")
        .bind(order_id)
        .bind(total_amount)
        .bind(updated_at)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound("order"));
    }
    Ok(())
}

// ============================================================================
// PgOrderRepository
// ============================================================================

pub struct PgOrderRepository {
    db: Database,
}

impl PgOrderRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch_many(&self, sql: &str, bind: impl FnOnce(SelectOrders<'_>) -> SelectOrders<'_>) -> RepositoryResult<Vec<Order>> {
        let rows = bind(sqlx::query_as::<_, OrderRow>(sql)).fetch_all(self.db.pool()).await?;
        hydrate(self.db.pool(), rows).await
    }

    async fn fetch_one(&self, sql: &str, bind: impl FnOnce(SelectOrders<'_>) -> SelectOrders<'_>) -> RepositoryResult<Option<Order>> {
        let row = bind(sqlx::query_as::<_, OrderRow>(sql)).fetch_optional(self.db.pool()).await?;
        match row {
            Some(row) => Ok(hydrate(self.db.pool(), vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

type SelectOrders<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, OrderRow, sqlx::postgres::PgArguments>;

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, patient_id, doctor_id, total_amount, note, submitted_at, \
                                 reviewed_at, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id)
        .bind(order.patient_id)
        .bind(order.doctor_id)
        .bind(order.total_amount)
        .bind(&order.note)
        .bind(order.submitted_at)
        .bind(order.reviewed_at)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(self.db.pool())
        .await?;

        tracing::debug!(order_id = %order.id, patient_id = %order.patient_id, "Inserted order");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        self.fetch_one(&sql, |q| q.bind(id)).await
    }

    async fn find_by_patient_id(&self, patient_id: Uuid) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE patient_id = $1 ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, |q| q.bind(patient_id)).await
    }

    async fn find_latest_reviewed_by_patient_id(&self, patient_id: Uuid) -> RepositoryResult<Option<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE patient_id = $1 AND status <> 'pending' \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        self.fetch_one(&sql, |q| q.bind(patient_id)).await
    }

    async fn find_pending_by_doctor_id(&self, doctor_id: Uuid) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE doctor_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, |q| q.bind(doctor_id)).await
    }

    async fn find_by_doctor_id_and_statuses(
        &self,
        doctor_id: Uuid,
        statuses: &[OrderStatus],
    ) -> RepositoryResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE doctor_id = $1 AND status = ANY($2) \
             ORDER BY created_at DESC, id DESC"
        );
        let statuses = statuses.to_vec();
        self.fetch_many(&sql, |q| q.bind(doctor_id).bind(statuses)).await
    }

    async fn update(&self, order: &Order) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET doctor_id = $2, total_amount = $3, note = $4, submitted_at = $5, \
                               reviewed_at = $6, status = $7, updated_at = $8 \
             WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.doctor_id)
        .bind(order.total_amount)
        .bind(&order.note)
        .bind(order.submitted_at)
        .bind(order.reviewed_at)
        .bind(order.status)
        .bind(order.updated_at)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("order"));
        }
        Ok(())
    }

    async fn replace_items(&self, order: &Order) -> RepositoryResult<()> {
        let order_id = order.id;
        let total_amount = order.total_amount;
        let updated_at = order.updated_at;
        let items = order.items.clone();
        let item_count = items.len();

        self.db
            .transaction::<(), _>(move |conn| {
                Box::pin(async move {
                    delete_items(conn, order_id).await?;
                    for item in &items {
                        insert_item(conn, item).await?;
                    }
                    write_total(conn, order_id, total_amount, updated_at).await
                })
            })
            .await?;

        tracing::debug!(order_id = %order_id, item_count, total_amount, "Replaced order items");
        Ok(())
    }
}

// ============================================================================
// PgOrderItemRepository
// ============================================================================

pub struct PgOrderItemRepository {
    db: Database,
}

impl PgOrderItemRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderItemRepository for PgOrderItemRepository {
    async fn find_by_order_id(&self, order_id: Uuid) -> RepositoryResult<Vec<OrderItem>> {
        load_items(self.db.pool(), &[order_id]).await
    }
}
