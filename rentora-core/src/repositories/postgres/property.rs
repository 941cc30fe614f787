// src/repositories/postgres/property.rs

use rentora_common::error::Error;
use rentora_common::models::property::{Property, PropertyFilter};
use rentora_common::traits::repository_traits::PropertyRepo;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

const PROPERTY_COLUMNS: &str = r#"
    property_id, title, description, rent, deposit, area, city,
    images, amenities, owner_id, broker_id,
    rental_period_days, rental_period_start, rental_period_end,
    is_first_property, created_at
"#;

// Optional predicates are pushed into SQL so one prepared statement covers
// every filter combination; `amenities && $5` is match-any overlap.
const FILTER_CLAUSE: &str = r#"
    ($1::text IS NULL OR area ILIKE '%' || $1 || '%')
    AND ($2::text IS NULL OR city ILIKE '%' || $2 || '%')
    AND ($3::bigint IS NULL OR rent >= $3)
    AND ($4::bigint IS NULL OR rent <= $4)
    AND (cardinality($5::text[]) = 0 OR amenities && $5)
"#;

pub struct PostgresPropertyRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresPropertyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PropertyRepo for PostgresPropertyRepository {
    async fn create(&self, property: &Property) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO properties (
                property_id, title, description, rent, deposit, area, city,
                images, amenities, owner_id, broker_id,
                rental_period_days, rental_period_start, rental_period_end,
                is_first_property, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(property.property_id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.rent)
        .bind(property.deposit)
        .bind(&property.area)
        .bind(&property.city)
        .bind(&property.images)
        .bind(&property.amenities)
        .bind(property.owner_id)
        .bind(property.broker_id)
        .bind(property.rental_period_days)
        .bind(property.rental_period_start)
        .bind(property.rental_period_end)
        .bind(property.is_first_property)
        .bind(property.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, property_id: Uuid) -> Result<Option<Property>, Error> {
        let sql = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE property_id = $1"
        );
        let row = sqlx::query_as::<_, Property>(&sql)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn search(
        &self,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        let sql = format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE {FILTER_CLAUSE}
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#
        );
        let rows = sqlx::query_as::<_, Property>(&sql)
            .bind(&filter.area)
            .bind(&filter.city)
            .bind(filter.min_rent)
            .bind(filter.max_rent)
            .bind(&filter.amenities)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self, filter: &PropertyFilter) -> Result<i64, Error> {
        let sql = format!("SELECT COUNT(*) AS cnt FROM properties WHERE {FILTER_CLAUSE}");
        let row = sqlx::query(&sql)
            .bind(&filter.area)
            .bind(&filter.city)
            .bind(filter.min_rent)
            .bind(filter.max_rent)
            .bind(&filter.amenities)
            .fetch_one(&self.pool)
            .await?;
        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        let sql = format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, Property>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM properties WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt)
    }

    async fn list_by_broker(
        &self,
        broker_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        let sql = format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties
            WHERE broker_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, Property>(&sql)
            .bind(broker_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_broker(&self, broker_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM properties WHERE broker_id = $1")
            .bind(broker_id)
            .fetch_one(&self.pool)
            .await?;
        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt)
    }
}
