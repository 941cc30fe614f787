// src/repositories/postgres/rental.rs
//
// Visibility window purchases. The free path serializes the per-owner
// "first property free" decision with a compare-and-set on the owner row,
// not by counting flagged properties; window update and subscription record
// commit together on both paths.

use rentora_common::error::Error;
use rentora_common::models::rental::RentalSubscription;
use rentora_common::traits::repository_traits::RentalRepo;
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

pub struct PostgresRentalRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresRentalRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn write_window_and_subscription(
        tx: &mut Transaction<'_, Postgres>,
        sub: &RentalSubscription,
        mark_first: bool,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE properties
            SET rental_period_days = $2,
                rental_period_start = $3,
                rental_period_end = $4,
                is_first_property = is_first_property OR $5
            WHERE property_id = $1
            "#,
        )
        .bind(sub.property_id)
        .bind(sub.days)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .bind(mark_first)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO rental_subscriptions (
                subscription_id, owner_id, property_id, days, amount,
                start_date, end_date, was_free, payment_status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(sub.subscription_id)
        .bind(sub.owner_id)
        .bind(sub.property_id)
        .bind(sub.days)
        .bind(sub.amount)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .bind(sub.was_free)
        .bind(sub.payment_status)
        .bind(sub.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RentalRepo for PostgresRentalRepository {
    async fn apply_free_rental_purchase(&self, sub: &RentalSubscription) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        // One-shot claim; two concurrent free attempts for the same owner
        // cannot both match the predicate.
        let claimed = sqlx::query(
            r#"
            UPDATE users
            SET free_rental_grant_used = TRUE
            WHERE user_id = $1 AND free_rental_grant_used = FALSE
            "#,
        )
        .bind(sub.owner_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::write_window_and_subscription(&mut tx, sub, true).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn apply_paid_rental_purchase(&self, sub: &RentalSubscription) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        Self::write_window_and_subscription(&mut tx, sub, false).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_subscriptions(&self, owner_id: Uuid) -> Result<Vec<RentalSubscription>, Error> {
        let rows = sqlx::query_as::<_, RentalSubscription>(
            r#"
            SELECT subscription_id, owner_id, property_id, days, amount,
                   start_date, end_date, was_free, payment_status, created_at
            FROM rental_subscriptions
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
