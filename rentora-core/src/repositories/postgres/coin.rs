// src/repositories/postgres/coin.rs
//
// Coin catalog, coin balance and the unlock audit trail. The unique
// constraint on unlocked_properties(customer_id, property_id) is the
// serialization point for concurrent unlock attempts: the insert runs first
// inside the transaction, and the balance/quota mutation only commits when
// the insert actually claimed the slot.

use rentora_common::error::Error;
use rentora_common::models::coin::{CoinPack, UnlockClaim, UnlockedProperty};
use rentora_common::traits::repository_traits::CoinRepo;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

pub struct PostgresCoinRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresCoinRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_unlock(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<UnlockedProperty>, Error> {
        let row = sqlx::query_as::<_, UnlockedProperty>(
            r#"
            SELECT unlock_id, customer_id, property_id, was_free, coins_spent, created_at
            FROM unlocked_properties
            WHERE customer_id = $1 AND property_id = $2
            "#,
        )
        .bind(customer_id)
        .bind(property_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait::async_trait]
impl CoinRepo for PostgresCoinRepository {
    async fn list_active_packs(&self) -> Result<Vec<CoinPack>, Error> {
        let rows = sqlx::query_as::<_, CoinPack>(
            r#"
            SELECT pack_id, name, coins, bonus_coins, price, is_active, display_order, created_at
            FROM coin_packs
            WHERE is_active = TRUE
            ORDER BY display_order ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_pack(&self, pack_id: Uuid) -> Result<Option<CoinPack>, Error> {
        let row = sqlx::query_as::<_, CoinPack>(
            r#"
            SELECT pack_id, name, coins, bonus_coins, price, is_active, display_order, created_at
            FROM coin_packs
            WHERE pack_id = $1
            "#,
        )
        .bind(pack_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn add_coins(&self, customer_id: Uuid, amount: i64) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET coin_balance = coin_balance + $2
            WHERE user_id = $1
            RETURNING coin_balance
            "#,
        )
        .bind(customer_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(Error::NotFound(format!("User {} not found", customer_id)));
        };
        let new_balance: i64 = row.try_get("coin_balance")?;
        Ok(new_balance)
    }

    async fn get_unlock(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<UnlockedProperty>, Error> {
        self.fetch_unlock(customer_id, property_id).await
    }

    async fn record_unlock(&self, unlock: &UnlockedProperty) -> Result<UnlockClaim, Error> {
        let mut tx = self.pool.begin().await?;

        // Claim the slot first; a concurrent winner makes this a no-op and
        // nothing else in the transaction may run.
        let inserted = sqlx::query(
            r#"
            INSERT INTO unlocked_properties (
                unlock_id, customer_id, property_id, was_free, coins_spent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (customer_id, property_id) DO NOTHING
            "#,
        )
        .bind(unlock.unlock_id)
        .bind(unlock.customer_id)
        .bind(unlock.property_id)
        .bind(unlock.was_free)
        .bind(unlock.coins_spent)
        .bind(unlock.created_at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            let existing = self
                .fetch_unlock(unlock.customer_id, unlock.property_id)
                .await?
                .ok_or_else(|| {
                    Error::NotFound(format!(
                        "Unlock for customer {} / property {} vanished",
                        unlock.customer_id, unlock.property_id
                    ))
                })?;
            return Ok(UnlockClaim::AlreadyUnlocked(existing));
        }

        let new_coin_balance: i64 = if unlock.was_free {
            let row = sqlx::query(
                r#"
                UPDATE users
                SET free_views_used = free_views_used + 1
                WHERE user_id = $1
                RETURNING coin_balance
                "#,
            )
            .bind(unlock.customer_id)
            .fetch_optional(&mut *tx)
            .await?;
            let Some(row) = row else {
                return Err(Error::NotFound(format!(
                    "User {} not found",
                    unlock.customer_id
                )));
            };
            row.try_get("coin_balance")?
        } else {
            let row = sqlx::query(
                r#"
                UPDATE users
                SET coin_balance = coin_balance - $2
                WHERE user_id = $1 AND coin_balance >= $2
                RETURNING coin_balance
                "#,
            )
            .bind(unlock.customer_id)
            .bind(unlock.coins_spent)
            .fetch_optional(&mut *tx)
            .await?;

            match row {
                Some(row) => row.try_get("coin_balance")?,
                None => {
                    // Rolls back the slot claim as well; the unlock never
                    // happened from the caller's point of view.
                    tx.rollback().await?;
                    let balance = sqlx::query("SELECT coin_balance FROM users WHERE user_id = $1")
                        .bind(unlock.customer_id)
                        .fetch_optional(&self.pool)
                        .await?
                        .map(|r| r.try_get::<i64, _>("coin_balance"))
                        .transpose()?
                        .unwrap_or(0);
                    return Err(Error::InsufficientCoins {
                        balance,
                        required: unlock.coins_spent,
                    });
                }
            }
        };

        tx.commit().await?;
        Ok(UnlockClaim::Fresh { new_coin_balance })
    }

    async fn list_unlocks(
        &self,
        customer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<UnlockedProperty>, Error> {
        let rows = sqlx::query_as::<_, UnlockedProperty>(
            r#"
            SELECT unlock_id, customer_id, property_id, was_free, coins_spent, created_at
            FROM unlocked_properties
            WHERE customer_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
