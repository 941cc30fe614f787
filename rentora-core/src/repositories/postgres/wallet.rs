// src/repositories/postgres/wallet.rs
//
// Broker reward ledger. Every balance mutation and its ledger row commit in
// one transaction so the denormalised users.wallet_balance can never diverge
// from the append-only log.

use rentora_common::error::Error;
use rentora_common::models::wallet::{TxKind, WalletTransaction, Withdrawal};
use rentora_common::traits::repository_traits::WalletRepo;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

pub struct PostgresWalletRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresWalletRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_transaction<'e, E>(executor: E, t: &WalletTransaction) -> Result<(), Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (tx_id, broker_id, amount, tx_type, reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(t.tx_id)
        .bind(t.broker_id)
        .bind(t.amount)
        .bind(t.tx_type)
        .bind(&t.reason)
        .bind(t.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl WalletRepo for PostgresWalletRepository {
    async fn credit(&self, broker_id: Uuid, amount: i64, reason: &str) -> Result<i64, Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET wallet_balance = wallet_balance + $2
            WHERE user_id = $1
            RETURNING wallet_balance
            "#,
        )
        .bind(broker_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(Error::NotFound(format!("User {} not found", broker_id)));
        };
        let new_balance: i64 = row.try_get("wallet_balance")?;

        let entry = WalletTransaction::new(broker_id, amount, TxKind::Credit, reason);
        Self::insert_transaction(&mut *tx, &entry).await?;

        tx.commit().await?;
        Ok(new_balance)
    }

    async fn debit_if_sufficient(
        &self,
        broker_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<Option<Withdrawal>, Error> {
        let mut tx = self.pool.begin().await?;

        // The predicate makes the decrement atomic: of two concurrent
        // withdrawals that jointly exceed the balance, only one matches.
        let row = sqlx::query(
            r#"
            UPDATE users
            SET wallet_balance = wallet_balance - $2
            WHERE user_id = $1 AND wallet_balance >= $2
            RETURNING wallet_balance
            "#,
        )
        .bind(broker_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let new_balance: i64 = row.try_get("wallet_balance")?;

        let entry = WalletTransaction::new(broker_id, amount, TxKind::Debit, reason);
        Self::insert_transaction(&mut *tx, &entry).await?;

        tx.commit().await?;
        Ok(Some(Withdrawal {
            new_balance,
            transaction: entry,
        }))
    }

    async fn list_transactions(
        &self,
        broker_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error> {
        let rows = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT tx_id, broker_id, amount, tx_type, reason, created_at
            FROM wallet_transactions
            WHERE broker_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(broker_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_transactions(&self, broker_id: Uuid) -> Result<i64, Error> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM wallet_transactions WHERE broker_id = $1",
        )
        .bind(broker_id)
        .fetch_one(&self.pool)
        .await?;
        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt)
    }
}
