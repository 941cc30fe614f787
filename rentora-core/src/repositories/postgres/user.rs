// src/repositories/postgres/user.rs

use rentora_common::error::Error;
use rentora_common::models::user::User;
use rentora_common::traits::repository_traits::UserRepo;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub struct PostgresUserRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepo for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id, name, email, phone, role,
                wallet_balance, coin_balance, free_views_used,
                free_rental_grant_used, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role)
        .bind(user.wallet_balance)
        .bind(user.coin_balance)
        .bind(user.free_views_used)
        .bind(user.free_rental_grant_used)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, phone, role,
                   wallet_balance, coin_balance, free_views_used,
                   free_rental_grant_used, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
