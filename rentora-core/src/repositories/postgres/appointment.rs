// src/repositories/postgres/appointment.rs
//
// Bookings. The partial unique index on (property_id, customer_id) for
// pending rows turns the duplicate-booking race into a constraint violation
// this layer maps to DuplicatePending.

use super::UNIQUE_VIOLATION;
use rentora_common::error::Error;
use rentora_common::models::appointment::{Appointment, AppointmentStatus};
use rentora_common::traits::repository_traits::AppointmentRepo;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = r#"
    appointment_id, property_id, customer_id, owner_id,
    visit_date, visit_time, status, created_at, updated_at
"#;

pub struct PostgresAppointmentRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresAppointmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AppointmentRepo for PostgresAppointmentRepository {
    async fn insert(&self, appointment: &Appointment) -> Result<(), Error> {
        let res = sqlx::query(
            r#"
            INSERT INTO appointments (
                appointment_id, property_id, customer_id, owner_id,
                visit_date, visit_time, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(appointment.appointment_id)
        .bind(appointment.property_id)
        .bind(appointment.customer_id)
        .bind(appointment.owner_id)
        .bind(appointment.visit_date)
        .bind(&appointment.visit_time)
        .bind(appointment.status)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) => {
                let is_dup = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .map(|code| code == UNIQUE_VIOLATION)
                    .unwrap_or(false);
                if is_dup {
                    Err(Error::DuplicatePending)
                } else {
                    Err(Error::Database(e))
                }
            }
        }
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, Error> {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_id = $1"
        );
        let row = sqlx::query_as::<_, Appointment>(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_pending(
        &self,
        property_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Appointment>, Error> {
        let sql = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE property_id = $1 AND customer_id = $2 AND status = 'pending'
            "#
        );
        let row = sqlx::query_as::<_, Appointment>(&sql)
            .bind(property_id)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_status_if_pending(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, Error> {
        let sql = format!(
            r#"
            UPDATE appointments
            SET status = $2, updated_at = now()
            WHERE appointment_id = $1 AND status = 'pending'
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Appointment>(&sql)
            .bind(appointment_id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<AppointmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, Error> {
        let sql = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE customer_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, Appointment>(&sql)
            .bind(customer_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt
            FROM appointments
            WHERE customer_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(customer_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<AppointmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, Error> {
        let sql = format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE owner_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, Appointment>(&sql)
            .bind(owner_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<i64, Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt
            FROM appointments
            WHERE owner_id = $1 AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let cnt: i64 = row.try_get("cnt")?;
        Ok(cnt)
    }
}
