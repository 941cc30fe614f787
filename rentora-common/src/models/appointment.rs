use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Booking lifecycle: pending -> accepted | rejected, both terminal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Pending)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Accepted => write!(f, "accepted"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "accepted" => Ok(AppointmentStatus::Accepted),
            "rejected" => Ok(AppointmentStatus::Rejected),
            _ => Err(format!("Unknown appointment status: {}", s)),
        }
    }
}

/// A visit request. `owner_id` is captured from the property at booking
/// time and is the only principal allowed to accept or reject.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub visit_date: NaiveDate,
    pub visit_time: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        property_id: Uuid,
        customer_id: Uuid,
        owner_id: Uuid,
        visit_date: NaiveDate,
        visit_time: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            appointment_id: Uuid::new_v4(),
            property_id,
            customer_id,
            owner_id,
            visit_date,
            visit_time: visit_time.to_string(),
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
