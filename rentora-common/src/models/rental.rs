use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Days granted by the one free first-property plan.
pub const FREE_GRANT_DAYS: i32 = 7;

/// Fixed-price visibility plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalPlan {
    pub days: i32,
    pub name: String,
    pub price: i64,
    pub description: String,
}

impl RentalPlan {
    /// Static plan catalog. In a full product these would live in the
    /// database; prices match the store's published tiers.
    pub fn catalog() -> Vec<RentalPlan> {
        vec![
            RentalPlan {
                days: 7,
                name: "7 Days".to_string(),
                price: 100,
                description: "List your property for 7 days".to_string(),
            },
            RentalPlan {
                days: 15,
                name: "15 Days".to_string(),
                price: 180,
                description: "List your property for 15 days".to_string(),
            },
            RentalPlan {
                days: 30,
                name: "30 Days".to_string(),
                price: 300,
                description: "List your property for 30 days".to_string(),
            },
        ]
    }

    pub fn for_days(days: i32) -> Option<RentalPlan> {
        Self::catalog().into_iter().find(|p| p.days == days)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Immutable record of one visibility purchase. The property's current
/// window is the latest record's window; history is retained.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct RentalSubscription {
    pub subscription_id: Uuid,
    pub owner_id: Uuid,
    pub property_id: Uuid,
    pub days: i32,
    pub amount: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub was_free: bool,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl RentalSubscription {
    pub fn new(
        owner_id: Uuid,
        property_id: Uuid,
        days: i32,
        amount: i64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        was_free: bool,
    ) -> Self {
        Self {
            subscription_id: Uuid::new_v4(),
            owner_id,
            property_id,
            days,
            amount,
            start_date,
            end_date,
            was_free,
            // Simulated gateway: every purchase settles immediately.
            payment_status: PaymentStatus::Completed,
            created_at: Utc::now(),
        }
    }
}

/// Result of a rental period purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalPurchase {
    pub was_free: bool,
    pub days: i32,
    pub amount: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub subscription: RentalSubscription,
}

/// Per-property visibility status, derived against the current clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRentalStatus {
    pub property_id: Uuid,
    pub title: String,
    pub city: String,
    pub area: String,
    pub rent: i64,
    pub rental_period_start: Option<DateTime<Utc>>,
    pub rental_period_end: Option<DateTime<Utc>>,
    pub is_first_property: bool,
    pub is_active: bool,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRentals {
    pub subscriptions: Vec<RentalSubscription>,
    pub properties: Vec<PropertyRentalStatus>,
}
