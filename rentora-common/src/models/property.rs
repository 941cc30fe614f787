use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rental listing. The `rental_period_*` triple is all-or-nothing: either
/// the owner has purchased a visibility window or all three are null.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Property {
    pub property_id: Uuid,
    pub title: String,
    pub description: String,
    pub rent: i64,
    pub deposit: i64,
    pub area: String,
    pub city: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    /// The user who owns the physical property. Always set, even when a
    /// broker lists on the owner's behalf.
    pub owner_id: Uuid,
    /// The broker who listed this property, if any; they receive the
    /// listing reward.
    pub broker_id: Option<Uuid>,
    pub rental_period_days: Option<i32>,
    pub rental_period_start: Option<DateTime<Utc>>,
    pub rental_period_end: Option<DateTime<Utc>>,
    /// Marks the single property that consumed the owner's free grant.
    pub is_first_property: bool,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// A listing is visible iff its rental window extends past `now`.
    pub fn is_rental_active_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.rental_period_end, Some(end) if end > now)
    }
}

/// Shape-validated creation payload; role-dependent owner/broker resolution
/// happens in the property service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub rent: i64,
    pub deposit: i64,
    pub area: String,
    pub city: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Brokers may name the owner they list for; owners must not.
    pub owner_id: Option<Uuid>,
}

/// Listing search predicates. All optional; combined with AND, amenities
/// match-any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub area: Option<String>,
    pub city: Option<String>,
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
    pub amenities: Vec<String>,
}

/// Detail view. `unlocked` is only populated when the viewer is an
/// authenticated customer; everyone else gets `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDetail {
    pub property: Property,
    pub unlocked: Option<bool>,
}
