use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Marketplace role. Immutable once the account exists.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Broker,
    Owner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Broker => write!(f, "broker"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "broker" => Ok(Role::Broker),
            "owner" => Ok(Role::Owner),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// Broker reward balance, denormalised from the wallet transaction log.
    pub wallet_balance: i64,
    /// Customer unlock-coin balance.
    pub coin_balance: i64,
    /// Monotonic count of free property unlocks consumed.
    pub free_views_used: i32,
    /// One-shot flag: set when the owner claims their free 7-day rental grant.
    pub free_rental_grant_used: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            role,
            wallet_balance: 0,
            coin_balance: 0,
            free_views_used: 0,
            free_rental_grant_used: false,
            created_at: Utc::now(),
        }
    }
}

/// Authenticated caller, supplied by the auth boundary. This core trusts it
/// completely and performs no credential checks of its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}
