use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unlocks beyond this count cost coins.
pub const FREE_VIEW_QUOTA: i32 = 3;

/// Fixed price, in coins, of one paid property unlock.
pub const UNLOCK_PRICE: i64 = 2;

/// Purchasable coin bundle from the store catalog.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct CoinPack {
    pub pack_id: Uuid,
    pub name: String,
    pub coins: i64,
    pub bonus_coins: i64,
    pub price: i64,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl CoinPack {
    pub fn total_coins(&self) -> i64 {
        self.coins + self.bonus_coins
    }
}

/// Immutable unlock record; doubles as the idempotency guard via the
/// (customer_id, property_id) uniqueness constraint.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct UnlockedProperty {
    pub unlock_id: Uuid,
    pub customer_id: Uuid,
    pub property_id: Uuid,
    pub was_free: bool,
    pub coins_spent: i64,
    pub created_at: DateTime<Utc>,
}

impl UnlockedProperty {
    pub fn new(customer_id: Uuid, property_id: Uuid, was_free: bool, coins_spent: i64) -> Self {
        Self {
            unlock_id: Uuid::new_v4(),
            customer_id,
            property_id,
            was_free,
            coins_spent,
            created_at: Utc::now(),
        }
    }
}

/// Storage-level outcome of an unlock claim. The uniqueness constraint on
/// (customer_id, property_id) is the serialization point: exactly one caller
/// observes `Fresh`, every other concurrent or later caller gets the winning
/// record back.
#[derive(Debug, Clone)]
pub enum UnlockClaim {
    Fresh { new_coin_balance: i64 },
    AlreadyUnlocked(UnlockedProperty),
}

/// Result of an unlock attempt. A replayed unlock reports
/// `already_unlocked = true` and the original record, never a second charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub already_unlocked: bool,
    pub was_free: bool,
    pub coins_spent: i64,
    pub new_coin_balance: i64,
    pub unlock: UnlockedProperty,
}

/// Result of a simulated coin pack purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinPurchase {
    pub pack: CoinPack,
    pub coins_added: i64,
    pub new_balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerWallet {
    pub coins: i64,
    pub free_views_used: i32,
    pub free_views_remaining: i32,
    pub unlocked_properties: Vec<UnlockedProperty>,
}
