use std::sync::Arc;

use rentora_common::error::Error;
use rentora_common::models::coin::{
    CoinPack, CoinPurchase, CustomerWallet, FREE_VIEW_QUOTA, UNLOCK_PRICE, UnlockClaim,
    UnlockOutcome, UnlockedProperty,
};
use rentora_common::models::user::{Principal, Role};
use rentora_common::traits::repository_traits::{CoinRepo, PropertyRepo, UserRepo};
use tracing::info;
use uuid::Uuid;

/// Customer coin balance and the property-unlock entitlement rules: the
/// first three unlocks are free, every further distinct property costs a
/// fixed coin price, and an unlock is idempotent per (customer, property).
pub struct CoinService {
    users: Arc<dyn UserRepo>,
    coins: Arc<dyn CoinRepo>,
    properties: Arc<dyn PropertyRepo>,
}

impl CoinService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        coins: Arc<dyn CoinRepo>,
        properties: Arc<dyn PropertyRepo>,
    ) -> Self {
        Self {
            users,
            coins,
            properties,
        }
    }

    pub async fn list_coin_packs(&self) -> Result<Vec<CoinPack>, Error> {
        self.coins.list_active_packs().await
    }

    /// Simulated purchase: payment always succeeds and the pack's coins plus
    /// bonus land on the balance. Concurrent purchases commute, so no
    /// conditional update is needed here.
    pub async fn purchase_coin_pack(
        &self,
        principal: &Principal,
        pack_id: Uuid,
    ) -> Result<CoinPurchase, Error> {
        if principal.role != Role::Customer {
            return Err(Error::Forbidden(
                "Only customers can purchase coin packs.".to_string(),
            ));
        }

        self.users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Customer {} not found", principal.user_id)))?;

        let pack = self
            .coins
            .get_pack(pack_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| Error::NotFound("Coin pack not found or not available.".to_string()))?;

        let coins_added = pack.total_coins();
        let new_balance = self.coins.add_coins(principal.user_id, coins_added).await?;

        info!(
            "customer {} bought pack '{}': +{} coins, balance {}",
            principal.user_id, pack.name, coins_added, new_balance
        );
        Ok(CoinPurchase {
            pack,
            coins_added,
            new_balance,
        })
    }

    /// Unlock a property's full detail for a customer.
    ///
    /// Replays return the original record without charging again. Under a
    /// true race the storage layer's uniqueness claim decides the winner;
    /// the loser's balance and quota are untouched.
    pub async fn unlock_property(
        &self,
        principal: &Principal,
        property_id: Uuid,
    ) -> Result<UnlockOutcome, Error> {
        if principal.role != Role::Customer {
            return Err(Error::Forbidden(
                "Only customers can unlock properties.".to_string(),
            ));
        }

        let customer = self
            .users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Customer {} not found", principal.user_id)))?;

        self.properties
            .get(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Property {} not found", property_id)))?;

        if let Some(existing) = self
            .coins
            .get_unlock(principal.user_id, property_id)
            .await?
        {
            return Ok(UnlockOutcome {
                already_unlocked: true,
                was_free: existing.was_free,
                coins_spent: existing.coins_spent,
                new_coin_balance: customer.coin_balance,
                unlock: existing,
            });
        }

        let is_free = customer.free_views_used < FREE_VIEW_QUOTA;
        let coins_required = if is_free { 0 } else { UNLOCK_PRICE };

        // Pre-flight check for a fast error; the conditional decrement in
        // record_unlock re-checks atomically.
        if !is_free && customer.coin_balance < coins_required {
            return Err(Error::InsufficientCoins {
                balance: customer.coin_balance,
                required: coins_required,
            });
        }

        let unlock =
            UnlockedProperty::new(principal.user_id, property_id, is_free, coins_required);

        match self.coins.record_unlock(&unlock).await? {
            UnlockClaim::Fresh { new_coin_balance } => {
                info!(
                    "customer {} unlocked property {} ({})",
                    principal.user_id,
                    property_id,
                    if is_free { "free view" } else { "paid" }
                );
                Ok(UnlockOutcome {
                    already_unlocked: false,
                    was_free: is_free,
                    coins_spent: coins_required,
                    new_coin_balance,
                    unlock,
                })
            }
            UnlockClaim::AlreadyUnlocked(existing) => Ok(UnlockOutcome {
                already_unlocked: true,
                was_free: existing.was_free,
                coins_spent: existing.coins_spent,
                new_coin_balance: customer.coin_balance,
                unlock: existing,
            }),
        }
    }

    /// Coin balance, free-view counters and the last 50 unlocks.
    pub async fn get_customer_wallet(&self, principal: &Principal) -> Result<CustomerWallet, Error> {
        if principal.role != Role::Customer {
            return Err(Error::Forbidden(
                "Only customers have coin wallets.".to_string(),
            ));
        }

        let customer = self
            .users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Customer {} not found", principal.user_id)))?;

        let unlocked_properties = self.coins.list_unlocks(principal.user_id, 50).await?;

        Ok(CustomerWallet {
            coins: customer.coin_balance,
            free_views_used: customer.free_views_used,
            free_views_remaining: (FREE_VIEW_QUOTA - customer.free_views_used).max(0),
            unlocked_properties,
        })
    }

    pub async fn is_property_unlocked(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, Error> {
        Ok(self.coins.get_unlock(customer_id, property_id).await?.is_some())
    }
}
