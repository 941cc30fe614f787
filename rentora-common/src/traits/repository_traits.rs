use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::coin::{CoinPack, UnlockClaim, UnlockedProperty};
use crate::models::property::{Property, PropertyFilter};
use crate::models::rental::RentalSubscription;
use crate::models::user::User;
use crate::models::wallet::{WalletTransaction, Withdrawal};

/// Storage contract for user accounts. Balances on the user row are
/// denormalised caches; all balance mutations go through the wallet / coin
/// repositories so the mutation and its audit record stay in one atomic unit.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), Error>;
    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error>;
}

/// Broker reward wallet: append-only ledger plus the denormalised balance.
#[async_trait]
pub trait WalletRepo: Send + Sync {
    /// Balance increment plus a credit ledger row, committed together.
    /// Returns the new balance.
    async fn credit(&self, broker_id: Uuid, amount: i64, reason: &str) -> Result<i64, Error>;

    /// Conditional decrement: applied only while `wallet_balance >= amount`,
    /// with the debit ledger row committed in the same unit. `Ok(None)`
    /// means the predicate no longer held when the update ran (a concurrent
    /// withdrawal won).
    async fn debit_if_sufficient(
        &self,
        broker_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<Option<Withdrawal>, Error>;

    /// Newest-first page of ledger entries for one broker.
    async fn list_transactions(
        &self,
        broker_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error>;

    async fn count_transactions(&self, broker_id: Uuid) -> Result<i64, Error>;
}

/// Coin catalog, coin balance and the unlock audit trail.
#[async_trait]
pub trait CoinRepo: Send + Sync {
    async fn list_active_packs(&self) -> Result<Vec<CoinPack>, Error>;
    async fn get_pack(&self, pack_id: Uuid) -> Result<Option<CoinPack>, Error>;

    /// Unconditional coin credit (purchases commute). Returns new balance.
    async fn add_coins(&self, customer_id: Uuid, amount: i64) -> Result<i64, Error>;

    async fn get_unlock(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<UnlockedProperty>, Error>;

    /// Atomically claim the (customer, property) unlock slot and apply the
    /// matching balance/quota mutation: free unlocks bump the free-view
    /// counter, paid unlocks conditionally spend `unlock.coins_spent` coins.
    /// Losing the uniqueness race rolls back every mutation and reports the
    /// winning record; a failed coin predicate is `InsufficientCoins`.
    async fn record_unlock(&self, unlock: &UnlockedProperty) -> Result<UnlockClaim, Error>;

    /// Newest-first unlock history, capped at `limit`.
    async fn list_unlocks(
        &self,
        customer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<UnlockedProperty>, Error>;
}

#[async_trait]
pub trait PropertyRepo: Send + Sync {
    async fn create(&self, property: &Property) -> Result<(), Error>;
    async fn get(&self, property_id: Uuid) -> Result<Option<Property>, Error>;

    async fn search(
        &self,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error>;
    async fn count(&self, filter: &PropertyFilter) -> Result<i64, Error>;

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error>;
    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, Error>;

    async fn list_by_broker(
        &self,
        broker_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error>;
    async fn count_by_broker(&self, broker_id: Uuid) -> Result<i64, Error>;
}

/// Rental visibility windows and their purchase history.
#[async_trait]
pub trait RentalRepo: Send + Sync {
    /// Free-path purchase. Claims the owner's one-shot free grant with a
    /// compare-and-set and, only when the claim wins, writes the property
    /// window (marking it the first property) and the subscription record,
    /// all in one unit. `Ok(false)` means the grant was already used.
    async fn apply_free_rental_purchase(&self, sub: &RentalSubscription) -> Result<bool, Error>;

    /// Paid-path purchase: window update plus subscription record in one unit.
    async fn apply_paid_rental_purchase(&self, sub: &RentalSubscription) -> Result<(), Error>;

    /// Newest-first subscription history for one owner.
    async fn list_subscriptions(&self, owner_id: Uuid) -> Result<Vec<RentalSubscription>, Error>;
}

#[async_trait]
pub trait AppointmentRepo: Send + Sync {
    /// Insert the booking. The storage layer enforces at most one pending
    /// appointment per (property, customer); a violated constraint surfaces
    /// as `DuplicatePending`.
    async fn insert(&self, appointment: &Appointment) -> Result<(), Error>;

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, Error>;

    async fn find_pending(
        &self,
        property_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Appointment>, Error>;

    /// Terminal transition, applied only while the row is still pending.
    /// `Ok(None)` means another transition got there first (or the row is
    /// gone); the caller decides which error that maps to.
    async fn set_status_if_pending(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, Error>;

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<AppointmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, Error>;
    async fn count_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<i64, Error>;

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<AppointmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, Error>;
    async fn count_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<i64, Error>;
}
