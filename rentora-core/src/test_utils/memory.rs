// File: rentora-core/src/test_utils/memory.rs
//
// In-memory implementation of every repository trait, used by the unit
// tests. Each trait method takes the store lock once and applies its whole
// mutation under it, reproducing the atomicity the Postgres layer gets from
// conditional updates, unique constraints and transactions. That makes the
// concurrency properties (no overdraft, single unlock winner, one free
// grant) testable without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rentora_common::error::Error;
use rentora_common::models::appointment::{Appointment, AppointmentStatus};
use rentora_common::models::coin::{CoinPack, UnlockClaim, UnlockedProperty};
use rentora_common::models::property::{Property, PropertyFilter};
use rentora_common::models::rental::RentalSubscription;
use rentora_common::models::user::User;
use rentora_common::models::wallet::{TxKind, WalletTransaction, Withdrawal};
use rentora_common::traits::repository_traits::{
    AppointmentRepo, CoinRepo, PropertyRepo, RentalRepo, UserRepo, WalletRepo,
};
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    wallet_txs: Vec<WalletTransaction>,
    packs: HashMap<Uuid, CoinPack>,
    unlocks: Vec<UnlockedProperty>,
    properties: HashMap<Uuid, Property>,
    subscriptions: Vec<RentalSubscription>,
    appointments: HashMap<Uuid, Appointment>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.user_id, user);
    }

    pub fn add_pack(&self, pack: CoinPack) {
        self.state.lock().unwrap().packs.insert(pack.pack_id, pack);
    }

    pub fn add_property(&self, property: Property) {
        self.state
            .lock()
            .unwrap()
            .properties
            .insert(property.property_id, property);
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.state.lock().unwrap().users.get(&user_id).cloned()
    }

    pub fn property(&self, property_id: Uuid) -> Option<Property> {
        self.state
            .lock()
            .unwrap()
            .properties
            .get(&property_id)
            .cloned()
    }

    pub fn wallet_transactions(&self, broker_id: Uuid) -> Vec<WalletTransaction> {
        self.state
            .lock()
            .unwrap()
            .wallet_txs
            .iter()
            .filter(|t| t.broker_id == broker_id)
            .cloned()
            .collect()
    }

    pub fn unlock_count(&self, customer_id: Uuid, property_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .unlocks
            .iter()
            .filter(|u| u.customer_id == customer_id && u.property_id == property_id)
            .count()
    }

    /// Ledger reconciliation: credits minus debits for one broker.
    pub fn ledger_sum(&self, broker_id: Uuid) -> i64 {
        self.state
            .lock()
            .unwrap()
            .wallet_txs
            .iter()
            .filter(|t| t.broker_id == broker_id)
            .map(|t| match t.tx_type {
                TxKind::Credit => t.amount,
                TxKind::Debit => -t.amount,
            })
            .sum()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, user: &User) -> Result<(), Error> {
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.user_id, user.clone());
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }
}

#[async_trait]
impl WalletRepo for MemoryStore {
    async fn credit(&self, broker_id: Uuid, amount: i64, reason: &str) -> Result<i64, Error> {
        let mut st = self.state.lock().unwrap();
        let user = st
            .users
            .get_mut(&broker_id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", broker_id)))?;
        user.wallet_balance += amount;
        let balance = user.wallet_balance;
        st.wallet_txs
            .push(WalletTransaction::new(broker_id, amount, TxKind::Credit, reason));
        Ok(balance)
    }

    async fn debit_if_sufficient(
        &self,
        broker_id: Uuid,
        amount: i64,
        reason: &str,
    ) -> Result<Option<Withdrawal>, Error> {
        let mut st = self.state.lock().unwrap();
        let user = st
            .users
            .get_mut(&broker_id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", broker_id)))?;
        if user.wallet_balance < amount {
            return Ok(None);
        }
        user.wallet_balance -= amount;
        let new_balance = user.wallet_balance;
        let transaction = WalletTransaction::new(broker_id, amount, TxKind::Debit, reason);
        st.wallet_txs.push(transaction.clone());
        Ok(Some(Withdrawal {
            new_balance,
            transaction,
        }))
    }

    async fn list_transactions(
        &self,
        broker_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, Error> {
        let st = self.state.lock().unwrap();
        let mut txs: Vec<_> = st
            .wallet_txs
            .iter()
            .filter(|t| t.broker_id == broker_id)
            .cloned()
            .collect();
        txs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(txs
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_transactions(&self, broker_id: Uuid) -> Result<i64, Error> {
        let st = self.state.lock().unwrap();
        Ok(st.wallet_txs.iter().filter(|t| t.broker_id == broker_id).count() as i64)
    }
}

#[async_trait]
impl CoinRepo for MemoryStore {
    async fn list_active_packs(&self) -> Result<Vec<CoinPack>, Error> {
        let st = self.state.lock().unwrap();
        let mut packs: Vec<_> = st.packs.values().filter(|p| p.is_active).cloned().collect();
        packs.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(packs)
    }

    async fn get_pack(&self, pack_id: Uuid) -> Result<Option<CoinPack>, Error> {
        Ok(self.state.lock().unwrap().packs.get(&pack_id).cloned())
    }

    async fn add_coins(&self, customer_id: Uuid, amount: i64) -> Result<i64, Error> {
        let mut st = self.state.lock().unwrap();
        let user = st
            .users
            .get_mut(&customer_id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", customer_id)))?;
        user.coin_balance += amount;
        Ok(user.coin_balance)
    }

    async fn get_unlock(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<UnlockedProperty>, Error> {
        let st = self.state.lock().unwrap();
        Ok(st
            .unlocks
            .iter()
            .find(|u| u.customer_id == customer_id && u.property_id == property_id)
            .cloned())
    }

    async fn record_unlock(&self, unlock: &UnlockedProperty) -> Result<UnlockClaim, Error> {
        let mut st = self.state.lock().unwrap();

        // Uniqueness claim first, mirroring the ON CONFLICT insert.
        if let Some(existing) = st
            .unlocks
            .iter()
            .find(|u| u.customer_id == unlock.customer_id && u.property_id == unlock.property_id)
            .cloned()
        {
            return Ok(UnlockClaim::AlreadyUnlocked(existing));
        }

        let user = st
            .users
            .get_mut(&unlock.customer_id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", unlock.customer_id)))?;

        let new_coin_balance = if unlock.was_free {
            user.free_views_used += 1;
            user.coin_balance
        } else {
            if user.coin_balance < unlock.coins_spent {
                return Err(Error::InsufficientCoins {
                    balance: user.coin_balance,
                    required: unlock.coins_spent,
                });
            }
            user.coin_balance -= unlock.coins_spent;
            user.coin_balance
        };

        st.unlocks.push(unlock.clone());
        Ok(UnlockClaim::Fresh { new_coin_balance })
    }

    async fn list_unlocks(
        &self,
        customer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<UnlockedProperty>, Error> {
        let st = self.state.lock().unwrap();
        let mut unlocks: Vec<_> = st
            .unlocks
            .iter()
            .filter(|u| u.customer_id == customer_id)
            .cloned()
            .collect();
        unlocks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        unlocks.truncate(limit.max(0) as usize);
        Ok(unlocks)
    }
}

fn matches_filter(p: &Property, filter: &PropertyFilter) -> bool {
    if let Some(area) = &filter.area {
        if !p.area.to_lowercase().contains(&area.to_lowercase()) {
            return false;
        }
    }
    if let Some(city) = &filter.city {
        if !p.city.to_lowercase().contains(&city.to_lowercase()) {
            return false;
        }
    }
    if let Some(min) = filter.min_rent {
        if p.rent < min {
            return false;
        }
    }
    if let Some(max) = filter.max_rent {
        if p.rent > max {
            return false;
        }
    }
    if !filter.amenities.is_empty() && !filter.amenities.iter().any(|a| p.amenities.contains(a)) {
        return false;
    }
    true
}

fn sorted_desc(mut props: Vec<Property>) -> Vec<Property> {
    props.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    props
}

#[async_trait]
impl PropertyRepo for MemoryStore {
    async fn create(&self, property: &Property) -> Result<(), Error> {
        self.state
            .lock()
            .unwrap()
            .properties
            .insert(property.property_id, property.clone());
        Ok(())
    }

    async fn get(&self, property_id: Uuid) -> Result<Option<Property>, Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .properties
            .get(&property_id)
            .cloned())
    }

    async fn search(
        &self,
        filter: &PropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        let st = self.state.lock().unwrap();
        let props: Vec<_> = st
            .properties
            .values()
            .filter(|p| matches_filter(p, filter))
            .cloned()
            .collect();
        Ok(sorted_desc(props)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &PropertyFilter) -> Result<i64, Error> {
        let st = self.state.lock().unwrap();
        Ok(st
            .properties
            .values()
            .filter(|p| matches_filter(p, filter))
            .count() as i64)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        let st = self.state.lock().unwrap();
        let props: Vec<_> = st
            .properties
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(sorted_desc(props)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, Error> {
        let st = self.state.lock().unwrap();
        Ok(st.properties.values().filter(|p| p.owner_id == owner_id).count() as i64)
    }

    async fn list_by_broker(
        &self,
        broker_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, Error> {
        let st = self.state.lock().unwrap();
        let props: Vec<_> = st
            .properties
            .values()
            .filter(|p| p.broker_id == Some(broker_id))
            .cloned()
            .collect();
        Ok(sorted_desc(props)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_broker(&self, broker_id: Uuid) -> Result<i64, Error> {
        let st = self.state.lock().unwrap();
        Ok(st
            .properties
            .values()
            .filter(|p| p.broker_id == Some(broker_id))
            .count() as i64)
    }
}

#[async_trait]
impl RentalRepo for MemoryStore {
    async fn apply_free_rental_purchase(&self, sub: &RentalSubscription) -> Result<bool, Error> {
        let mut st = self.state.lock().unwrap();

        // Compare-and-set on the owner row; only the first caller wins.
        let owner = st
            .users
            .get_mut(&sub.owner_id)
            .ok_or_else(|| Error::NotFound(format!("User {} not found", sub.owner_id)))?;
        if owner.free_rental_grant_used {
            return Ok(false);
        }
        owner.free_rental_grant_used = true;

        let property = st
            .properties
            .get_mut(&sub.property_id)
            .ok_or_else(|| Error::NotFound(format!("Property {} not found", sub.property_id)))?;
        property.rental_period_days = Some(sub.days);
        property.rental_period_start = Some(sub.start_date);
        property.rental_period_end = Some(sub.end_date);
        property.is_first_property = true;

        st.subscriptions.push(sub.clone());
        Ok(true)
    }

    async fn apply_paid_rental_purchase(&self, sub: &RentalSubscription) -> Result<(), Error> {
        let mut st = self.state.lock().unwrap();
        let property = st
            .properties
            .get_mut(&sub.property_id)
            .ok_or_else(|| Error::NotFound(format!("Property {} not found", sub.property_id)))?;
        property.rental_period_days = Some(sub.days);
        property.rental_period_start = Some(sub.start_date);
        property.rental_period_end = Some(sub.end_date);
        st.subscriptions.push(sub.clone());
        Ok(())
    }

    async fn list_subscriptions(&self, owner_id: Uuid) -> Result<Vec<RentalSubscription>, Error> {
        let st = self.state.lock().unwrap();
        let mut subs: Vec<_> = st
            .subscriptions
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        subs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subs)
    }
}

#[async_trait]
impl AppointmentRepo for MemoryStore {
    async fn insert(&self, appointment: &Appointment) -> Result<(), Error> {
        let mut st = self.state.lock().unwrap();
        // Mirrors the partial unique index on pending rows.
        let duplicate = st.appointments.values().any(|a| {
            a.property_id == appointment.property_id
                && a.customer_id == appointment.customer_id
                && a.status == AppointmentStatus::Pending
        });
        if duplicate {
            return Err(Error::DuplicatePending);
        }
        st.appointments
            .insert(appointment.appointment_id, appointment.clone());
        Ok(())
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .get(&appointment_id)
            .cloned())
    }

    async fn find_pending(
        &self,
        property_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Appointment>, Error> {
        let st = self.state.lock().unwrap();
        Ok(st
            .appointments
            .values()
            .find(|a| {
                a.property_id == property_id
                    && a.customer_id == customer_id
                    && a.status == AppointmentStatus::Pending
            })
            .cloned())
    }

    async fn set_status_if_pending(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, Error> {
        let mut st = self.state.lock().unwrap();
        match st.appointments.get_mut(&appointment_id) {
            Some(a) if a.status == AppointmentStatus::Pending => {
                a.status = status;
                a.updated_at = chrono::Utc::now();
                Ok(Some(a.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<AppointmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, Error> {
        let st = self.state.lock().unwrap();
        let mut appts: Vec<_> = st
            .appointments
            .values()
            .filter(|a| a.customer_id == customer_id && status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        appts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_for_customer(
        &self,
        customer_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<i64, Error> {
        let st = self.state.lock().unwrap();
        Ok(st
            .appointments
            .values()
            .filter(|a| a.customer_id == customer_id && status.is_none_or(|s| a.status == s))
            .count() as i64)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<AppointmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Appointment>, Error> {
        let st = self.state.lock().unwrap();
        let mut appts: Vec<_> = st
            .appointments
            .values()
            .filter(|a| a.owner_id == owner_id && status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        appts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<i64, Error> {
        let st = self.state.lock().unwrap();
        Ok(st
            .appointments
            .values()
            .filter(|a| a.owner_id == owner_id && status.is_none_or(|s| a.status == s))
            .count() as i64)
    }
}
