use std::sync::Arc;

use rentora_common::error::Error;
use rentora_common::models::user::{Principal, Role};
use rentora_common::models::wallet::{WalletStatement, Withdrawal};
use rentora_common::models::{PageRequest, Pagination};
use rentora_common::traits::repository_traits::{UserRepo, WalletRepo};
use tracing::info;
use uuid::Uuid;

/// Broker reward wallet. The transaction log is the source of truth; the
/// balance on the user row is a denormalised running total that the wallet
/// repository keeps consistent with every ledger append.
pub struct WalletService {
    users: Arc<dyn UserRepo>,
    wallet: Arc<dyn WalletRepo>,
}

impl WalletService {
    pub fn new(users: Arc<dyn UserRepo>, wallet: Arc<dyn WalletRepo>) -> Self {
        Self { users, wallet }
    }

    /// Credit a broker's wallet. Invoked internally (listing rewards), so
    /// there is no role gate, only entity existence.
    pub async fn credit(&self, broker_id: Uuid, amount: i64, reason: &str) -> Result<i64, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        let new_balance = self.wallet.credit(broker_id, amount, reason).await?;
        info!("credited {} to broker {} ({})", amount, broker_id, reason);
        Ok(new_balance)
    }

    /// Withdraw from the caller's wallet.
    ///
    /// The balance check runs twice: once against a plain read for a fast
    /// user-facing error, then again inside the storage layer's conditional
    /// decrement. Two concurrent withdrawals that individually fit but
    /// jointly overdraw resolve with exactly one winner.
    pub async fn withdraw(&self, principal: &Principal, amount: i64) -> Result<Withdrawal, Error> {
        if principal.role != Role::Broker {
            return Err(Error::Forbidden(
                "Only brokers have a reward wallet.".to_string(),
            ));
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }

        let user = self
            .users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", principal.user_id)))?;

        if user.wallet_balance < amount {
            return Err(Error::InsufficientBalance {
                balance: user.wallet_balance,
                requested: amount,
            });
        }

        let reason = format!("Wallet withdrawal of {} coins", amount);
        let withdrawal = self
            .wallet
            .debit_if_sufficient(principal.user_id, amount, &reason)
            .await?
            .ok_or(Error::ConcurrentInsufficientBalance)?;

        info!(
            "broker {} withdrew {}, new balance {}",
            principal.user_id, amount, withdrawal.new_balance
        );
        Ok(withdrawal)
    }

    /// Current balance plus a newest-first page of the ledger.
    pub async fn get_wallet(
        &self,
        principal: &Principal,
        page: i64,
        limit: i64,
    ) -> Result<WalletStatement, Error> {
        if principal.role != Role::Broker {
            return Err(Error::Forbidden(
                "Only brokers have a reward wallet.".to_string(),
            ));
        }

        let user = self
            .users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", principal.user_id)))?;

        let req = PageRequest::new(page, if limit > 0 { limit } else { 20 });
        let transactions = self
            .wallet
            .list_transactions(principal.user_id, req.limit, req.offset())
            .await?;
        let total = self.wallet.count_transactions(principal.user_id).await?;

        Ok(WalletStatement {
            balance: user.wallet_balance,
            transactions,
            pagination: Pagination::new(total, req.page, req.limit),
        })
    }
}
