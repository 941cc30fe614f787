use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::Pagination;

/// Direction of a wallet ledger entry.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum TxKind {
    Credit,
    Debit,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Credit => write!(f, "credit"),
            TxKind::Debit => write!(f, "debit"),
        }
    }
}

/// Immutable ledger entry. The sum of credits minus debits for a broker is
/// the reconciliation source of truth for `User.wallet_balance`.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct WalletTransaction {
    pub tx_id: Uuid,
    pub broker_id: Uuid,
    pub amount: i64,
    pub tx_type: TxKind,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    pub fn new(broker_id: Uuid, amount: i64, tx_type: TxKind, reason: &str) -> Self {
        Self {
            tx_id: Uuid::new_v4(),
            broker_id,
            amount,
            tx_type,
            reason: reason.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Balance plus one newest-first page of the transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletStatement {
    pub balance: i64,
    pub transactions: Vec<WalletTransaction>,
    pub pagination: Pagination,
}

/// Result of a successful withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub new_balance: i64,
    pub transaction: WalletTransaction,
}
