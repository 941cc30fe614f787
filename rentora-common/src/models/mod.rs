// File: rentora-common/src/models/mod.rs
pub mod appointment;
pub mod coin;
pub mod property;
pub mod rental;
pub mod user;
pub mod wallet;

pub use appointment::{Appointment, AppointmentStatus};
pub use coin::{CoinPack, CoinPurchase, CustomerWallet, UnlockClaim, UnlockOutcome, UnlockedProperty};
pub use property::{NewProperty, Property, PropertyDetail, PropertyFilter};
pub use rental::{
    OwnerRentals, PaymentStatus, PropertyRentalStatus, RentalPlan, RentalPurchase,
    RentalSubscription,
};
pub use user::{Principal, Role, User};
pub use wallet::{TxKind, WalletStatement, WalletTransaction, Withdrawal};

use serde::{Deserialize, Serialize};

/// Pagination envelope shared by all list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Normalised page/limit pair: page >= 1, limit clamped to 1..=50.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 50),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}
