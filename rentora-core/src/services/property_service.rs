use std::sync::Arc;

use rentora_common::error::Error;
use rentora_common::models::property::{NewProperty, Property, PropertyDetail, PropertyFilter};
use rentora_common::models::user::{Principal, Role};
use rentora_common::models::{Page, PageRequest, Pagination};
use rentora_common::traits::repository_traits::PropertyRepo;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::{CoinService, WalletService};

/// Default broker reward per successful listing, overridable via
/// `BROKER_LISTING_REWARD` (see `crate::config`).
pub const DEFAULT_LISTING_REWARD: i64 = 10;

/// Listing catalog. This is the composing policy over the sibling engines:
/// a broker listing triggers a wallet credit, and the detail view asks the
/// coin engine for the viewer's unlock status.
pub struct PropertyService {
    properties: Arc<dyn PropertyRepo>,
    wallet: Arc<WalletService>,
    coins: Arc<CoinService>,
    listing_reward: i64,
}

impl PropertyService {
    pub fn new(
        properties: Arc<dyn PropertyRepo>,
        wallet: Arc<WalletService>,
        coins: Arc<CoinService>,
        listing_reward: i64,
    ) -> Self {
        Self {
            properties,
            wallet,
            coins,
            listing_reward,
        }
    }

    /// Create a listing. Owners list for themselves; brokers list on an
    /// owner's behalf (or as de-facto owner when none is named) and earn
    /// the listing reward.
    pub async fn create_property(
        &self,
        input: NewProperty,
        principal: &Principal,
    ) -> Result<Property, Error> {
        let (owner_id, broker_id) = match principal.role {
            Role::Owner => (principal.user_id, None),
            Role::Broker => (
                input.owner_id.unwrap_or(principal.user_id),
                Some(principal.user_id),
            ),
            Role::Customer => {
                return Err(Error::Forbidden(
                    "Customers cannot create property listings.".to_string(),
                ));
            }
        };

        let property = Property {
            property_id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            rent: input.rent,
            deposit: input.deposit,
            area: input.area,
            city: input.city,
            images: input.images,
            amenities: input.amenities,
            owner_id,
            broker_id,
            rental_period_days: None,
            rental_period_start: None,
            rental_period_end: None,
            is_first_property: false,
            created_at: Utc::now(),
        };
        self.properties.create(&property).await?;

        if principal.role == Role::Broker {
            let reason = format!("Reward for listing property: {}", property.title);
            // A failed reward must not lose the created listing; the ledger
            // can be reconciled from the property record.
            if let Err(e) = self
                .wallet
                .credit(principal.user_id, self.listing_reward, &reason)
                .await
            {
                warn!(
                    "listing reward credit failed for broker {}: {}",
                    principal.user_id, e
                );
            }
        }

        info!(
            "property {} created by {} ({})",
            property.property_id, principal.user_id, principal.role
        );
        Ok(property)
    }

    pub async fn list_properties(
        &self,
        filter: &PropertyFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<Property>, Error> {
        let req = PageRequest::new(page, if limit > 0 { limit } else { 10 });
        let items = self.properties.search(filter, req.limit, req.offset()).await?;
        let total = self.properties.count(filter).await?;
        Ok(Page {
            items,
            pagination: Pagination::new(total, req.page, req.limit),
        })
    }

    /// Detail view with explicit optional principal: only an authenticated
    /// customer gets an unlock-status answer, everyone else gets `None`.
    pub async fn get_property(
        &self,
        property_id: Uuid,
        viewer: Option<&Principal>,
    ) -> Result<PropertyDetail, Error> {
        let property = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Property {} not found", property_id)))?;

        let unlocked = match viewer {
            Some(p) if p.role == Role::Customer => Some(
                self.coins
                    .is_property_unlocked(p.user_id, property_id)
                    .await?,
            ),
            _ => None,
        };

        Ok(PropertyDetail { property, unlocked })
    }

    /// Listings created by the caller: brokers match on broker_id, owners
    /// on owner_id.
    pub async fn my_properties(
        &self,
        principal: &Principal,
        page: i64,
        limit: i64,
    ) -> Result<Page<Property>, Error> {
        let req = PageRequest::new(page, if limit > 0 { limit } else { 10 });
        let (items, total) = match principal.role {
            Role::Broker => (
                self.properties
                    .list_by_broker(principal.user_id, req.limit, req.offset())
                    .await?,
                self.properties.count_by_broker(principal.user_id).await?,
            ),
            Role::Owner => (
                self.properties
                    .list_by_owner(principal.user_id, req.limit, req.offset())
                    .await?,
                self.properties.count_by_owner(principal.user_id).await?,
            ),
            Role::Customer => {
                return Err(Error::Forbidden(
                    "Customers do not have listings.".to_string(),
                ));
            }
        };

        Ok(Page {
            items,
            pagination: Pagination::new(total, req.page, req.limit),
        })
    }
}
