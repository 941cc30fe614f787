use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rentora_common::error::Error;
use rentora_common::models::rental::{
    FREE_GRANT_DAYS, OwnerRentals, PropertyRentalStatus, RentalPlan, RentalPurchase,
    RentalSubscription,
};
use rentora_common::models::user::{Principal, Role};
use rentora_common::traits::repository_traits::{PropertyRepo, RentalRepo, UserRepo};
use tracing::info;
use uuid::Uuid;

/// Owner-paid visibility windows. An owner's very first 7-day purchase is
/// free; a purchase before expiry extends the current window instead of
/// restarting it.
pub struct RentalService {
    users: Arc<dyn UserRepo>,
    properties: Arc<dyn PropertyRepo>,
    rentals: Arc<dyn RentalRepo>,
}

impl RentalService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        properties: Arc<dyn PropertyRepo>,
        rentals: Arc<dyn RentalRepo>,
    ) -> Self {
        Self {
            users,
            properties,
            rentals,
        }
    }

    pub fn rental_plans(&self) -> Vec<RentalPlan> {
        RentalPlan::catalog()
    }

    pub async fn purchase_rental_period(
        &self,
        principal: &Principal,
        property_id: Uuid,
        days: i32,
    ) -> Result<RentalPurchase, Error> {
        if principal.role != Role::Owner {
            return Err(Error::Forbidden(
                "Only owners can purchase rental periods.".to_string(),
            ));
        }

        let owner = self
            .users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Owner {} not found", principal.user_id)))?;

        let property = self
            .properties
            .get(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Property {} not found", property_id)))?;

        if property.owner_id != principal.user_id {
            return Err(Error::Forbidden(
                "You do not own this property.".to_string(),
            ));
        }

        let plan = RentalPlan::for_days(days).ok_or(Error::InvalidPlan(days))?;
        let now = Utc::now();

        // Free path: the owner's one-shot grant, only ever for the 7-day
        // plan. The claim is a compare-and-set on the owner row, so two
        // concurrent attempts cannot both get the grant; the loser falls
        // through to the paid path.
        if days == FREE_GRANT_DAYS && !owner.free_rental_grant_used {
            let start = now;
            let end = start + Duration::days(days as i64);
            let sub = RentalSubscription::new(
                principal.user_id,
                property_id,
                days,
                0,
                start,
                end,
                true,
            );
            if self.rentals.apply_free_rental_purchase(&sub).await? {
                info!(
                    "owner {} used free grant on property {} ({} days)",
                    principal.user_id, property_id, days
                );
                return Ok(RentalPurchase {
                    was_free: true,
                    days,
                    amount: 0,
                    start_date: start,
                    end_date: end,
                    subscription: sub,
                });
            }
        }

        // Paid path. Buying before expiry chains onto the current window.
        let start = match property.rental_period_end {
            Some(end) if end > now => end,
            _ => now,
        };
        let end = start + Duration::days(days as i64);
        let sub = RentalSubscription::new(
            principal.user_id,
            property_id,
            days,
            plan.price,
            start,
            end,
            false,
        );
        self.rentals.apply_paid_rental_purchase(&sub).await?;

        info!(
            "owner {} purchased {} days on property {} for {}",
            principal.user_id, days, property_id, plan.price
        );
        Ok(RentalPurchase {
            was_free: false,
            days,
            amount: plan.price,
            start_date: start,
            end_date: end,
            subscription: sub,
        })
    }

    /// Subscription history plus per-property visibility, derived against
    /// the current clock; no stored "active" flag.
    pub async fn get_owner_rentals(&self, principal: &Principal) -> Result<OwnerRentals, Error> {
        if principal.role != Role::Owner {
            return Err(Error::Forbidden(
                "Only owners can view rental subscriptions.".to_string(),
            ));
        }

        self.users
            .get(principal.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Owner {} not found", principal.user_id)))?;

        let subscriptions = self.rentals.list_subscriptions(principal.user_id).await?;

        let total = self.properties.count_by_owner(principal.user_id).await?;
        let owned = self
            .properties
            .list_by_owner(principal.user_id, total.max(1), 0)
            .await?;

        let now = Utc::now();
        let properties = owned
            .into_iter()
            .map(|p| {
                let is_active = p.is_rental_active_at(now);
                PropertyRentalStatus {
                    property_id: p.property_id,
                    title: p.title,
                    city: p.city,
                    area: p.area,
                    rent: p.rent,
                    rental_period_start: p.rental_period_start,
                    rental_period_end: p.rental_period_end,
                    is_first_property: p.is_first_property,
                    is_active,
                    days_remaining: days_remaining(p.rental_period_end, now),
                }
            })
            .collect();

        Ok(OwnerRentals {
            subscriptions,
            properties,
        })
    }

    pub async fn is_rental_active(&self, property_id: Uuid) -> Result<bool, Error> {
        let now = Utc::now();
        Ok(self
            .properties
            .get(property_id)
            .await?
            .map(|p| p.is_rental_active_at(now))
            .unwrap_or(false))
    }
}

/// Whole days left until `end`, rounded up, floored at zero.
fn days_remaining(end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match end {
        Some(end) => {
            let secs = (end - now).num_seconds();
            if secs <= 0 { 0 } else { (secs + 86_399) / 86_400 }
        }
        None => 0,
    }
}
