// File: rentora-core/tests/unit/property_tests.rs

use crate::helpers::*;
use rentora_common::Error;
use rentora_common::models::property::{NewProperty, PropertyFilter};
use rentora_common::models::user::Role;
use rentora_common::models::wallet::TxKind;
use uuid::Uuid;

fn listing(title: &str, area: &str, city: &str, rent: i64) -> NewProperty {
    NewProperty {
        title: title.to_string(),
        description: "Well lit, close to transit.".to_string(),
        rent,
        deposit: rent * 4,
        area: area.to_string(),
        city: city.to_string(),
        images: vec![],
        amenities: vec!["parking".to_string(), "lift".to_string()],
        owner_id: None,
    }
}

#[tokio::test]
async fn broker_listing_credits_the_listing_reward() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 0);

    let property = ctx
        .properties
        .create_property(listing("1BHK Aundh", "Aundh", "Pune", 15_000), &broker)
        .await?;

    assert_eq!(property.broker_id, Some(broker.user_id));
    // No owner named, so the broker is recorded as the owner too.
    assert_eq!(property.owner_id, broker.user_id);

    let user = ctx.store.user(broker.user_id).unwrap();
    assert_eq!(user.wallet_balance, TEST_LISTING_REWARD);

    let txs = ctx.store.wallet_transactions(broker.user_id);
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TxKind::Credit);
    assert_eq!(txs[0].amount, TEST_LISTING_REWARD);
    assert!(txs[0].reason.contains("1BHK Aundh"));
    Ok(())
}

#[tokio::test]
async fn broker_can_list_on_a_named_owners_behalf() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 0);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);

    let mut input = listing("3BHK Baner", "Baner", "Pune", 40_000);
    input.owner_id = Some(owner.user_id);

    let property = ctx.properties.create_property(input, &broker).await?;
    assert_eq!(property.owner_id, owner.user_id);
    assert_eq!(property.broker_id, Some(broker.user_id));
    Ok(())
}

#[tokio::test]
async fn owner_listing_earns_no_reward() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);

    let property = ctx
        .properties
        .create_property(listing("Row house", "Wakad", "Pune", 30_000), &owner)
        .await?;

    assert_eq!(property.owner_id, owner.user_id);
    assert_eq!(property.broker_id, None);
    assert!(ctx.store.wallet_transactions(owner.user_id).is_empty());
    Ok(())
}

#[tokio::test]
async fn customers_cannot_create_listings() {
    let ctx = context();
    let customer = seed_user(&ctx.store, "carol", Role::Customer);

    assert!(matches!(
        ctx.properties
            .create_property(listing("Studio", "Kothrud", "Pune", 12_000), &customer)
            .await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn search_combines_filters_with_and() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);

    ctx.properties
        .create_property(listing("Aundh flat", "Aundh", "Pune", 15_000), &owner)
        .await?;
    ctx.properties
        .create_property(listing("Baner flat", "Baner", "Pune", 40_000), &owner)
        .await?;
    ctx.properties
        .create_property(listing("Andheri flat", "Andheri", "Mumbai", 45_000), &owner)
        .await?;

    let pune = ctx
        .properties
        .list_properties(
            &PropertyFilter {
                city: Some("Pune".to_string()),
                ..Default::default()
            },
            1,
            10,
        )
        .await?;
    assert_eq!(pune.pagination.total, 2);

    let cheap_pune = ctx
        .properties
        .list_properties(
            &PropertyFilter {
                city: Some("Pune".to_string()),
                max_rent: Some(20_000),
                ..Default::default()
            },
            1,
            10,
        )
        .await?;
    assert_eq!(cheap_pune.items.len(), 1);
    assert_eq!(cheap_pune.items[0].title, "Aundh flat");

    // Area matching is a case-insensitive substring.
    let by_area = ctx
        .properties
        .list_properties(
            &PropertyFilter {
                area: Some("aun".to_string()),
                ..Default::default()
            },
            1,
            10,
        )
        .await?;
    assert_eq!(by_area.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn detail_view_reports_unlock_status_only_for_customers() -> Result<(), Error> {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_customer_with_coins(&ctx.store, 0, 0);
    let property = seed_property(&ctx.store, owner.user_id);

    let anonymous = ctx.properties.get_property(property.property_id, None).await?;
    assert_eq!(anonymous.unlocked, None);

    let as_owner = ctx
        .properties
        .get_property(property.property_id, Some(&owner))
        .await?;
    assert_eq!(as_owner.unlocked, None);

    let before = ctx
        .properties
        .get_property(property.property_id, Some(&customer))
        .await?;
    assert_eq!(before.unlocked, Some(false));

    ctx.coins
        .unlock_property(&customer, property.property_id)
        .await?;

    let after = ctx
        .properties
        .get_property(property.property_id, Some(&customer))
        .await?;
    assert_eq!(after.unlocked, Some(true));
    Ok(())
}

#[tokio::test]
async fn missing_property_detail_is_not_found() {
    let ctx = context();
    assert!(matches!(
        ctx.properties.get_property(Uuid::new_v4(), None).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn my_properties_matches_on_the_callers_role() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 0);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let customer = seed_user(&ctx.store, "carol", Role::Customer);

    let mut brokered = listing("Brokered flat", "Baner", "Pune", 40_000);
    brokered.owner_id = Some(owner.user_id);
    ctx.properties.create_property(brokered, &broker).await?;
    ctx.properties
        .create_property(listing("Own flat", "Wakad", "Pune", 30_000), &owner)
        .await?;

    let broker_view = ctx.properties.my_properties(&broker, 1, 10).await?;
    assert_eq!(broker_view.pagination.total, 1);
    assert_eq!(broker_view.items[0].title, "Brokered flat");

    // The owner sees both: their own listing and the brokered one.
    let owner_view = ctx.properties.my_properties(&owner, 1, 10).await?;
    assert_eq!(owner_view.pagination.total, 2);

    assert!(matches!(
        ctx.properties.my_properties(&customer, 1, 10).await,
        Err(Error::Forbidden(_))
    ));
    Ok(())
}
