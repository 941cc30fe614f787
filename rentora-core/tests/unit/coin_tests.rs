// File: rentora-core/tests/unit/coin_tests.rs

use crate::helpers::*;
use rentora_common::Error;
use rentora_common::models::user::Role;

#[tokio::test]
async fn purchasing_a_pack_adds_coins_plus_bonus() -> Result<(), Error> {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 0, 0);
    let pack = seed_pack(&ctx.store, 100, 10, 50);

    let purchase = ctx.coins.purchase_coin_pack(&customer, pack.pack_id).await?;
    assert_eq!(purchase.coins_added, 110);
    assert_eq!(purchase.new_balance, 110);

    assert_eq!(ctx.store.user(customer.user_id).unwrap().coin_balance, 110);
    Ok(())
}

#[tokio::test]
async fn inactive_packs_cannot_be_purchased_or_listed() -> Result<(), Error> {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 0, 0);
    let mut pack = seed_pack(&ctx.store, 100, 0, 50);
    pack.is_active = false;
    ctx.store.add_pack(pack.clone());

    assert!(matches!(
        ctx.coins.purchase_coin_pack(&customer, pack.pack_id).await,
        Err(Error::NotFound(_))
    ));
    assert!(ctx.coins.list_coin_packs().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn only_customers_may_buy_packs() {
    let ctx = context();
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let pack = seed_pack(&ctx.store, 100, 0, 50);

    assert!(matches!(
        ctx.coins.purchase_coin_pack(&owner, pack.pack_id).await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn first_three_unlocks_are_free_then_coins_are_charged() -> Result<(), Error> {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 10, 0);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);

    for i in 0..3 {
        let property = seed_property(&ctx.store, owner.user_id);
        let outcome = ctx
            .coins
            .unlock_property(&customer, property.property_id)
            .await?;
        assert!(outcome.was_free, "unlock {} should be free", i + 1);
        assert_eq!(outcome.coins_spent, 0);
        assert_eq!(outcome.new_coin_balance, 10);
    }

    let fourth = seed_property(&ctx.store, owner.user_id);
    let outcome = ctx
        .coins
        .unlock_property(&customer, fourth.property_id)
        .await?;
    assert!(!outcome.was_free);
    assert_eq!(outcome.coins_spent, 2);
    assert_eq!(outcome.new_coin_balance, 8);

    let user = ctx.store.user(customer.user_id).unwrap();
    assert_eq!(user.free_views_used, 3);
    assert_eq!(user.coin_balance, 8);
    Ok(())
}

#[tokio::test]
async fn unlock_is_idempotent_per_customer_and_property() -> Result<(), Error> {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 10, 3);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let property = seed_property(&ctx.store, owner.user_id);

    let first = ctx
        .coins
        .unlock_property(&customer, property.property_id)
        .await?;
    assert!(!first.already_unlocked);
    assert_eq!(first.coins_spent, 2);

    for _ in 0..4 {
        let replay = ctx
            .coins
            .unlock_property(&customer, property.property_id)
            .await?;
        assert!(replay.already_unlocked);
        assert_eq!(replay.was_free, first.was_free);
        assert_eq!(replay.coins_spent, first.coins_spent);
    }

    assert_eq!(
        ctx.store.unlock_count(customer.user_id, property.property_id),
        1
    );
    // Charged exactly once.
    assert_eq!(ctx.store.user(customer.user_id).unwrap().coin_balance, 8);
    Ok(())
}

#[tokio::test]
async fn paid_unlock_fails_without_enough_coins() {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 1, 3);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let property = seed_property(&ctx.store, owner.user_id);

    match ctx.coins.unlock_property(&customer, property.property_id).await {
        Err(Error::InsufficientCoins { balance, required }) => {
            assert_eq!(balance, 1);
            assert_eq!(required, 2);
        }
        other => panic!("expected InsufficientCoins, got {:?}", other.is_ok()),
    }

    assert_eq!(
        ctx.store.unlock_count(customer.user_id, property.property_id),
        0
    );
}

#[tokio::test]
async fn concurrent_unlocks_of_one_property_charge_once() {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 2, 3);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);
    let property = seed_property(&ctx.store, owner.user_id);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let coins = ctx.coins.clone();
        let property_id = property.property_id;
        handles.push(tokio::spawn(async move {
            coins.unlock_property(&customer, property_id).await
        }));
    }

    let mut fresh = 0;
    for h in handles {
        let outcome = h.await.unwrap().expect("no unlock attempt should error");
        if !outcome.already_unlocked {
            fresh += 1;
        }
    }

    assert_eq!(fresh, 1, "exactly one attempt claims the unlock");
    assert_eq!(
        ctx.store.unlock_count(customer.user_id, property.property_id),
        1
    );
    assert_eq!(ctx.store.user(customer.user_id).unwrap().coin_balance, 0);
}

#[tokio::test]
async fn unlocking_a_missing_property_is_not_found() {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 10, 0);

    assert!(matches!(
        ctx.coins.unlock_property(&customer, uuid::Uuid::new_v4()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn customer_wallet_reports_quota_and_history() -> Result<(), Error> {
    let ctx = context();
    let customer = seed_customer_with_coins(&ctx.store, 6, 0);
    let owner = seed_user(&ctx.store, "omar", Role::Owner);

    for _ in 0..2 {
        let property = seed_property(&ctx.store, owner.user_id);
        ctx.coins
            .unlock_property(&customer, property.property_id)
            .await?;
    }

    let wallet = ctx.coins.get_customer_wallet(&customer).await?;
    assert_eq!(wallet.coins, 6);
    assert_eq!(wallet.free_views_used, 2);
    assert_eq!(wallet.free_views_remaining, 1);
    assert_eq!(wallet.unlocked_properties.len(), 2);
    Ok(())
}
