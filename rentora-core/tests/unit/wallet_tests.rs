// File: rentora-core/tests/unit/wallet_tests.rs

use crate::helpers::*;
use rentora_common::Error;
use rentora_common::models::user::Role;
use rentora_common::models::wallet::TxKind;

#[tokio::test]
async fn withdraw_debits_balance_and_appends_ledger_entry() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 100);

    let withdrawal = ctx.wallet.withdraw(&broker, 40).await?;
    assert_eq!(withdrawal.new_balance, 60);
    assert_eq!(withdrawal.transaction.amount, 40);
    assert_eq!(withdrawal.transaction.tx_type, TxKind::Debit);

    let user = ctx.store.user(broker.user_id).unwrap();
    assert_eq!(user.wallet_balance, 60);

    let txs = ctx.store.wallet_transactions(broker.user_id);
    assert_eq!(txs.len(), 1);
    Ok(())
}

#[tokio::test]
async fn withdraw_rejects_non_positive_amounts() {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 100);

    assert!(matches!(
        ctx.wallet.withdraw(&broker, 0).await,
        Err(Error::InvalidAmount(0))
    ));
    assert!(matches!(
        ctx.wallet.withdraw(&broker, -5).await,
        Err(Error::InvalidAmount(-5))
    ));
}

#[tokio::test]
async fn withdraw_rejects_amount_over_balance() {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 30);

    match ctx.wallet.withdraw(&broker, 50).await {
        Err(Error::InsufficientBalance { balance, requested }) => {
            assert_eq!(balance, 30);
            assert_eq!(requested, 50);
        }
        other => panic!("expected InsufficientBalance, got {:?}", other.map(|w| w.new_balance)),
    }

    // Nothing was debited and nothing hit the ledger.
    assert_eq!(ctx.store.user(broker.user_id).unwrap().wallet_balance, 30);
    assert!(ctx.store.wallet_transactions(broker.user_id).is_empty());
}

#[tokio::test]
async fn withdraw_requires_broker_role() {
    let ctx = context();
    let customer = seed_user(&ctx.store, "carol", Role::Customer);

    assert!(matches!(
        ctx.wallet.withdraw(&customer, 10).await,
        Err(Error::Forbidden(_))
    ));
}

#[tokio::test]
async fn concurrent_withdrawals_cannot_jointly_overdraw() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 150);

    let w1 = {
        let wallet = ctx.wallet.clone();
        tokio::spawn(async move { wallet.withdraw(&broker, 100).await })
    };
    let w2 = {
        let wallet = ctx.wallet.clone();
        tokio::spawn(async move { wallet.withdraw(&broker, 100).await })
    };

    let r1 = w1.await.unwrap();
    let r2 = w2.await.unwrap();

    let successes = [&r1, &r2].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of two 100-withdrawals may win on 150");

    for r in [r1, r2] {
        match r {
            Ok(w) => assert_eq!(w.new_balance, 50),
            Err(e) => assert!(matches!(
                e,
                Error::InsufficientBalance { .. } | Error::ConcurrentInsufficientBalance
            )),
        }
    }

    let user = ctx.store.user(broker.user_id).unwrap();
    assert_eq!(user.wallet_balance, 50);
    assert_eq!(ctx.store.ledger_sum(broker.user_id), -100);
    Ok(())
}

#[tokio::test]
async fn many_concurrent_withdrawals_never_exceed_starting_balance() {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 100);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let wallet = ctx.wallet.clone();
        handles.push(tokio::spawn(async move { wallet.withdraw(&broker, 30).await }));
    }

    let mut withdrawn = 0;
    for h in handles {
        if let Ok(w) = h.await.unwrap() {
            let _ = w;
            withdrawn += 30;
        }
    }

    assert!(withdrawn <= 100);
    let user = ctx.store.user(broker.user_id).unwrap();
    assert_eq!(user.wallet_balance, 100 - withdrawn);
    assert_eq!(ctx.store.ledger_sum(broker.user_id), -withdrawn);
}

#[tokio::test]
async fn credit_increases_balance_and_logs() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 0);

    let balance = ctx
        .wallet
        .credit(broker.user_id, 10, "Reward for listing property: test")
        .await?;
    assert_eq!(balance, 10);

    let txs = ctx.store.wallet_transactions(broker.user_id);
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_type, TxKind::Credit);
    assert_eq!(ctx.store.ledger_sum(broker.user_id), 10);
    Ok(())
}

#[tokio::test]
async fn get_wallet_paginates_newest_first() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 0);

    for i in 1..=25 {
        ctx.wallet.credit(broker.user_id, i, "seed").await?;
    }

    let statement = ctx.wallet.get_wallet(&broker, 2, 10).await?;
    assert_eq!(statement.balance, (1..=25).sum::<i64>());
    assert_eq!(statement.transactions.len(), 10);
    assert_eq!(statement.pagination.total, 25);
    assert_eq!(statement.pagination.total_pages, 3);

    for pair in statement.transactions.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
    Ok(())
}

#[tokio::test]
async fn get_wallet_clamps_page_and_limit() -> Result<(), Error> {
    let ctx = context();
    let broker = seed_broker_with_balance(&ctx.store, 0);
    ctx.wallet.credit(broker.user_id, 5, "seed").await?;

    let statement = ctx.wallet.get_wallet(&broker, -3, 500).await?;
    assert_eq!(statement.pagination.page, 1);
    assert_eq!(statement.pagination.limit, 50);
    Ok(())
}
