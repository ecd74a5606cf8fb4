//! Integration tests for the credit ledger.
//!
//! Exercises initialization idempotency, the transactional spend path,
//! grants, history, and the ledger invariants against a real database.

use assert_matches::assert_matches;
use sqlx::PgPool;
use meshforge_core::catalog::{COST_TEXT_TO_3D_PREVIEW, SERVICE_TEXT_TO_3D_PREVIEW};
use meshforge_core::credits::{SIGNUP_BONUS_CREDITS, TX_TYPE_BONUS, TX_TYPE_EARN, TX_TYPE_SPEND};
use meshforge_db::repositories::{CreditRepo, GrantError, SpendError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn signup_bonus_rows(pool: &PgPool, user_id: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM credit_transactions
         WHERE user_id = $1 AND type = 'EARN' AND description = 'signup bonus'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();
    count
}

async fn transaction_count(pool: &PgPool, user_id: &str) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM credit_transactions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn initialize_grants_signup_bonus(pool: PgPool) {
    let head = CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    assert_eq!(head.current_credits, SIGNUP_BONUS_CREDITS);
    assert_eq!(head.total_earned, SIGNUP_BONUS_CREDITS);
    assert_eq!(head.total_spent, 0);

    let history = CreditRepo::history(&pool, "user-1", 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, SIGNUP_BONUS_CREDITS);
    assert_eq!(history[0].tx_type, TX_TYPE_EARN);
    assert_eq!(history[0].balance_after, SIGNUP_BONUS_CREDITS);
}

#[sqlx::test(migrations = "../../migrations")]
async fn initialize_is_idempotent(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    let second = CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    assert_eq!(second.current_credits, SIGNUP_BONUS_CREDITS);
    assert_eq!(signup_bonus_rows(&pool, "user-1").await, 1);
    assert_eq!(transaction_count(&pool, "user-1").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn initialize_does_not_regrant_after_spending(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    CreditRepo::spend(
        &pool,
        "user-1",
        SERVICE_TEXT_TO_3D_PREVIEW,
        COST_TEXT_TO_3D_PREVIEW,
        None,
    )
    .await
    .unwrap();

    let head = CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    assert_eq!(
        head.current_credits,
        SIGNUP_BONUS_CREDITS - COST_TEXT_TO_3D_PREVIEW
    );
    assert_eq!(signup_bonus_rows(&pool, "user-1").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn uninitialized_balance_reads_zero(pool: PgPool) {
    let balance = CreditRepo::balance(&pool, "ghost").await.unwrap();
    assert_eq!(balance, 0);
    assert!(CreditRepo::head(&pool, "ghost").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Spend
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn spend_debits_and_appends_log_row(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    let outcome = CreditRepo::spend(
        &pool,
        "user-1",
        SERVICE_TEXT_TO_3D_PREVIEW,
        COST_TEXT_TO_3D_PREVIEW,
        None,
    )
    .await
    .unwrap();

    let expected = SIGNUP_BONUS_CREDITS - COST_TEXT_TO_3D_PREVIEW;
    assert_eq!(outcome.remaining_credits, expected);
    assert_eq!(outcome.transaction.amount, -COST_TEXT_TO_3D_PREVIEW);
    assert_eq!(outcome.transaction.balance_after, expected);

    let head = CreditRepo::head(&pool, "user-1").await.unwrap().unwrap();
    assert_eq!(head.current_credits, expected);
    assert_eq!(head.total_spent, COST_TEXT_TO_3D_PREVIEW);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_to_exactly_zero_succeeds(pool: PgPool) {
    CreditRepo::credit(&pool, "user-1", 5, TX_TYPE_BONUS, "top-up")
        .await
        .unwrap();

    let outcome = CreditRepo::spend(&pool, "user-1", SERVICE_TEXT_TO_3D_PREVIEW, 5, None)
        .await
        .unwrap();

    assert_eq!(outcome.remaining_credits, 0);
    assert_eq!(outcome.transaction.amount, -5);
    assert_eq!(outcome.transaction.balance_after, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_with_insufficient_balance_writes_nothing(pool: PgPool) {
    let result = CreditRepo::spend(
        &pool,
        "broke",
        SERVICE_TEXT_TO_3D_PREVIEW,
        COST_TEXT_TO_3D_PREVIEW,
        None,
    )
    .await;

    assert_matches!(
        result,
        Err(SpendError::InsufficientCredits {
            required: 5,
            available: 0,
        })
    );
    assert_eq!(transaction_count(&pool, "broke").await, 0);
    assert_eq!(CreditRepo::balance(&pool, "broke").await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_rechecks_balance_each_time(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    // 45 credits cover exactly four 10-credit spends.
    for _ in 0..4 {
        CreditRepo::spend(&pool, "user-1", "text-to-3d-optimized", 10, None)
            .await
            .unwrap();
    }

    let result = CreditRepo::spend(&pool, "user-1", "text-to-3d-optimized", 10, None).await;
    assert_matches!(
        result,
        Err(SpendError::InsufficientCredits {
            required: 10,
            available: 5,
        })
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn concurrent_spends_never_overdraw(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    // 45 credits, eight concurrent 10-credit spends: exactly four can
    // pass the in-transaction affordability check.
    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            CreditRepo::spend(&pool, "user-1", "text-to-3d-optimized", 10, None).await
        }));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(SpendError::InsufficientCredits { .. }) => rejected += 1,
            Err(e) => panic!("unexpected spend failure: {e}"),
        }
    }

    assert_eq!(succeeded, 4);
    assert_eq!(rejected, 4);
    assert_eq!(CreditRepo::balance(&pool, "user-1").await.unwrap(), 5);
}

#[sqlx::test(migrations = "../../migrations")]
async fn spend_attaches_metadata_verbatim(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();

    let metadata = serde_json::json!({ "taskId": "task-9", "mode": "preview" });
    let outcome = CreditRepo::spend(
        &pool,
        "user-1",
        SERVICE_TEXT_TO_3D_PREVIEW,
        COST_TEXT_TO_3D_PREVIEW,
        Some(metadata.clone()),
    )
    .await
    .unwrap();

    assert_eq!(outcome.transaction.metadata, Some(metadata));
    assert!(
        outcome.transaction.service_type_id.is_some(),
        "spend against a seeded service type should link the catalog row"
    );
}

// ---------------------------------------------------------------------------
// Grants
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn credit_lazily_creates_head_without_bonus(pool: PgPool) {
    let outcome = CreditRepo::credit(&pool, "user-1", 30, TX_TYPE_EARN, "promo")
        .await
        .unwrap();

    assert_eq!(outcome.new_balance, 30);
    let head = CreditRepo::head(&pool, "user-1").await.unwrap().unwrap();
    assert_eq!(head.total_earned, 30);
    assert_eq!(head.total_spent, 0);
    assert_eq!(signup_bonus_rows(&pool, "user-1").await, 0);

    // A later initialize sees the existing head and grants nothing.
    let head = CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    assert_eq!(head.current_credits, 30);
    assert_eq!(signup_bonus_rows(&pool, "user-1").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn grants_reject_bad_amounts_and_types(pool: PgPool) {
    let result = CreditRepo::credit(&pool, "user-1", 0, TX_TYPE_BONUS, "nothing").await;
    assert_matches!(result, Err(GrantError::Invalid(_)));

    let result = CreditRepo::credit(&pool, "user-1", -5, TX_TYPE_BONUS, "negative").await;
    assert_matches!(result, Err(GrantError::Invalid(_)));

    // SPEND rows only come from the spend path.
    let result = CreditRepo::credit(&pool, "user-1", 5, TX_TYPE_SPEND, "sneaky").await;
    assert_matches!(result, Err(GrantError::Invalid(_)));

    assert_eq!(transaction_count(&pool, "user-1").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn credit_then_spend_round_trips(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    let before = CreditRepo::balance(&pool, "user-1").await.unwrap();
    let rows_before = transaction_count(&pool, "user-1").await;

    CreditRepo::credit(&pool, "user-1", 5, TX_TYPE_BONUS, "loyalty")
        .await
        .unwrap();
    CreditRepo::spend(
        &pool,
        "user-1",
        SERVICE_TEXT_TO_3D_PREVIEW,
        COST_TEXT_TO_3D_PREVIEW,
        None,
    )
    .await
    .unwrap();

    assert_eq!(CreditRepo::balance(&pool, "user-1").await.unwrap(), before);

    let history = CreditRepo::history(&pool, "user-1", 10).await.unwrap();
    assert_eq!(transaction_count(&pool, "user-1").await, rows_before + 2);
    assert_eq!(history[0].amount, -COST_TEXT_TO_3D_PREVIEW);
    assert_eq!(history[1].amount, 5);
}

// ---------------------------------------------------------------------------
// Invariants, history, stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn head_matches_log_replay(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    CreditRepo::credit(&pool, "user-1", 20, TX_TYPE_BONUS, "promo")
        .await
        .unwrap();
    CreditRepo::spend(&pool, "user-1", "text-to-3d-optimized", 10, None)
        .await
        .unwrap();

    let head = CreditRepo::head(&pool, "user-1").await.unwrap().unwrap();
    assert_eq!(
        head.current_credits,
        head.total_earned - head.total_spent,
        "head must always equal earned minus spent"
    );

    let history = CreditRepo::history(&pool, "user-1", 100).await.unwrap();
    let replayed: i32 = history.iter().map(|tx| tx.amount).sum();
    assert_eq!(replayed, head.current_credits);
    assert_eq!(history[0].balance_after, head.current_credits);
}

#[sqlx::test(migrations = "../../migrations")]
async fn history_is_newest_first_and_limited(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    for amount in [10, 20, 30] {
        CreditRepo::credit(&pool, "user-1", amount, TX_TYPE_BONUS, "batch")
            .await
            .unwrap();
    }

    let history = CreditRepo::history(&pool, "user-1", 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, 30);
    assert_eq!(history[1].amount, 20);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stats_returns_last_five_transactions(pool: PgPool) {
    CreditRepo::initialize(&pool, "user-1", "one@example.com")
        .await
        .unwrap();
    for _ in 0..6 {
        CreditRepo::credit(&pool, "user-1", 1, TX_TYPE_BONUS, "drip")
            .await
            .unwrap();
    }

    let stats = CreditRepo::stats(&pool, "user-1").await.unwrap();
    assert_eq!(stats.recent_transactions.len(), 5);
    assert_eq!(stats.current_credits, SIGNUP_BONUS_CREDITS + 6);
    assert_eq!(stats.total_earned, SIGNUP_BONUS_CREDITS + 6);
    assert_eq!(stats.total_spent, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stats_for_uninitialized_user_is_all_zero(pool: PgPool) {
    let stats = CreditRepo::stats(&pool, "ghost").await.unwrap();
    assert_eq!(stats.current_credits, 0);
    assert_eq!(stats.total_earned, 0);
    assert_eq!(stats.total_spent, 0);
    assert!(stats.recent_transactions.is_empty());
}
