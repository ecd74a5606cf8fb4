//! Repository for the credit ledger: the `user_credits` head row and
//! the append-only `credit_transactions` log.
//!
//! Every balance mutation updates the head and appends a log row inside
//! one database transaction, so no partial effect is ever observable.
//! The head row is locked (`FOR UPDATE`) for the duration of a spend,
//! which serializes concurrent spends per user and makes the
//! affordability re-check authoritative.

use sqlx::PgPool;
use meshforge_core::credits::{
    validate_grant_amount, validate_grant_type, SIGNUP_BONUS_CREDITS, SIGNUP_BONUS_DESCRIPTION,
    STATS_RECENT_LIMIT, TX_TYPE_EARN, TX_TYPE_SPEND,
};
use meshforge_core::error::CoreError;

use crate::models::credits::{
    CreditStats, CreditTransaction, CreditTransactionWithService, GrantOutcome, SpendOutcome,
    UserCredits,
};

/// Column list for `user_credits` queries.
const HEAD_COLUMNS: &str = "user_id, current_credits, total_earned, total_spent, \
    created_at, updated_at";

/// Column list for `credit_transactions` queries.
const TX_COLUMNS: &str = "id, user_id, service_type_id, amount, type, description, \
    balance_after, metadata, created_at";

/// Column list for transaction rows joined with their service type.
const TX_JOINED_COLUMNS: &str = "ct.id, ct.user_id, ct.service_type_id, ct.amount, \
    ct.type, ct.description, ct.balance_after, ct.metadata, ct.created_at, \
    st.name AS service_type_name, st.description AS service_type_description";

/// A spend that could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum SpendError {
    /// The balance at spend time was below the service cost. Nothing
    /// was written.
    #[error("Insufficient credits: have {available}, need {required}")]
    InsufficientCredits { required: i32, available: i32 },

    /// The underlying database operation failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A grant that could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    /// The amount or transaction type violates the grant contract.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The underlying database operation failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Ledger operations over `user_credits` + `credit_transactions`.
pub struct CreditRepo;

impl CreditRepo {
    /// Initialize a user's credit account, granting the signup bonus
    /// exactly once.
    ///
    /// Idempotent: the user row is upserted, the head row is inserted
    /// only if absent, and the bonus transaction is appended only when
    /// the head row was created here. A partial unique index on the
    /// bonus row makes concurrent duplicate grants fail closed.
    pub async fn initialize(
        pool: &PgPool,
        user_id: &str,
        email: &str,
    ) -> Result<UserCredits, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (id, email) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(email)
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query(
            "INSERT INTO user_credits (user_id, current_credits, total_earned, total_spent)
             VALUES ($1, $2, $2, 0)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(SIGNUP_BONUS_CREDITS)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if created {
            sqlx::query(
                "INSERT INTO credit_transactions
                    (user_id, amount, type, description, balance_after)
                 VALUES ($1, $2, $3, $4, $2)
                 ON CONFLICT (user_id) WHERE type = 'EARN' AND description = 'signup bonus'
                 DO NOTHING",
            )
            .bind(user_id)
            .bind(SIGNUP_BONUS_CREDITS)
            .bind(TX_TYPE_EARN)
            .bind(SIGNUP_BONUS_DESCRIPTION)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!("SELECT {HEAD_COLUMNS} FROM user_credits WHERE user_id = $1");
        let head = sqlx::query_as::<_, UserCredits>(&query)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if created {
            tracing::info!(user_id, credits = SIGNUP_BONUS_CREDITS, "Credit account initialized");
        }

        Ok(head)
    }

    /// Current balance; uninitialized users read as zero, not an error.
    pub async fn balance(pool: &PgPool, user_id: &str) -> Result<i32, sqlx::Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT current_credits FROM user_credits WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(credits,)| credits).unwrap_or(0))
    }

    /// Optimistic affordability check: `balance >= cost`.
    ///
    /// Advisory only -- `spend` re-checks inside its transaction, since
    /// time may pass between check and spend.
    pub async fn can_afford(pool: &PgPool, user_id: &str, cost: i32) -> Result<bool, sqlx::Error> {
        Ok(Self::balance(pool, user_id).await? >= cost)
    }

    /// Fetch the full head row, if any.
    pub async fn head(pool: &PgPool, user_id: &str) -> Result<Option<UserCredits>, sqlx::Error> {
        let query = format!("SELECT {HEAD_COLUMNS} FROM user_credits WHERE user_id = $1");
        sqlx::query_as::<_, UserCredits>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically debit `cost` credits for a priced service.
    ///
    /// Locks the head row, re-checks affordability against the live
    /// balance (mandatory even when the caller already checked -- time
    /// may have passed), decrements the head, and appends a SPEND row
    /// carrying the post-commit balance and the caller's metadata.
    /// Either everything commits or nothing does.
    pub async fn spend(
        pool: &PgPool,
        user_id: &str,
        service_type: &str,
        cost: i32,
        metadata: Option<serde_json::Value>,
    ) -> Result<SpendOutcome, SpendError> {
        let mut tx = pool.begin().await?;

        let head: Option<(i32,)> = sqlx::query_as(
            "SELECT current_credits FROM user_credits WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let available = head.map(|(credits,)| credits).unwrap_or(0);
        if available < cost {
            return Err(SpendError::InsufficientCredits {
                required: cost,
                available,
            });
        }

        let (remaining,): (i32,) = sqlx::query_as(
            "UPDATE user_credits
             SET current_credits = current_credits - $2,
                 total_spent = total_spent + $2,
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING current_credits",
        )
        .bind(user_id)
        .bind(cost)
        .fetch_one(&mut *tx)
        .await?;

        let service_type_id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM service_types WHERE name = $1")
                .bind(service_type)
                .fetch_optional(&mut *tx)
                .await?;

        let query = format!(
            "INSERT INTO credit_transactions
                (user_id, service_type_id, amount, type, description, balance_after, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TX_COLUMNS}"
        );
        let transaction = sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(user_id)
            .bind(service_type_id.map(|(id,)| id))
            .bind(-cost)
            .bind(TX_TYPE_SPEND)
            .bind(format!("Used service {service_type}"))
            .bind(remaining)
            .bind(metadata)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id, service_type, cost, remaining, "Credits spent");

        Ok(SpendOutcome {
            transaction,
            remaining_credits: remaining,
        })
    }

    /// Atomically grant `amount` credits (EARN, BONUS, or REFUND).
    ///
    /// `amount` must be positive and `tx_type` one of the grant types;
    /// SPEND rows only ever come from [`spend`](Self::spend). Creates
    /// the head row lazily if the user has never been initialized --
    /// this path grants no signup bonus.
    pub async fn credit(
        pool: &PgPool,
        user_id: &str,
        amount: i32,
        tx_type: &str,
        description: &str,
    ) -> Result<GrantOutcome, GrantError> {
        validate_grant_type(tx_type)?;
        validate_grant_amount(amount)?;

        let mut tx = pool.begin().await?;

        // The ledger head references users, so the lazy path needs the
        // user row present as well.
        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let (new_balance,): (i32,) = sqlx::query_as(
            "INSERT INTO user_credits (user_id, current_credits, total_earned, total_spent)
             VALUES ($1, $2, $2, 0)
             ON CONFLICT (user_id) DO UPDATE
             SET current_credits = user_credits.current_credits + $2,
                 total_earned = user_credits.total_earned + $2,
                 updated_at = NOW()
             RETURNING current_credits",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO credit_transactions
                (user_id, amount, type, description, balance_after)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TX_COLUMNS}"
        );
        let transaction = sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(user_id)
            .bind(amount)
            .bind(tx_type)
            .bind(description)
            .bind(new_balance)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id, amount, tx_type, new_balance, "Credits granted");

        Ok(GrantOutcome {
            transaction,
            new_balance,
        })
    }

    /// Transaction history, newest first, joined with service types.
    pub async fn history(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<CreditTransactionWithService>, sqlx::Error> {
        let query = format!(
            "SELECT {TX_JOINED_COLUMNS}
             FROM credit_transactions ct
             LEFT JOIN service_types st ON st.id = ct.service_type_id
             WHERE ct.user_id = $1
             ORDER BY ct.created_at DESC, ct.id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, CreditTransactionWithService>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Balance summary plus the five most recent transactions.
    pub async fn stats(pool: &PgPool, user_id: &str) -> Result<CreditStats, sqlx::Error> {
        let head = Self::head(pool, user_id).await?;
        let recent = Self::history(pool, user_id, STATS_RECENT_LIMIT).await?;

        Ok(match head {
            Some(head) => CreditStats {
                current_credits: head.current_credits,
                total_earned: head.total_earned,
                total_spent: head.total_spent,
                recent_transactions: recent,
            },
            None => CreditStats {
                current_credits: 0,
                total_earned: 0,
                total_spent: 0,
                recent_transactions: recent,
            },
        })
    }
}
