//! Domain directory: the boundary to the winery-management backend.
//!
//! The bot never owns domain data. Accounts, users, wineries and tanks live
//! in the backend's Postgres database; this module exposes the handful of
//! lookups and writes the conversation needs through the [`Directory`] trait,
//! with [`PgDirectory`] as the production implementation. Soft-deleted rows
//! (`discarded_at` set) are invisible everywhere. The backend owns the
//! schema.

use anyhow::{Context, Result};
use sqlx::postgres::PgPool;
use teloxide::types::ChatId;

/// Binds a chat to exactly one (user, winery) pair. Presence of an account
/// is what "authenticated" means.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    pub chat_id: i64,
    pub user_id: i64,
    pub winery_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Winery {
    pub id: i64,
    pub name: String,
}

/// A tank with its current batch and sensor reading flattened in.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Tank {
    pub id: i64,
    pub name: String,
    pub batch_number: Option<String>,
    pub temperature: Option<f64>,
}

/// Domain-level failures the conversation layer distinguishes.
#[derive(Debug, Clone)]
pub enum DomainError {
    /// A write failed a consistency rule (e.g. an account already exists for
    /// the chat). Shown to the user behind the error banner.
    Validation(String),
    /// A lookup by id found nothing. Indicates stale or inconsistent data;
    /// propagates as a hard failure.
    NotFound(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Validation error: {msg}"),
            DomainError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}

/// Read/write access to the winery backend, narrowed to what the bot needs.
///
/// List queries return tanks ordered by name ascending; callers rely on that
/// ordering for pagination and must not reorder.
#[allow(async_fn_in_trait)]
pub trait Directory {
    async fn account_by_chat(&self, chat_id: ChatId) -> Result<Option<Account>>;

    /// Look up a user whose phone number reduces to the given subscriber
    /// number (see [`crate::phone::subscriber_number`]).
    async fn user_by_subscriber_number(&self, subscriber_number: &str) -> Result<Option<User>>;

    async fn wineries_of(&self, user_id: i64) -> Result<Vec<Winery>>;

    async fn winery_by_id(&self, winery_id: i64) -> Result<Option<Winery>>;

    /// Tanks of a winery ordered by name, optionally filtered by a search
    /// string matched against tank name and batch number.
    async fn tanks_of(&self, winery_id: i64, filter: Option<&str>) -> Result<Vec<Tank>>;

    async fn tank_by_id(&self, winery_id: i64, tank_id: i64) -> Result<Option<Tank>>;

    async fn create_account(&self, chat_id: ChatId, user_id: i64, winery_id: i64) -> Result<()>;

    async fn set_account_winery(&self, chat_id: ChatId, winery_id: i64) -> Result<()>;
}

/// Production directory backed by the backend's Postgres database.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Directory for PgDirectory {
    async fn account_by_chat(&self, chat_id: ChatId) -> Result<Option<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT chat_id, user_id, winery_id FROM accounts \
             WHERE chat_id = $1 AND discarded_at IS NULL",
        )
        .bind(chat_id.0)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up account by chat id")
    }

    async fn user_by_subscriber_number(&self, subscriber_number: &str) -> Result<Option<User>> {
        // Stored numbers may carry a +7 or 8 national prefix; reduce them the
        // same way the inbound contact was reduced.
        sqlx::query_as::<_, User>(
            "SELECT id, name, phone_number FROM users \
             WHERE regexp_replace(regexp_replace(phone_number, '^\\+7', ''), '^8', '') = $1 \
               AND discarded_at IS NULL",
        )
        .bind(subscriber_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by phone number")
    }

    async fn wineries_of(&self, user_id: i64) -> Result<Vec<Winery>> {
        sqlx::query_as::<_, Winery>(
            "SELECT w.id, w.name FROM wineries w \
             JOIN winery_users wu ON wu.winery_id = w.id \
             WHERE wu.user_id = $1 AND w.discarded_at IS NULL \
             ORDER BY w.name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list wineries of user")
    }

    async fn winery_by_id(&self, winery_id: i64) -> Result<Option<Winery>> {
        sqlx::query_as::<_, Winery>(
            "SELECT id, name FROM wineries WHERE id = $1 AND discarded_at IS NULL",
        )
        .bind(winery_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up winery by id")
    }

    async fn tanks_of(&self, winery_id: i64, filter: Option<&str>) -> Result<Vec<Tank>> {
        let base = "SELECT t.id, t.name, b.batch_number, p.temperature_sensor_value AS temperature \
             FROM tanks t \
             LEFT JOIN batches b ON b.tank_id = t.id \
             LEFT JOIN temperature_control_plugins p ON p.tank_id = t.id \
             WHERE t.winery_id = $1 AND t.discarded_at IS NULL";

        match filter {
            Some(search) => {
                let pattern = format!("%{}%", search.trim());
                sqlx::query_as::<_, Tank>(&format!(
                    "{base} AND (t.name ILIKE $2 OR b.batch_number ILIKE $2) ORDER BY t.name ASC"
                ))
                .bind(winery_id)
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
                .context("Failed to search tanks")
            }
            None => sqlx::query_as::<_, Tank>(&format!("{base} ORDER BY t.name ASC"))
                .bind(winery_id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list tanks"),
        }
    }

    async fn tank_by_id(&self, winery_id: i64, tank_id: i64) -> Result<Option<Tank>> {
        sqlx::query_as::<_, Tank>(
            "SELECT t.id, t.name, b.batch_number, p.temperature_sensor_value AS temperature \
             FROM tanks t \
             LEFT JOIN batches b ON b.tank_id = t.id \
             LEFT JOIN temperature_control_plugins p ON p.tank_id = t.id \
             WHERE t.winery_id = $1 AND t.id = $2 AND t.discarded_at IS NULL",
        )
        .bind(winery_id)
        .bind(tank_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up tank by id")
    }

    async fn create_account(&self, chat_id: ChatId, user_id: i64, winery_id: i64) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO accounts (chat_id, user_id, winery_id) VALUES ($1, $2, $3)",
        )
        .bind(chat_id.0)
        .bind(user_id)
        .bind(winery_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::Validation(format!(
                    "An account already exists for chat {chat_id}"
                ))
                .into())
            }
            Err(e) => Err(e).context("Failed to create account"),
        }
    }

    async fn set_account_winery(&self, chat_id: ChatId, winery_id: i64) -> Result<()> {
        let result = sqlx::query(
            "UPDATE accounts SET winery_id = $2 WHERE chat_id = $1 AND discarded_at IS NULL",
        )
        .bind(chat_id.0)
        .bind(winery_id)
        .execute(&self.pool)
        .await
        .context("Failed to update account winery")?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("No account for chat {chat_id}")).into());
        }

        Ok(())
    }
}
