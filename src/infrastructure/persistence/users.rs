use crate::domain::entities::{ChatIdentity, User, UserRole};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::user_repository::UserRepository;
use crate::infrastructure::persistence::Database;
use crate::shared::utils::datetime::timestamp;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

const USER_COLUMNS: &str = "id, telegram_identity, name, role, created_at";

pub(crate) fn user_from_row(row: &AnyRow) -> DomainResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        telegram_identity: row.try_get("telegram_identity")?,
        name: row.try_get("name")?,
        role: role.parse().map_err(DomainError::Persistence)?,
        created_at: row.try_get("created_at")?,
    })
}

// Internal helpers
impl Database {
    /// Insert-or-promote. The admin guard lives in SQL so it also holds inside
    /// the onboarding transaction.
    pub(crate) async fn assign_role_internal<'e, E>(
        &self,
        executor: E,
        identity: ChatIdentity,
        name: &str,
        role: UserRole,
    ) -> DomainResult<User>
    where
        E: sqlx::Executor<'e, Database = sqlx::Any>,
    {
        let row = sqlx::query(&format!(
            "INSERT INTO users (telegram_identity, name, role, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(telegram_identity) DO UPDATE SET
                 name = excluded.name,
                 role = CASE WHEN users.role = 'admin' THEN 'admin' ELSE excluded.role END
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(identity)
        .bind(name)
        .bind(role.as_str())
        .bind(timestamp(chrono::Utc::now()))
        .fetch_one(executor)
        .await?;

        user_from_row(&row)
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn find_user_by_identity(&self, identity: ChatIdentity) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE telegram_identity = ?",
            USER_COLUMNS
        ))
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Only a client's name follows the chat display name; specialists and
    /// admins keep the name they were registered with.
    async fn upsert_user(&self, identity: ChatIdentity, name: &str) -> DomainResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (telegram_identity, name, role, created_at)
             VALUES (?, ?, 'client', ?)
             ON CONFLICT(telegram_identity) DO UPDATE SET
                 name = CASE WHEN users.role = 'client' THEN excluded.name ELSE users.name END
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(identity)
        .bind(name)
        .bind(timestamp(chrono::Utc::now()))
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row)
    }

    async fn assign_role(
        &self,
        identity: ChatIdentity,
        name: &str,
        role: UserRole,
    ) -> DomainResult<User> {
        self.assign_role_internal(&self.pool, identity, name, role)
            .await
    }

    async fn list_admin_identities(&self) -> DomainResult<Vec<ChatIdentity>> {
        let rows = sqlx::query("SELECT telegram_identity FROM users WHERE role = 'admin'")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                row.try_get::<i64, _>("telegram_identity")
                    .map_err(DomainError::from)
            })
            .collect()
    }
}
