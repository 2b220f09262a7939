use crate::domain::entities::{FeedbackRequest, FeedbackStatus};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::feedback_repository::FeedbackRepository;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

fn feedback_from_row(row: &AnyRow) -> DomainResult<FeedbackRequest> {
    let status: String = row.try_get("status")?;
    Ok(FeedbackRequest {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        message: row.try_get("message")?,
        status: status.parse().map_err(DomainError::Persistence)?,
        admin_response: row.try_get("admin_response")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl FeedbackRepository for Database {
    async fn create_feedback(
        &self,
        user_id: i64,
        message: &str,
        created_at: &str,
    ) -> DomainResult<FeedbackRequest> {
        let row = sqlx::query(
            "INSERT INTO feedback_requests (user_id, message, status, created_at)
             VALUES (?, ?, 'new', ?)
             RETURNING id, user_id, message, status, admin_response, created_at",
        )
        .bind(user_id)
        .bind(message)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        feedback_from_row(&row)
    }

    async fn get_feedback(&self, id: i64) -> DomainResult<Option<FeedbackRequest>> {
        let row = sqlx::query(
            "SELECT id, user_id, message, status, admin_response, created_at
             FROM feedback_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(feedback_from_row).transpose()
    }

    async fn transition_feedback(
        &self,
        id: i64,
        from: FeedbackStatus,
        to: FeedbackStatus,
        admin_response: Option<&str>,
    ) -> DomainResult<bool> {
        let result = sqlx::query(
            "UPDATE feedback_requests
             SET status = ?, admin_response = COALESCE(?, admin_response)
             WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(admin_response)
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_active_feedback(&self) -> DomainResult<Vec<FeedbackRequest>> {
        let rows = sqlx::query(
            "SELECT id, user_id, message, status, admin_response, created_at
             FROM feedback_requests
             WHERE status != 'closed'
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(feedback_from_row).collect()
    }
}
