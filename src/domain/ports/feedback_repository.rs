use crate::domain::entities::{FeedbackRequest, FeedbackStatus};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create_feedback(
        &self,
        user_id: i64,
        message: &str,
        created_at: &str,
    ) -> DomainResult<FeedbackRequest>;
    async fn get_feedback(&self, id: i64) -> DomainResult<Option<FeedbackRequest>>;
    /// Compare-and-set on status so concurrent admins cannot move a request backwards.
    async fn transition_feedback(
        &self,
        id: i64,
        from: FeedbackStatus,
        to: FeedbackStatus,
        admin_response: Option<&str>,
    ) -> DomainResult<bool>;
    /// Every request that is not closed, newest first.
    async fn list_active_feedback(&self) -> DomainResult<Vec<FeedbackRequest>>;
}
