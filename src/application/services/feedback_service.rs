use crate::application::services::notifier::Notifier;
use crate::domain::entities::{FeedbackRequest, FeedbackStatus};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Clock, FeedbackRepository, UserRepository};
use crate::shared::utils::datetime::timestamp;
use crate::shared::utils::name_validator::require_text;
use std::sync::Arc;

#[derive(Clone)]
pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl FeedbackService {
    pub fn new(
        feedback: Arc<dyn FeedbackRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            feedback,
            users,
            notifier,
            clock,
        }
    }

    pub async fn submit(&self, user_id: i64, text: &str) -> DomainResult<FeedbackRequest> {
        let message = require_text(text, "Message")?;
        let request = self
            .feedback
            .create_feedback(user_id, &message, &timestamp(self.clock.now_utc()))
            .await?;

        tracing::info!(request_id = request.id, user_id, "Feedback submitted");
        self.notifier
            .notify_admins(&format!("✉️ New feedback #{}: {}", request.id, request.message))
            .await;
        Ok(request)
    }

    async fn get(&self, request_id: i64) -> DomainResult<FeedbackRequest> {
        self.feedback
            .get_feedback(request_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("feedback request #{}", request_id)))
    }

    async fn transition(
        &self,
        request: &FeedbackRequest,
        to: FeedbackStatus,
        admin_response: Option<&str>,
    ) -> DomainResult<()> {
        request.status.advance_to(to)?;

        if !self
            .feedback
            .transition_feedback(request.id, request.status, to, admin_response)
            .await?
        {
            return Err(DomainError::Conflict(format!(
                "feedback request #{} was changed by someone else",
                request.id
            )));
        }
        Ok(())
    }

    async fn notify_author(&self, request: &FeedbackRequest, text: &str) {
        match self.users.get_user_by_id(request.user_id).await {
            Ok(Some(author)) => {
                self.notifier.notify(author.telegram_identity, text).await;
            }
            Ok(None) => tracing::warn!(request_id = request.id, "Feedback author is gone"),
            Err(e) => tracing::error!(request_id = request.id, error = %e, "Cannot load feedback author"),
        }
    }

    /// Stores the admin answer, moves the request to in-progress and tells the author.
    pub async fn respond(&self, request_id: i64, text: &str) -> DomainResult<FeedbackRequest> {
        let response = require_text(text, "Response")?;
        let request = self.get(request_id).await?;

        self.transition(&request, FeedbackStatus::InProgress, Some(&response))
            .await?;
        tracing::info!(request_id, "Feedback answered");

        self.notify_author(&request, &format!("✉️ Administrator reply: {}", response))
            .await;
        self.get(request_id).await
    }

    pub async fn close(&self, request_id: i64) -> DomainResult<FeedbackRequest> {
        let request = self.get(request_id).await?;

        self.transition(&request, FeedbackStatus::Closed, None).await?;
        tracing::info!(request_id, "Feedback closed");

        self.notify_author(
            &request,
            &format!("✅ Your request #{} has been closed.", request.id),
        )
        .await;
        self.get(request_id).await
    }

    pub async fn list_active(&self) -> DomainResult<Vec<FeedbackRequest>> {
        self.feedback.list_active_feedback().await
    }
}
