use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub specialists: i64,
    pub clients: i64,
    pub live_bookings: i64,
    pub bookings_today: i64,
    pub booked_slots: i64,
    pub free_slots: i64,
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// `today` is the business-local date in storage form.
    async fn collect_stats(&self, today: &str) -> DomainResult<SystemStats>;
}
