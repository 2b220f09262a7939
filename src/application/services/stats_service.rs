use crate::domain::entities::SlotTime;
use crate::domain::errors::DomainResult;
use crate::domain::ports::{Clock, StatsRepository, SystemStats};
use std::sync::Arc;

#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsRepository>,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(stats: Arc<dyn StatsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { stats, clock }
    }

    pub async fn collect(&self) -> DomainResult<SystemStats> {
        let today = SlotTime::from_local(self.clock.local_now()).date_key();
        self.stats.collect_stats(&today).await
    }
}
