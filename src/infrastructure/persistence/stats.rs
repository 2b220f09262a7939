use crate::domain::errors::DomainResult;
use crate::domain::ports::stats_repository::{StatsRepository, SystemStats};
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::Row;

#[async_trait]
impl StatsRepository for Database {
    async fn collect_stats(&self, today: &str) -> DomainResult<SystemStats> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM specialists) AS specialists,
                (SELECT COUNT(*) FROM users WHERE role = 'client') AS clients,
                (SELECT COUNT(*) FROM bookings) AS live_bookings,
                (SELECT COUNT(*) FROM bookings b JOIN slots s ON s.id = b.slot_id
                    WHERE s.date = ?) AS bookings_today,
                (SELECT COUNT(*) FROM slots WHERE is_booked = 1) AS booked_slots,
                (SELECT COUNT(*) FROM slots WHERE is_booked = 0) AS free_slots",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(SystemStats {
            specialists: row.try_get("specialists")?,
            clients: row.try_get("clients")?,
            live_bookings: row.try_get("live_bookings")?,
            bookings_today: row.try_get("bookings_today")?,
            booked_slots: row.try_get("booked_slots")?,
            free_slots: row.try_get("free_slots")?,
        })
    }
}
