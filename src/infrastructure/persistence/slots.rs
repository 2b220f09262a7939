use crate::domain::entities::{Slot, SlotTime};
use crate::domain::errors::DomainResult;
use crate::domain::ports::slot_repository::SlotRepository;
use crate::infrastructure::persistence::{
    flag_from_row, map_listing, slot_time_from_row, Database,
};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

fn slot_from_row(row: &AnyRow) -> DomainResult<Slot> {
    Ok(Slot {
        id: row.try_get("id")?,
        specialist_id: row.try_get("specialist_id")?,
        at: slot_time_from_row(row)?,
        is_booked: flag_from_row(row, "is_booked")?,
    })
}

#[async_trait]
impl SlotRepository for Database {
    async fn create_slot(&self, specialist_id: i64, at: SlotTime) -> DomainResult<Slot> {
        let row = sqlx::query(
            "INSERT INTO slots (specialist_id, date, time, is_booked) VALUES (?, ?, ?, 0)
             RETURNING id, specialist_id, date, time, is_booked",
        )
        .bind(specialist_id)
        .bind(at.date_key())
        .bind(at.time_key())
        .fetch_one(&self.pool)
        .await?;

        slot_from_row(&row)
    }

    async fn get_slot(&self, id: i64) -> DomainResult<Option<Slot>> {
        let row = sqlx::query(
            "SELECT id, specialist_id, date, time, is_booked FROM slots WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(slot_from_row).transpose()
    }

    async fn update_free_slot(&self, id: i64, at: SlotTime) -> DomainResult<bool> {
        let result =
            sqlx::query("UPDATE slots SET date = ?, time = ? WHERE id = ? AND is_booked = 0")
                .bind(at.date_key())
                .bind(at.time_key())
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_free_slot(&self, id: i64) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM slots WHERE id = ? AND is_booked = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_slots_from(&self, specialist_id: i64, from: SlotTime) -> DomainResult<Vec<Slot>> {
        let date = from.date_key();
        let rows = sqlx::query(
            "SELECT id, specialist_id, date, time, is_booked FROM slots
             WHERE specialist_id = ? AND (date > ? OR (date = ? AND time >= ?))
             ORDER BY date, time",
        )
        .bind(specialist_id)
        .bind(date.as_str())
        .bind(date.as_str())
        .bind(from.time_key())
        .fetch_all(&self.pool)
        .await?;

        map_listing(&rows, slot_from_row)
    }

    async fn list_slots(&self, specialist_id: i64) -> DomainResult<Vec<Slot>> {
        let rows = sqlx::query(
            "SELECT id, specialist_id, date, time, is_booked FROM slots
             WHERE specialist_id = ?
             ORDER BY date, time",
        )
        .bind(specialist_id)
        .fetch_all(&self.pool)
        .await?;

        map_listing(&rows, slot_from_row)
    }

    async fn prune_free_slots_before(&self, cutoff: SlotTime) -> DomainResult<u64> {
        let date = cutoff.date_key();
        let result = sqlx::query(
            "DELETE FROM slots
             WHERE is_booked = 0 AND (date < ? OR (date = ? AND time < ?))",
        )
        .bind(date.as_str())
        .bind(date.as_str())
        .bind(cutoff.time_key())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_slot_if_absent(&self, specialist_id: i64, at: SlotTime) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT INTO slots (specialist_id, date, time, is_booked) VALUES (?, ?, ?, 0)
             ON CONFLICT(specialist_id, date, time) DO NOTHING",
        )
        .bind(specialist_id)
        .bind(at.date_key())
        .bind(at.time_key())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
