use crate::domain::entities::{
    BookingDetails, BookingHistory, ClosureOutcome, ReminderKind, SlotTime,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::booking_repository::BookingRepository;
use crate::infrastructure::persistence::{map_listing, slot_time_from_row, Database};
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::Row;

const DETAILS_QUERY: &str = "SELECT b.id AS booking_id, b.user_id, b.slot_id, b.created_at,
            u.telegram_identity AS client_identity, u.name AS client_name,
            s.date, s.time, s.specialist_id,
            su.name AS specialist_name, su.telegram_identity AS specialist_identity,
            sp.specialization
     FROM bookings b
     JOIN users u ON u.id = b.user_id
     JOIN slots s ON s.id = b.slot_id
     JOIN specialists sp ON sp.id = s.specialist_id
     JOIN users su ON su.id = sp.user_id";

fn details_from_row(row: &AnyRow) -> DomainResult<BookingDetails> {
    Ok(BookingDetails {
        booking_id: row.try_get("booking_id")?,
        user_id: row.try_get("user_id")?,
        client_identity: row.try_get("client_identity")?,
        client_name: row.try_get("client_name")?,
        slot_id: row.try_get("slot_id")?,
        at: slot_time_from_row(row)?,
        specialist_id: row.try_get("specialist_id")?,
        specialist_name: row.try_get("specialist_name")?,
        specialist_identity: row.try_get("specialist_identity")?,
        specialization: row.try_get("specialization")?,
        created_at: row.try_get("created_at")?,
    })
}

fn history_from_row(row: &AnyRow) -> DomainResult<BookingHistory> {
    let outcome: String = row.try_get("outcome")?;
    Ok(BookingHistory {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        slot_id: row.try_get("slot_id")?,
        specialist_id: row.try_get("specialist_id")?,
        created_at: row.try_get("created_at")?,
        closed_at: row.try_get("closed_at")?,
        outcome: outcome.parse().map_err(DomainError::Persistence)?,
    })
}

#[async_trait]
impl BookingRepository for Database {
    async fn reserve(
        &self,
        user_id: i64,
        slot_id: i64,
        created_at: &str,
    ) -> DomainResult<BookingDetails> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-set on the flag. As the first write of the transaction it
        // takes the database write lock, so concurrent reservations serialize here.
        let flipped = sqlx::query("UPDATE slots SET is_booked = 1 WHERE id = ? AND is_booked = 0")
            .bind(slot_id)
            .execute(&mut *tx)
            .await?;

        if flipped.rows_affected() == 0 {
            let exists = sqlx::query("SELECT id FROM slots WHERE id = ?")
                .bind(slot_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            tx.rollback().await?;

            return Err(if exists {
                DomainError::Conflict("this slot is already booked".to_string())
            } else {
                DomainError::NotFound(format!("slot #{}", slot_id))
            });
        }

        let inserted = sqlx::query(
            "INSERT INTO bookings (user_id, slot_id, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(slot_id)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await;

        let booking_id: i64 = match inserted.and_then(|row| row.try_get("id")) {
            Ok(id) => id,
            Err(e) => {
                // The flag flip must not survive without its booking
                tx.rollback().await?;
                return Err(e.into());
            }
        };

        // Read the joined view before commit so a committed booking always
        // comes back with its details.
        let details = sqlx::query(&format!("{} WHERE b.id = ?", DETAILS_QUERY))
            .bind(booking_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(DomainError::from)
            .and_then(|row| details_from_row(&row));

        let details = match details {
            Ok(details) => details,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        };

        tx.commit().await?;
        Ok(details)
    }

    async fn close(
        &self,
        booking_id: i64,
        owner: Option<i64>,
        outcome: ClosureOutcome,
        closed_at: &str,
    ) -> DomainResult<Option<BookingHistory>> {
        let mut tx = self.pool.begin().await?;

        let deleted = match owner {
            Some(user_id) => {
                sqlx::query(
                    "DELETE FROM bookings WHERE id = ? AND user_id = ?
                     RETURNING user_id, slot_id, created_at",
                )
                .bind(booking_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => {
                sqlx::query(
                    "DELETE FROM bookings WHERE id = ? RETURNING user_id, slot_id, created_at",
                )
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let Some(deleted) = deleted else {
            let holder: Option<i64> = sqlx::query("SELECT user_id FROM bookings WHERE id = ?")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?
                .map(|row| row.try_get::<i64, _>("user_id"))
                .transpose()?;
            tx.rollback().await?;

            return match (owner, holder) {
                (None, _) => Ok(None),
                (Some(_), Some(_)) => Err(DomainError::Ownership(format!(
                    "booking #{} belongs to another user",
                    booking_id
                ))),
                (Some(_), None) => Err(DomainError::NotFound(format!("booking #{}", booking_id))),
            };
        };

        let user_id: i64 = deleted.try_get("user_id")?;
        let slot_id: i64 = deleted.try_get("slot_id")?;
        let created_at: String = deleted.try_get("created_at")?;

        let history = sqlx::query(
            "INSERT INTO booking_history
                 (user_id, slot_id, specialist_id, created_at, closed_at, outcome)
             SELECT ?, id, specialist_id, ?, ?, ? FROM slots WHERE id = ?
             RETURNING id, user_id, slot_id, specialist_id, created_at, closed_at, outcome",
        )
        .bind(user_id)
        .bind(created_at.as_str())
        .bind(closed_at)
        .bind(outcome.as_str())
        .bind(slot_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE slots SET is_booked = 0 WHERE id = ?")
            .bind(slot_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        history_from_row(&history).map(Some)
    }

    async fn get_booking_details(&self, booking_id: i64) -> DomainResult<Option<BookingDetails>> {
        let row = sqlx::query(&format!("{} WHERE b.id = ?", DETAILS_QUERY))
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(details_from_row).transpose()
    }

    async fn list_bookings_before(&self, at: SlotTime) -> DomainResult<Vec<BookingDetails>> {
        let date = at.date_key();
        let rows = sqlx::query(&format!(
            "{} WHERE s.date < ? OR (s.date = ? AND s.time < ?) ORDER BY s.date, s.time",
            DETAILS_QUERY
        ))
        .bind(date.as_str())
        .bind(date.as_str())
        .bind(at.time_key())
        .fetch_all(&self.pool)
        .await?;

        map_listing(&rows, details_from_row)
    }

    async fn list_live_bookings(&self) -> DomainResult<Vec<BookingDetails>> {
        let rows = sqlx::query(&format!("{} ORDER BY s.date, s.time", DETAILS_QUERY))
            .fetch_all(&self.pool)
            .await?;

        map_listing(&rows, details_from_row)
    }

    async fn list_bookings_for_user(&self, user_id: i64) -> DomainResult<Vec<BookingDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE b.user_id = ? ORDER BY s.date, s.time",
            DETAILS_QUERY
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        map_listing(&rows, details_from_row)
    }

    async fn list_bookings_for_specialist(
        &self,
        specialist_id: i64,
    ) -> DomainResult<Vec<BookingDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE s.specialist_id = ? ORDER BY s.date, s.time",
            DETAILS_QUERY
        ))
        .bind(specialist_id)
        .fetch_all(&self.pool)
        .await?;

        map_listing(&rows, details_from_row)
    }

    async fn list_history_for_user(&self, user_id: i64) -> DomainResult<Vec<BookingHistory>> {
        let rows = sqlx::query(
            "SELECT id, user_id, slot_id, specialist_id, created_at, closed_at, outcome
             FROM booking_history
             WHERE user_id = ?
             ORDER BY closed_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(history_from_row).collect()
    }

    async fn claim_reminder(
        &self,
        booking_id: i64,
        kind: ReminderKind,
        sent_at: &str,
    ) -> DomainResult<bool> {
        let result = sqlx::query(
            "INSERT INTO booking_reminders (booking_id, kind, sent_at) VALUES (?, ?, ?)
             ON CONFLICT(booking_id, kind) DO NOTHING",
        )
        .bind(booking_id)
        .bind(kind.as_str())
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_reminder(&self, booking_id: i64, kind: ReminderKind) -> DomainResult<()> {
        sqlx::query("DELETE FROM booking_reminders WHERE booking_id = ? AND kind = ?")
            .bind(booking_id)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
