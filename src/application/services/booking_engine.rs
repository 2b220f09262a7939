use crate::application::services::notifier::Notifier;
use crate::domain::entities::{BookingDetails, BookingHistory, ClosureOutcome, SlotTime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{BookingRepository, Clock, SlotRepository};
use crate::shared::utils::datetime::timestamp;
use std::sync::Arc;

/// Reserves, cancels and expires bookings. Every state change is one
/// transaction in the repository; notifications go out after commit.
#[derive(Clone)]
pub struct BookingEngine {
    bookings: Arc<dyn BookingRepository>,
    slots: Arc<dyn SlotRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl BookingEngine {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        slots: Arc<dyn SlotRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            slots,
            notifier,
            clock,
        }
    }

    fn local_now(&self) -> SlotTime {
        SlotTime::from_local(self.clock.local_now())
    }

    pub async fn reserve(&self, user_id: i64, slot_id: i64) -> DomainResult<BookingDetails> {
        let slot = self
            .slots
            .get_slot(slot_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("slot #{}", slot_id)))?;
        if slot.at < self.local_now() {
            return Err(DomainError::Conflict(
                "this slot has already passed".to_string(),
            ));
        }

        let details = match self
            .bookings
            .reserve(user_id, slot_id, &timestamp(self.clock.now_utc()))
            .await
        {
            Ok(details) => details,
            Err(e) => {
                if matches!(e, DomainError::Conflict(_)) {
                    metrics::counter!("booking_conflicts_total").increment(1);
                    tracing::info!(user_id, slot_id, "Reservation lost to a concurrent booking");
                }
                return Err(e);
            }
        };

        metrics::counter!("bookings_reserved_total").increment(1);
        tracing::info!(booking_id = details.booking_id, user_id, slot_id, "Slot reserved");

        self.notifier
            .notify(
                details.client_identity,
                &format!(
                    "✅ You are booked! 📅 {} with {} ({})",
                    details.at, details.specialist_name, details.specialization
                ),
            )
            .await;
        self.notifier
            .notify(
                details.specialist_identity,
                &format!("📅 New booking: {} from {}", details.at, details.client_name),
            )
            .await;
        self.notifier
            .notify_admins(&format!(
                "New booking: {} booked {} (#{}) for {}",
                details.client_name, details.specialist_name, details.specialist_id, details.at
            ))
            .await;

        Ok(details)
    }

    /// Only the owner may cancel; anyone else gets `Ownership` and nothing changes.
    pub async fn cancel(&self, booking_id: i64, requesting_user: i64) -> DomainResult<BookingDetails> {
        let details = self
            .bookings
            .get_booking_details(booking_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("booking #{}", booking_id)))?;

        if details.user_id != requesting_user {
            tracing::warn!(booking_id, requesting_user, "Cancellation by non-owner refused");
            return Err(DomainError::Ownership(format!(
                "booking #{} belongs to another user",
                booking_id
            )));
        }

        self.bookings
            .close(
                booking_id,
                Some(requesting_user),
                ClosureOutcome::Cancelled,
                &timestamp(self.clock.now_utc()),
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("booking #{}", booking_id)))?;

        metrics::counter!("bookings_cancelled_total").increment(1);
        tracing::info!(booking_id, slot_id = details.slot_id, "Booking cancelled");

        self.notifier
            .notify(
                details.client_identity,
                &format!("✅ Your booking for {} has been cancelled.", details.at),
            )
            .await;
        self.notifier
            .notify(
                details.specialist_identity,
                &format!("❌ {} cancelled the booking for {}", details.client_name, details.at),
            )
            .await;

        Ok(details)
    }

    /// Closes a booking whose time has passed. Returns `None` if another
    /// caller got there first.
    pub async fn expire(&self, booking_id: i64) -> DomainResult<Option<BookingHistory>> {
        let Some(details) = self.bookings.get_booking_details(booking_id).await? else {
            return Ok(None);
        };

        let Some(history) = self
            .bookings
            .close(
                booking_id,
                None,
                ClosureOutcome::Expired,
                &timestamp(self.clock.now_utc()),
            )
            .await?
        else {
            return Ok(None);
        };

        metrics::counter!("bookings_expired_total").increment(1);
        tracing::info!(booking_id, slot_id = details.slot_id, "Booking expired");

        self.notifier
            .notify(
                details.client_identity,
                &format!("⏰ Your booking for {} has expired and was closed.", details.at),
            )
            .await;

        Ok(Some(history))
    }

    /// Live bookings whose slot is already in the past.
    pub async fn expirable(&self) -> DomainResult<Vec<BookingDetails>> {
        self.bookings.list_bookings_before(self.local_now()).await
    }

    /// The user's live bookings. Past entries are expired on the way.
    pub async fn bookings_for_user(&self, user_id: i64) -> DomainResult<Vec<BookingDetails>> {
        let now = self.local_now();
        let mut live = Vec::new();

        for booking in self.bookings.list_bookings_for_user(user_id).await? {
            if booking.at < now {
                self.expire(booking.booking_id).await?;
            } else {
                live.push(booking);
            }
        }
        Ok(live)
    }

    pub async fn bookings_for_specialist(
        &self,
        specialist_id: i64,
    ) -> DomainResult<Vec<BookingDetails>> {
        self.bookings.list_bookings_for_specialist(specialist_id).await
    }

    pub async fn history_for_user(&self, user_id: i64) -> DomainResult<Vec<BookingHistory>> {
        self.bookings.list_history_for_user(user_id).await
    }
}
