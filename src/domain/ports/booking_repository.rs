use crate::domain::entities::{
    BookingDetails, BookingHistory, ClosureOutcome, ReminderKind, SlotTime,
};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Marks the slot booked and inserts the booking in one transaction,
    /// returning the joined details read inside that transaction.
    ///
    /// Fails with `NotFound` when the slot does not exist and `Conflict` when it is
    /// already booked. Nothing is written on failure.
    async fn reserve(
        &self,
        user_id: i64,
        slot_id: i64,
        created_at: &str,
    ) -> DomainResult<BookingDetails>;

    /// Archives and deletes the booking and frees its slot, atomically.
    ///
    /// With `owner` set, a booking held by someone else fails with `Ownership`.
    /// Returns `None` when the booking no longer exists and `owner` is unset.
    async fn close(
        &self,
        booking_id: i64,
        owner: Option<i64>,
        outcome: ClosureOutcome,
        closed_at: &str,
    ) -> DomainResult<Option<BookingHistory>>;

    async fn get_booking_details(&self, booking_id: i64) -> DomainResult<Option<BookingDetails>>;
    /// Live bookings whose slot starts strictly before `at`.
    async fn list_bookings_before(&self, at: SlotTime) -> DomainResult<Vec<BookingDetails>>;
    async fn list_live_bookings(&self) -> DomainResult<Vec<BookingDetails>>;
    async fn list_bookings_for_user(&self, user_id: i64) -> DomainResult<Vec<BookingDetails>>;
    async fn list_bookings_for_specialist(
        &self,
        specialist_id: i64,
    ) -> DomainResult<Vec<BookingDetails>>;
    async fn list_history_for_user(&self, user_id: i64) -> DomainResult<Vec<BookingHistory>>;

    /// Records that a reminder went out. Returns false if it was already claimed.
    async fn claim_reminder(
        &self,
        booking_id: i64,
        kind: ReminderKind,
        sent_at: &str,
    ) -> DomainResult<bool>;
    async fn release_reminder(&self, booking_id: i64, kind: ReminderKind) -> DomainResult<()>;
}
