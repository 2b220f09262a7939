use crate::domain::entities::{Slot, SlotTime};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn create_slot(&self, specialist_id: i64, at: SlotTime) -> DomainResult<Slot>;
    async fn get_slot(&self, id: i64) -> DomainResult<Option<Slot>>;
    /// Returns false without touching the row when the slot is booked or missing.
    async fn update_free_slot(&self, id: i64, at: SlotTime) -> DomainResult<bool>;
    /// Returns false without touching the row when the slot is booked or missing.
    async fn delete_free_slot(&self, id: i64) -> DomainResult<bool>;
    /// Slots at or after `from`, ordered by (date, time).
    async fn list_slots_from(&self, specialist_id: i64, from: SlotTime) -> DomainResult<Vec<Slot>>;
    async fn list_slots(&self, specialist_id: i64) -> DomainResult<Vec<Slot>>;

    /// Deletes free slots strictly before `cutoff`; booked ones are left alone.
    async fn prune_free_slots_before(&self, cutoff: SlotTime) -> DomainResult<u64>;
    /// Idempotent insert keyed on (specialist, date, time). Returns whether a row was added.
    async fn insert_slot_if_absent(&self, specialist_id: i64, at: SlotTime) -> DomainResult<bool>;
}
