use crate::domain::entities::{Slot, SlotTime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Clock, SlotRepository};
use std::sync::Arc;

/// CRUD over slots. Booked slots are never edited or deleted here.
#[derive(Clone)]
pub struct SlotStore {
    slots: Arc<dyn SlotRepository>,
    clock: Arc<dyn Clock>,
}

impl SlotStore {
    pub fn new(slots: Arc<dyn SlotRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { slots, clock }
    }

    fn now(&self) -> SlotTime {
        SlotTime::from_local(self.clock.local_now())
    }

    fn ensure_future(&self, at: SlotTime) -> DomainResult<()> {
        if at < self.now() {
            return Err(DomainError::Validation(
                "The slot must be in the future".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, specialist_id: i64, at: SlotTime) -> DomainResult<Slot> {
        self.ensure_future(at)?;
        let slot = self.slots.create_slot(specialist_id, at).await?;
        tracing::info!(slot_id = slot.id, specialist_id, at = %at, "Slot created");
        Ok(slot)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Slot> {
        self.slots
            .get_slot(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("slot #{}", id)))
    }

    /// Returns false, changing nothing, if the slot is booked or gone.
    pub async fn update(&self, id: i64, at: SlotTime) -> DomainResult<bool> {
        self.ensure_future(at)?;
        let updated = self.slots.update_free_slot(id, at).await?;
        if updated {
            tracing::info!(slot_id = id, at = %at, "Slot rescheduled");
        } else {
            tracing::debug!(slot_id = id, "Slot not rescheduled, booked or missing");
        }
        Ok(updated)
    }

    /// Returns false, changing nothing, if the slot is booked or gone.
    pub async fn delete(&self, id: i64) -> DomainResult<bool> {
        let deleted = self.slots.delete_free_slot(id).await?;
        if deleted {
            tracing::info!(slot_id = id, "Slot deleted");
        }
        Ok(deleted)
    }

    /// Slots at or after now, ordered by (date, time).
    pub async fn list_future(&self, specialist_id: i64) -> DomainResult<Vec<Slot>> {
        self.slots.list_slots_from(specialist_id, self.now()).await
    }

    pub async fn list_free_future(&self, specialist_id: i64) -> DomainResult<Vec<Slot>> {
        Ok(self
            .list_future(specialist_id)
            .await?
            .into_iter()
            .filter(|slot| !slot.is_booked)
            .collect())
    }

    pub async fn list_all(&self, specialist_id: i64) -> DomainResult<Vec<Slot>> {
        self.slots.list_slots(specialist_id).await
    }
}
