use std::sync::Arc;

use uuid::Uuid;

use crate::database::repository::AvailabilityRepository;
use crate::dto::availability_dto::{ReplaceAvailabilityPayload, SlotPayload};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::availability::{AvailabilitySlot, NewSlot};
use crate::utils::time::parse_clock;

pub const MAX_SLOTS: usize = 50;

#[derive(Clone)]
pub struct AvailabilityService {
    repo: Arc<dyn AvailabilityRepository>,
}

impl AvailabilityService {
    pub fn new(repo: Arc<dyn AvailabilityRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<AvailabilitySlot>> {
        self.repo.list(user_id).await
    }

    /// Replaces the caller's whole weekly schedule.
    pub async fn replace(
        &self,
        claims: &Claims,
        payload: ReplaceAvailabilityPayload,
    ) -> Result<Vec<AvailabilitySlot>> {
        let slots = parse_slots(payload.slots)?;
        self.repo.replace(claims.user_id(), slots).await
    }
}

/// Each slot must be a forward window and no two may overlap on a weekday.
pub fn parse_slots(raw: Vec<SlotPayload>) -> Result<Vec<NewSlot>> {
    if raw.len() > MAX_SLOTS {
        return Err(Error::BadRequest(format!(
            "At most {MAX_SLOTS} availability slots are allowed"
        )));
    }

    let mut slots: Vec<NewSlot> = Vec::with_capacity(raw.len());
    for slot in raw {
        let parsed = NewSlot {
            weekday: slot.weekday,
            start_time: parse_clock(&slot.start_time)?,
            end_time: parse_clock(&slot.end_time)?,
        };
        if parsed.start_time >= parsed.end_time {
            return Err(Error::BadRequest(format!(
                "Slot {}-{} ends before it starts",
                slot.start_time, slot.end_time
            )));
        }
        if slots.iter().any(|other| other.overlaps(&parsed)) {
            return Err(Error::BadRequest(format!(
                "Slot {}-{} on weekday {} overlaps another slot",
                slot.start_time, slot.end_time, slot.weekday
            )));
        }
        slots.push(parsed);
    }
    Ok(slots)
}
