use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A recurring weekly window in which a user accepts interviews.
/// `weekday` counts from Monday = 0.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weekday: i16,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "12:30:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl NewSlot {
    pub fn overlaps(&self, other: &NewSlot) -> bool {
        self.weekday == other.weekday
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}
