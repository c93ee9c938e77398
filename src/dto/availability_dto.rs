use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SlotPayload {
    /// 0 = Monday .. 6 = Sunday.
    #[validate(range(min = 0, max = 6))]
    pub weekday: i16,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "12:30")]
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReplaceAvailabilityPayload {
    #[validate(nested)]
    pub slots: Vec<SlotPayload>,
}
