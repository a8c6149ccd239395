use serde::Serialize;
use serde_json::Value;

/// Fields every submission must carry, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "attendeeId", "attendeeName", "timestamp"];

/// Returns the first required field absent from the submission, if any.
/// Presence is all that is checked; types and timestamp format are the
/// caller's responsibility.
pub fn missing_field(event: &Value) -> Option<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .find(|field| event.get(field).is_none())
}

/// Projects the spreadsheet row for an event: `[timestamp, attendeeId,
/// attendeeName]`. The `id` is deliberately left out of the durable log.
pub fn sheet_row(event: &Value) -> Vec<Value> {
    vec![
        event["timestamp"].clone(),
        event["attendeeId"].clone(),
        event["attendeeName"].clone(),
    ]
}

#[derive(Serialize)]
pub struct StatusBody {
    pub success: bool,
}

impl StatusBody {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
