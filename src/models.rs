use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Number of days in one challenge run.
pub const TOTAL_DAYS: u32 = 21;
pub const DAYS_PER_WEEK: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckinRecord {
    pub date: String,
    pub timestamp: i64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_retroactive: Option<bool>,
}

impl CheckinRecord {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// All records keyed by day number, as persisted on disk.
///
/// Records stay untyped: bulk updates may carry fields the server never
/// writes, or omit ones it does, and both must round-trip unchanged. Only
/// records created by the server are built from [`CheckinRecord`].
pub type CheckinStore = BTreeMap<String, Value>;

pub fn is_retroactive(record: &Value) -> bool {
    record.get("is_retroactive").and_then(Value::as_bool) == Some(true)
}

#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    #[serde(deserialize_with = "day_key")]
    pub date: String,
    pub timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckinUpdate {
    pub data: CheckinStore,
}

#[derive(Debug, Deserialize)]
pub struct RetroactiveCheckinRequest {
    #[serde(deserialize_with = "day_key")]
    pub date: String,
    pub password: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CheckinStore>,
    pub message: String,
}

impl ApiResponse {
    pub fn with_data(data: CheckinStore, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekProgress {
    pub week1: f64,
    pub week2: f64,
    pub week3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinStats {
    pub total_days: u32,
    pub checked_days: u32,
    pub remaining_days: u32,
    pub progress_percentage: f64,
    pub week_progress: WeekProgress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: CheckinStats,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

// The browser client sends day numbers as JSON integers.
fn day_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Number(i64),
    }

    Ok(match Key::deserialize(deserializer)? {
        Key::Text(text) => text,
        Key::Number(number) => number.to_string(),
    })
}
