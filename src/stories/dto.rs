use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::stories::repo::Story;

/// Body for the add and edit story endpoints. `visitedDate` arrives as epoch
/// milliseconds, either a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub visited_location: String,
    #[serde(default)]
    pub image_url: String,
    pub visited_date: Option<Value>,
}

impl StoryPayload {
    /// Required-field check shared by add and edit. Edit passes
    /// `require_image = false` and substitutes the placeholder instead.
    pub fn validate(&self, require_image: bool) -> Result<(), ApiError> {
        let missing = self.title.trim().is_empty()
            || self.story.trim().is_empty()
            || self.visited_location.trim().is_empty()
            || (require_image && self.image_url.trim().is_empty())
            || self.visited_date.is_none();
        if missing {
            return Err(ApiError::Validation("All fields are required.".into()));
        }
        Ok(())
    }

    pub fn parsed_visited_date(&self) -> Result<OffsetDateTime, ApiError> {
        let raw = self
            .visited_date
            .as_ref()
            .ok_or_else(|| ApiError::Validation("All fields are required.".into()))?;
        let ms = epoch_ms(raw).ok_or_else(|| {
            ApiError::Validation("visitedDate must be epoch milliseconds.".into())
        })?;
        datetime_from_ms(ms)
            .ok_or_else(|| ApiError::Validation("visitedDate is out of range.".into()))
    }
}

/// Accepts an epoch-milliseconds value as a JSON number or a digit string.
pub fn epoch_ms(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn datetime_from_ms(ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).ok()
}

/// Epoch-ms query parameter (`startDate`/`endDate`).
pub fn datetime_from_ms_str(s: &str) -> Option<OffsetDateTime> {
    s.trim().parse::<i64>().ok().and_then(datetime_from_ms)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePayload {
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoryResponse {
    pub story: Story,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StoriesResponse {
    pub stories: Vec<Story>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn epoch_ms_accepts_numbers_and_digit_strings() {
        assert_eq!(epoch_ms(&json!(1700000000000i64)), Some(1700000000000));
        assert_eq!(epoch_ms(&json!("1700000000000")), Some(1700000000000));
        assert_eq!(epoch_ms(&json!(" 42 ")), Some(42));
        assert_eq!(epoch_ms(&json!("not-a-date")), None);
        assert_eq!(epoch_ms(&json!(12.75)), None);
        assert_eq!(epoch_ms(&json!(true)), None);
        assert_eq!(epoch_ms(&json!(null)), None);
    }

    #[test]
    fn datetime_from_ms_converts() {
        let dt = datetime_from_ms(1700000000000).unwrap();
        assert_eq!(dt.unix_timestamp(), 1700000000);
        assert!(datetime_from_ms_str("1700000000000").is_some());
        assert!(datetime_from_ms_str("garbage").is_none());
    }

    #[test]
    fn validate_requires_all_fields_for_add() {
        let payload: StoryPayload = serde_json::from_value(json!({
            "title": "Trip",
            "story": "text",
            "visitedLocation": "Paris",
            "imageUrl": "",
            "visitedDate": 1700000000000i64
        }))
        .unwrap();
        assert!(payload.validate(true).is_err());
        assert!(payload.validate(false).is_ok());
    }

    #[test]
    fn validate_rejects_missing_date() {
        let payload: StoryPayload = serde_json::from_value(json!({
            "title": "Trip",
            "story": "text",
            "visitedLocation": "Paris",
            "imageUrl": "u1"
        }))
        .unwrap();
        assert!(payload.validate(true).is_err());
    }

    #[test]
    fn parsed_visited_date_rejects_non_integers() {
        let payload: StoryPayload = serde_json::from_value(json!({
            "title": "Trip",
            "story": "text",
            "visitedLocation": "Paris",
            "imageUrl": "u1",
            "visitedDate": "next tuesday"
        }))
        .unwrap();
        assert!(payload.parsed_visited_date().is_err());
    }
}
