//! Read-query contract: time filters, origin filters, ordering, pages.
//!
//! Options are validated locally before submission. Page tokens are opaque
//! and passed to the store exactly as they were received; the page size
//! ceiling belongs to the store and is not checked here.

use crate::error::ValidationError;
use crate::metadata::StoredRecord;
use crate::record::RecordType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time window of a read
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum TimeRangeFilter {
    Before {
        time: DateTime<Utc>,
    },
    After {
        time: DateTime<Utc>,
    },
    Between {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
}

impl TimeRangeFilter {
    pub fn before(time: DateTime<Utc>) -> Self {
        TimeRangeFilter::Before { time }
    }

    pub fn after(time: DateTime<Utc>) -> Self {
        TimeRangeFilter::After { time }
    }

    /// A `between` window; `start_time == end_time` is a valid zero-width window
    pub fn between(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let filter = TimeRangeFilter::Between {
            start_time,
            end_time,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            TimeRangeFilter::Between {
                start_time,
                end_time,
            } if start_time > end_time => Err(ValidationError::InvalidRange(format!(
                "filter start {} is after filter end {}",
                start_time, end_time
            ))),
            _ => Ok(()),
        }
    }

    /// Lower and upper bounds of the window, unbounded sides as `None`
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self {
            TimeRangeFilter::Before { time } => (None, Some(*time)),
            TimeRangeFilter::After { time } => (Some(*time), None),
            TimeRangeFilter::Between {
                start_time,
                end_time,
            } => (Some(*start_time), Some(*end_time)),
        }
    }

    /// Whether a record spanning `[start, end]` falls in the window.
    ///
    /// Instants (`start == end`) match when `lower <= time < upper`; spans
    /// match when they overlap the window. A zero-width `between` window
    /// matches only instants at exactly that time or spans covering it.
    pub fn matches(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let (lower, upper) = self.bounds();
        if start == end {
            let after_lower = lower.map_or(true, |l| start >= l);
            let before_upper = match (lower, upper) {
                (Some(l), Some(u)) if l == u => start <= u,
                (_, Some(u)) => start < u,
                (_, None) => true,
            };
            return after_lower && before_upper;
        }
        let after_lower = lower.map_or(true, |l| end > l);
        let before_upper = upper.map_or(true, |u| start < u || (lower == Some(u) && start <= u));
        after_lower && before_upper
    }
}

/// Everything a single read sends to the store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRecordsOptions {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub time_range_filter: TimeRangeFilter,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_origin_filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascending_order: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl GetRecordsOptions {
    pub fn new(record_type: RecordType, time_range_filter: TimeRangeFilter) -> Self {
        Self {
            record_type,
            time_range_filter,
            data_origin_filter: Vec::new(),
            ascending_order: None,
            page_size: None,
            page_token: None,
        }
    }

    pub fn with_data_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_origin_filter = origins.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ascending_order(mut self, ascending: bool) -> Self {
        self.ascending_order = Some(ascending);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = Some(page_token.into());
        self
    }

    /// Oldest-first unless the caller asked otherwise
    pub fn is_ascending(&self) -> bool {
        self.ascending_order.unwrap_or(true)
    }

    /// The same query continued at `page_token`.
    ///
    /// Filter, ordering, and page size are kept so the store's cursor stays
    /// consistent with the query that produced it.
    pub fn next_page(&self, page_token: &str) -> Self {
        Self {
            page_token: Some(page_token.to_string()),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.time_range_filter.validate()?;

        if self.page_size == Some(0) {
            return Err(ValidationError::InvalidValue(
                "pageSize must be a positive integer".into(),
            ));
        }
        if let Some(token) = &self.page_token {
            if token.is_empty() {
                return Err(ValidationError::InvalidValue(
                    "pageToken must not be empty when present".into(),
                ));
            }
        }
        if self.data_origin_filter.iter().any(|o| o.trim().is_empty()) {
            return Err(ValidationError::InvalidValue(
                "dataOriginFilter entries must not be blank".into(),
            ));
        }
        Ok(())
    }
}

/// One page of a read; a `page_token` means more pages follow
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRecordsResponse {
    pub records: Vec<StoredRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl ReadRecordsResponse {
    pub fn has_more(&self) -> bool {
        self.page_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_between_ordering() {
        assert!(matches!(
            TimeRangeFilter::between(t0() + Duration::seconds(1), t0()),
            Err(ValidationError::InvalidRange(_))
        ));
        assert!(TimeRangeFilter::between(t0(), t0()).is_ok());
    }

    #[test]
    fn test_deserialized_filter_is_validated() {
        let filter: TimeRangeFilter = serde_json::from_value(json!({
            "type": "between",
            "startTime": "2024-03-02T00:00:00Z",
            "endTime": "2024-03-01T00:00:00Z"
        }))
        .unwrap();
        let options = GetRecordsOptions::new(RecordType::Steps, filter);
        assert!(matches!(
            options.validate(),
            Err(ValidationError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_filter_wire_shape() {
        assert_eq!(
            serde_json::to_value(TimeRangeFilter::after(t0())).unwrap(),
            json!({ "type": "after", "time": "2024-03-01T00:00:00Z" })
        );
        assert_eq!(
            serde_json::to_value(TimeRangeFilter::between(t0(), t0()).unwrap()).unwrap(),
            json!({
                "type": "between",
                "startTime": "2024-03-01T00:00:00Z",
                "endTime": "2024-03-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn test_matches_instants() {
        let after = TimeRangeFilter::after(t0());
        assert!(after.matches(t0(), t0()));
        assert!(!after.matches(t0() - Duration::seconds(1), t0() - Duration::seconds(1)));

        let before = TimeRangeFilter::before(t0());
        assert!(!before.matches(t0(), t0()));
        assert!(before.matches(t0() - Duration::seconds(1), t0() - Duration::seconds(1)));

        let point = TimeRangeFilter::between(t0(), t0()).unwrap();
        assert!(point.matches(t0(), t0()));
    }

    #[test]
    fn test_matches_spans() {
        let window = TimeRangeFilter::between(t0(), t0() + Duration::hours(1)).unwrap();
        // Overlapping the start
        assert!(window.matches(t0() - Duration::minutes(30), t0() + Duration::minutes(10)));
        // Ending exactly at the window start does not overlap
        assert!(!window.matches(t0() - Duration::minutes(30), t0()));
        // Starting exactly at the window end does not overlap
        assert!(!window.matches(t0() + Duration::hours(1), t0() + Duration::hours(2)));
    }

    #[test]
    fn test_defaults_and_validation() {
        let options = GetRecordsOptions::new(RecordType::Weight, TimeRangeFilter::after(t0()));
        assert!(options.is_ascending());
        assert!(options.validate().is_ok());
        assert!(!options.clone().with_ascending_order(false).is_ascending());

        assert!(matches!(
            options.clone().with_page_size(0).validate(),
            Err(ValidationError::InvalidValue(_))
        ));
        assert!(options.clone().with_page_size(5_000).validate().is_ok());
        assert!(options.clone().with_data_origins([""]).validate().is_err());
    }

    #[test]
    fn test_next_page_keeps_token_verbatim() {
        let options = GetRecordsOptions::new(RecordType::Steps, TimeRangeFilter::after(t0()))
            .with_page_size(2)
            .with_ascending_order(false);
        let next = options.next_page("abc");
        assert_eq!(next.page_token.as_deref(), Some("abc"));
        assert_eq!(next.page_size, Some(2));
        assert_eq!(next.ascending_order, Some(false));
        assert_eq!(next.time_range_filter, options.time_range_filter);
    }

    #[test]
    fn test_options_wire_shape() {
        let options = GetRecordsOptions::new(RecordType::Steps, TimeRangeFilter::after(t0()))
            .with_data_origins(["com.example.vitals"])
            .with_page_token("tok==");
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["type"], "Steps");
        assert_eq!(json["timeRangeFilter"]["type"], "after");
        assert_eq!(json["dataOriginFilter"][0], "com.example.vitals");
        assert_eq!(json["pageToken"], "tok==");
        assert!(json.get("ascendingOrder").is_none());
    }
}
