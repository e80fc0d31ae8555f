use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_BREAK_INTERVAL_MINUTES: u32 = 60;

fn default_break_interval() -> u32 {
    DEFAULT_BREAK_INTERVAL_MINUTES
}

/// The struct used for storing data on the disk. The same shape, without `last_saved`, is used
/// for exports.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct TrackerDataEntity {
    /// Seconds in the foreground per process name.
    #[serde(default)]
    pub app_usage: BTreeMap<String, f64>,
    /// Seconds in front of the screen per `YYYY-MM-DD` day.
    #[serde(default)]
    pub daily_usage: BTreeMap<String, f64>,
    /// Minutes allowed per process name.
    #[serde(default)]
    pub app_limits: BTreeMap<String, u32>,
    #[serde(default = "default_break_interval")]
    pub break_interval: u32,
    /// ISO-8601. Kept as text, older files carry timestamps without an offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<String>,
}

impl Default for TrackerDataEntity {
    fn default() -> Self {
        Self {
            app_usage: BTreeMap::new(),
            daily_usage: BTreeMap::new(),
            app_limits: BTreeMap::new(),
            break_interval: DEFAULT_BREAK_INTERVAL_MINUTES,
            last_saved: None,
        }
    }
}

impl TrackerDataEntity {
    /// Drops values that can't have been produced by the tracker, e.g. a hand edited file with
    /// a zero interval.
    pub fn sanitized(mut self) -> Self {
        if self.break_interval == 0 {
            self.break_interval = DEFAULT_BREAK_INTERVAL_MINUTES;
        }
        self.app_limits.retain(|_, minutes| *minutes > 0);
        self.app_usage.retain(|_, seconds| seconds.is_finite() && *seconds >= 0.);
        self.daily_usage.retain(|_, seconds| seconds.is_finite() && *seconds >= 0.);
        self
    }

    pub fn with_timestamp(self, moment: DateTime<FixedOffset>) -> Self {
        Self {
            last_saved: Some(moment.to_rfc3339()),
            ..self
        }
    }

    /// Moment of the last save as a local wall-clock time.
    pub fn last_saved_at(&self) -> Option<NaiveDateTime> {
        let value = self.last_saved.as_deref()?;
        DateTime::parse_from_rfc3339(value)
            .map(|v| v.naive_local())
            .or_else(|_| value.parse::<NaiveDateTime>())
            .ok()
    }

    pub fn without_timestamp(self) -> Self {
        Self {
            last_saved: None,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{DEFAULT_BREAK_INTERVAL_MINUTES, TrackerDataEntity};

    #[test]
    fn missing_fields_take_defaults() {
        let entity: TrackerDataEntity =
            serde_json::from_str(r#"{ "app_usage": { "code": 12.5 } }"#).unwrap();
        assert_eq!(entity.app_usage, BTreeMap::from([("code".to_string(), 12.5)]));
        assert!(entity.daily_usage.is_empty());
        assert!(entity.app_limits.is_empty());
        assert_eq!(entity.break_interval, DEFAULT_BREAK_INTERVAL_MINUTES);
        assert_eq!(entity.last_saved, None);
    }

    #[test]
    fn accepts_integer_seconds() {
        let entity: TrackerDataEntity =
            serde_json::from_str(r#"{ "daily_usage": { "2025-03-16": 3600 } }"#).unwrap();
        assert_eq!(entity.daily_usage["2025-03-16"], 3600.);
    }

    #[test]
    fn export_shape_has_no_timestamp() {
        let value = serde_json::to_value(TrackerDataEntity::default()).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("last_saved"));
        assert_eq!(object["break_interval"], 60);
    }

    #[test]
    fn reads_timestamps_with_and_without_offset() {
        let with_offset = TrackerDataEntity {
            last_saved: Some("2025-03-16T14:25:01+02:00".into()),
            ..Default::default()
        };
        let naive = TrackerDataEntity {
            last_saved: Some("2025-03-16T14:25:01.250000".into()),
            ..Default::default()
        };
        let garbage = TrackerDataEntity {
            last_saved: Some("yesterday".into()),
            ..Default::default()
        };
        assert_eq!(
            with_offset.last_saved_at().unwrap().to_string(),
            "2025-03-16 14:25:01"
        );
        assert_eq!(
            naive.last_saved_at().unwrap().to_string(),
            "2025-03-16 14:25:01.250"
        );
        assert_eq!(garbage.last_saved_at(), None);
    }

    #[test]
    fn sanitizing_restores_interval_and_drops_broken_limits() {
        let entity = TrackerDataEntity {
            break_interval: 0,
            app_limits: BTreeMap::from([("a".into(), 0), ("b".into(), 10)]),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(entity.break_interval, DEFAULT_BREAK_INTERVAL_MINUTES);
        assert_eq!(entity.app_limits, BTreeMap::from([("b".into(), 10)]));
    }
}
