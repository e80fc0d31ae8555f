use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::Mutex;

use super::{
    collection::probe::UNKNOWN_APPLICATION,
    storage::entities::TrackerDataEntity,
    usage::{
        accumulator::{Sample, TickOutcome, UsageAccumulator},
        limits::{LimitChecker, LimitTable, LimitWarning},
    },
    validation::{InputError, parse_positive_minutes},
};
use crate::utils::time::day_key_of;

pub type SharedState = Arc<Mutex<TrackerState>>;

/// Everything the tracker knows. Written by the collector, read by the presentation through
/// [TrackerState::snapshot].
#[derive(Debug)]
pub struct TrackerState {
    usage: UsageAccumulator,
    limits: LimitTable,
    checker: LimitChecker,
    break_interval: u32,
    reminders_enabled: bool,
}

/// Result of recording one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub outcome: TickOutcome,
    pub warning: Option<LimitWarning>,
}

/// Copy of the state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSnapshot {
    pub current_app: String,
    pub today_seconds: f64,
    /// Applications ordered from the most used.
    pub ranking: Vec<(String, f64)>,
    /// `(app, limit minutes, used seconds)`
    pub limits: Vec<(String, u32, f64)>,
    pub break_interval: u32,
    pub reminders_enabled: bool,
}

impl TrackerState {
    pub fn from_entity(data: TrackerDataEntity, started_at: DateTime<Local>) -> Self {
        Self {
            usage: UsageAccumulator::new(started_at, data.app_usage, data.daily_usage),
            limits: LimitTable::new(data.app_limits),
            checker: LimitChecker::default(),
            break_interval: data.break_interval,
            reminders_enabled: false,
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn to_entity(&self) -> TrackerDataEntity {
        TrackerDataEntity {
            app_usage: self.usage.app_usage().clone(),
            daily_usage: self.usage.daily_usage().clone(),
            app_limits: self.limits.as_map().clone(),
            break_interval: self.break_interval,
            last_saved: None,
        }
    }

    /// Credits the sample and checks the limit of its application.
    pub fn record(&mut self, sample: Sample) -> Recorded {
        let app = sample.app.clone();
        let outcome = self.usage.tick(sample);
        let warning = match outcome {
            TickOutcome::Applied(_) => {
                self.checker
                    .check(&self.limits, &app, self.usage.usage_of(&app))
            }
            TickOutcome::Skipped(_) => None,
        };
        Recorded { outcome, warning }
    }

    pub fn set_limit(&mut self, app: &str, minutes: &str) -> Result<u32, InputError> {
        let minutes = self.limits.set_from_input(app, minutes)?;
        self.checker.reset(app);
        Ok(minutes)
    }

    pub fn remove_limit(&mut self, app: &str) -> Option<u32> {
        self.checker.reset(app);
        self.limits.remove(app)
    }

    pub fn set_break_interval(&mut self, minutes: &str) -> Result<u32, InputError> {
        let minutes = parse_positive_minutes("reminder interval", minutes)?;
        self.break_interval = minutes;
        Ok(minutes)
    }

    pub fn break_interval(&self) -> u32 {
        self.break_interval
    }

    pub fn set_reminders_enabled(&mut self, enabled: bool) {
        self.reminders_enabled = enabled;
    }

    pub fn limits(&self) -> &LimitTable {
        &self.limits
    }

    pub fn usage(&self) -> &UsageAccumulator {
        &self.usage
    }

    /// Forgets every tracked second and every limit. The break interval stays.
    pub fn clear(&mut self) {
        self.usage.clear();
        self.limits.clear();
        self.checker.reset_all();
    }

    pub fn snapshot(&self, now: DateTime<Local>) -> UsageSnapshot {
        let mut ranking = self
            .usage
            .app_usage()
            .iter()
            .map(|(app, seconds)| (app.clone(), *seconds))
            .collect::<Vec<_>>();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let current_app = match self.usage.current_app() {
            UNKNOWN_APPLICATION => String::new(),
            app => app.to_string(),
        };

        UsageSnapshot {
            current_app,
            today_seconds: self.usage.usage_on(&day_key_of(&now)),
            ranking,
            limits: self
                .limits
                .iter()
                .map(|(app, minutes)| (app.clone(), *minutes, self.usage.usage_of(app)))
                .collect(),
            break_interval: self.break_interval,
            reminders_enabled: self.reminders_enabled,
        }
    }
}

impl UsageSnapshot {
    /// Snapshot of data read back from disk, e.g. for `status`.
    pub fn from_entity(data: TrackerDataEntity, now: DateTime<Local>) -> Self {
        TrackerState::from_entity(data, now).snapshot(now)
    }
}
