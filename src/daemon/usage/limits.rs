use std::collections::{BTreeMap, HashMap};

use crate::daemon::validation::{InputError, parse_positive_minutes};

/// Warnings repeat once per this many minutes of usage over the limit.
pub const WARNING_BAND_MINUTES: u64 = 5;

/// How far past a band mark usage may be for the mark to still count as reached. Credited ticks
/// are always shorter than this, so no mark is stepped over.
const MARK_WINDOW_MINUTES: f64 = 0.1;

/// Per application limits in minutes. Absent entry means unlimited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitTable {
    limits: BTreeMap<String, u32>,
}

impl LimitTable {
    pub fn new(limits: BTreeMap<String, u32>) -> Self {
        Self { limits }
    }

    pub fn get(&self, app: &str) -> Option<u32> {
        self.limits.get(app).copied()
    }

    /// Validates user input and only then stores the limit. Returns the stored minutes.
    pub fn set_from_input(&mut self, app: &str, minutes: &str) -> Result<u32, InputError> {
        let app = app.trim();
        if app.is_empty() || minutes.trim().is_empty() {
            return Err(InputError::Missing);
        }
        let minutes = parse_positive_minutes("time limit", minutes)?;
        self.limits.insert(app.to_string(), minutes);
        Ok(minutes)
    }

    pub fn remove(&mut self, app: &str) -> Option<u32> {
        self.limits.remove(app.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.limits.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn clear(&mut self) {
        self.limits.clear();
    }

    pub fn as_map(&self) -> &BTreeMap<String, u32> {
        &self.limits
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitWarning {
    pub app: String,
    pub limit_minutes: u32,
    pub used_minutes: f64,
}

/// Decides when an application over its limit deserves a warning. A warning is raised right after
/// usage passes the limit and again each time it passes a new multiple of [WARNING_BAND_MINUTES],
/// at most once per mark.
#[derive(Debug, Default)]
pub struct LimitChecker {
    last_notified_mark: HashMap<String, u64>,
}

impl LimitChecker {
    pub fn check(
        &mut self,
        limits: &LimitTable,
        app: &str,
        used_seconds: f64,
    ) -> Option<LimitWarning> {
        let limit = limits.get(app)?;
        let used_minutes = used_seconds / 60.;
        if used_minutes <= limit as f64 {
            return None;
        }

        let mark = (used_minutes / WARNING_BAND_MINUTES as f64).floor() as u64 * WARNING_BAND_MINUTES;
        if used_minutes - mark as f64 >= MARK_WINDOW_MINUTES {
            return None;
        }
        if self.last_notified_mark.get(app).is_some_and(|last| *last >= mark) {
            return None;
        }

        self.last_notified_mark.insert(app.to_string(), mark);
        Some(LimitWarning {
            app: app.to_string(),
            limit_minutes: limit,
            used_minutes,
        })
    }

    /// Forgets past warnings for `app`, used when its limit changes.
    pub fn reset(&mut self, app: &str) {
        self.last_notified_mark.remove(app.trim());
    }

    pub fn reset_all(&mut self) {
        self.last_notified_mark.clear();
    }
}
