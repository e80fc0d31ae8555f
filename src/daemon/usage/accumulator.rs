use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Local};

use crate::utils::time::day_key_of;

/// Samples further apart than this are not credited to anyone. Protects against sleep and
/// suspend gaps.
pub const MAX_SAMPLE_GAP: Duration = Duration::seconds(5);

/// Instantaneous reading of the foreground application.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub app: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Seconds credited to the sampled application and the current day.
    Applied(f64),
    /// The delta was outside of `[0, MAX_SAMPLE_GAP)`.
    Skipped(Duration),
}

/// Sums time between consecutive samples into per application and per day counters.
#[derive(Debug, Clone)]
pub struct UsageAccumulator {
    previous_timestamp: DateTime<Local>,
    current_app: String,
    app_usage: BTreeMap<String, f64>,
    daily_usage: BTreeMap<String, f64>,
}

impl UsageAccumulator {
    pub fn new(
        started_at: DateTime<Local>,
        app_usage: BTreeMap<String, f64>,
        daily_usage: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            previous_timestamp: started_at,
            current_app: String::new(),
            app_usage,
            daily_usage,
        }
    }

    pub fn tick(&mut self, Sample { app, timestamp }: Sample) -> TickOutcome {
        let delta = timestamp - self.previous_timestamp;
        self.previous_timestamp = timestamp;

        let outcome = if delta >= Duration::zero() && delta < MAX_SAMPLE_GAP {
            let seconds = delta.num_microseconds().unwrap_or_default() as f64 / 1_000_000.;
            *self.app_usage.entry(app.clone()).or_default() += seconds;
            *self.daily_usage.entry(day_key_of(&timestamp)).or_default() += seconds;
            TickOutcome::Applied(seconds)
        } else {
            TickOutcome::Skipped(delta)
        };

        self.current_app = app;
        outcome
    }

    /// Lifetime seconds of `app`, 0 for never seen applications.
    pub fn usage_of(&self, app: &str) -> f64 {
        self.app_usage.get(app).copied().unwrap_or_default()
    }

    pub fn usage_on(&self, day_key: &str) -> f64 {
        self.daily_usage.get(day_key).copied().unwrap_or_default()
    }

    pub fn current_app(&self) -> &str {
        &self.current_app
    }

    pub fn app_usage(&self) -> &BTreeMap<String, f64> {
        &self.app_usage
    }

    pub fn daily_usage(&self) -> &BTreeMap<String, f64> {
        &self.daily_usage
    }

    pub fn clear(&mut self) {
        self.app_usage.clear();
        self.daily_usage.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

    use super::{Sample, TickOutcome, UsageAccumulator};

    fn at(day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2018, 7, day)
                    .unwrap()
                    .and_hms_opt(hour, min, sec)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    fn sample(app: &str, timestamp: DateTime<Local>) -> Sample {
        Sample {
            app: app.into(),
            timestamp,
        }
    }

    fn empty(started_at: DateTime<Local>) -> UsageAccumulator {
        UsageAccumulator::new(started_at, BTreeMap::new(), BTreeMap::new())
    }

    #[test]
    fn sums_applied_deltas_per_app() {
        let start = at(4, 12, 0, 0);
        let mut accumulator = empty(start);
        let offsets_ms = [1000, 2000, 3500, 4000, 5200, 6000];
        let mut previous = 0;
        let mut last_usage = 0.;
        for offset in offsets_ms {
            let outcome = accumulator.tick(sample("code", start + Duration::milliseconds(offset)));
            assert_eq!(
                outcome,
                TickOutcome::Applied((offset - previous) as f64 / 1000.)
            );
            previous = offset;
            assert!(accumulator.usage_of("code") >= last_usage);
            last_usage = accumulator.usage_of("code");
        }

        assert!((accumulator.usage_of("code") - 6.).abs() < 1e-9);
        assert!((accumulator.usage_on("2018-07-04") - 6.).abs() < 1e-9);
        assert_eq!(accumulator.current_app(), "code");
    }

    #[test]
    fn gaps_of_five_seconds_or_more_are_not_credited() {
        let start = at(4, 12, 0, 0);
        let mut accumulator = empty(start);
        accumulator.tick(sample("code", start + Duration::seconds(1)));

        let outcome = accumulator.tick(sample("code", start + Duration::seconds(6)));
        assert_eq!(outcome, TickOutcome::Skipped(Duration::seconds(5)));
        assert_eq!(accumulator.usage_of("code"), 1.);
        assert_eq!(accumulator.usage_on("2018-07-04"), 1.);

        // The next sample is measured from the skipped one.
        accumulator.tick(sample("code", start + Duration::seconds(7)));
        assert_eq!(accumulator.usage_of("code"), 2.);
    }

    #[test]
    fn backwards_clock_is_not_credited() {
        let start = at(4, 12, 0, 10);
        let mut accumulator = empty(start);
        let outcome = accumulator.tick(sample("code", start - Duration::seconds(2)));
        assert!(matches!(outcome, TickOutcome::Skipped(_)));
        assert_eq!(accumulator.usage_of("code"), 0.);
    }

    #[test]
    fn daily_usage_rolls_over_at_midnight() {
        let start = at(4, 23, 59, 58);
        let mut accumulator = empty(start);
        accumulator.tick(sample("code", at(4, 23, 59, 59)));
        accumulator.tick(sample("term", at(5, 0, 0, 1)));

        assert_eq!(accumulator.usage_on("2018-07-04"), 1.);
        assert_eq!(accumulator.usage_on("2018-07-05"), 2.);
        assert_eq!(accumulator.usage_of("code"), 1.);
        assert_eq!(accumulator.usage_of("term"), 2.);
    }

    #[test]
    fn unknown_application_accumulates_under_sentinel() {
        let start = at(4, 12, 0, 0);
        let mut accumulator = empty(start);
        accumulator.tick(sample("Unknown", start + Duration::seconds(1)));
        assert_eq!(accumulator.usage_of("Unknown"), 1.);
    }

    #[test]
    fn continues_from_loaded_totals() {
        let start = at(4, 12, 0, 0);
        let mut accumulator = UsageAccumulator::new(
            start,
            BTreeMap::from([("code".to_string(), 100.)]),
            BTreeMap::from([("2018-07-04".to_string(), 100.)]),
        );
        accumulator.tick(sample("code", start + Duration::seconds(2)));
        assert_eq!(accumulator.usage_of("code"), 102.);
        assert_eq!(accumulator.usage_on("2018-07-04"), 102.);
    }
}
