use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::utils::clock::Clock;

use super::notify::Notifier;

/// Schedules break reminders. Every [BreakReminder::start] begins a new run with its own
/// cancellation token, so a run that is still asleep from before a restart can never fire.
pub struct BreakReminder {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    active: Option<CancellationToken>,
    shutdown: CancellationToken,
}

impl BreakReminder {
    pub fn new(
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            clock,
            notifier,
            active: None,
            shutdown,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts reminding every `interval_minutes`. Restarts the schedule if it was already running.
    pub fn start(&mut self, interval_minutes: u32) {
        self.stop();
        let token = self.shutdown.child_token();
        self.active = Some(token.clone());
        info!("Break reminders every {interval_minutes} minutes");
        tokio::spawn(reminder_loop(
            self.clock.clone(),
            self.notifier.clone(),
            token,
            Duration::from_secs(u64::from(interval_minutes) * 60),
            interval_minutes,
        ));
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            info!("Break reminders disabled");
            token.cancel();
        }
    }
}

impl Drop for BreakReminder {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn reminder_loop(
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    enabled: CancellationToken,
    interval: Duration,
    interval_minutes: u32,
) {
    loop {
        tokio::select! {
            _ = enabled.cancelled() => (),
            _ = clock.sleep(interval) => ()
        }
        // Checked after waking up as well, the flag may have flipped while sleeping.
        if enabled.is_cancelled() {
            debug!("Reminder loop finished");
            return;
        }
        notifier.break_due(interval_minutes);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chrono::Local;
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::notify::MockNotifier,
        utils::clock::{Clock, TestClock},
    };

    use super::BreakReminder;

    fn reminder(notifier: MockNotifier) -> BreakReminder {
        let clock: Arc<dyn Clock> = Arc::new(TestClock::starting_at(Local::now()));
        BreakReminder::new(clock, Arc::new(notifier), CancellationToken::new())
    }

    /// Lets spawned tasks observe the current (paused) time.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_interval() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_break_due()
            .withf(|minutes| *minutes == 20)
            .times(2)
            .return_const(());
        let mut reminder = reminder(notifier);
        reminder.start(20);
        settle().await;

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        settle().await;
        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        settle().await;
        tokio::time::advance(Duration::from_secs(10 * 60)).await;
        settle().await;

        reminder.stop();
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_mid_sleep_suppresses_next_reminder() {
        let mut notifier = MockNotifier::new();
        notifier.expect_break_due().never();
        let mut reminder = reminder(notifier);
        reminder.start(1);
        settle().await;

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        reminder.stop();
        assert!(!reminder.is_active());

        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_does_not_double_fire() {
        let mut notifier = MockNotifier::new();
        notifier.expect_break_due().times(1).return_const(());
        let mut reminder = reminder(notifier);
        reminder.start(1);
        settle().await;

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        reminder.stop();
        reminder.start(1);
        settle().await;

        // First run would have fired at 60s, the new one fires at 90s.
        tokio::time::advance(Duration::from_secs(40)).await;
        settle().await;
        tokio::time::advance(Duration::from_secs(25)).await;
        settle().await;
        reminder.stop();
        settle().await;
    }
}
