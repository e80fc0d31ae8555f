use tracing::{info, warn};

use crate::utils::format::display_name;

use super::usage::limits::LimitWarning;

/// Delivers pop-up style messages to the user.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn limit_exceeded(&self, warning: &LimitWarning);

    fn break_due(&self, interval_minutes: u32);
}

/// Prints framed messages into the terminal the tracker runs in.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn show(title: &str, body: &str) {
        let width = body
            .lines()
            .chain(std::iter::once(title))
            .map(|v| v.chars().count())
            .max()
            .unwrap_or_default();
        let line = "-".repeat(width + 4);
        println!();
        println!("+{line}+");
        println!("|  {title:width$}  |");
        println!("+{line}+");
        for v in body.lines() {
            println!("|  {v:width$}  |");
        }
        println!("+{line}+");
    }
}

impl Notifier for ConsoleNotifier {
    fn limit_exceeded(&self, warning: &LimitWarning) {
        warn!(
            "{} is over its limit: {:.1} of {} minutes",
            warning.app, warning.used_minutes, warning.limit_minutes
        );
        Self::show(
            "Time's up!",
            &format!(
                "You've been using {} for over {} minutes.\nMaybe time for a break?",
                display_name(&warning.app),
                warning.limit_minutes
            ),
        );
    }

    fn break_due(&self, interval_minutes: u32) {
        info!("Break reminder after {interval_minutes} minutes");
        Self::show(
            "Break time!",
            &format!(
                "You've been focused for {interval_minutes} minutes.\nTime to stretch and rest your eyes!"
            ),
        );
    }
}
