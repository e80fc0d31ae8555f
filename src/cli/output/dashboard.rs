use std::fmt::Write;

use ansi_term::Colour;

use crate::{
    daemon::state::UsageSnapshot,
    utils::{
        format::{display_name, format_time},
        percentage::seconds_percentage,
    },
};

/// Number of applications listed on the dashboard.
pub const TOP_APPLICATIONS: usize = 8;
/// Screen time treated as a full day for the progress bar.
pub const FULL_DAY_SECONDS: f64 = 8. * 3600.;
const PROGRESS_WIDTH: usize = 30;

const HEAVY_USE_SECONDS: f64 = 3600.;
const NOTABLE_USE_SECONDS: f64 = 1800.;

fn progress_bar(seconds: f64) -> String {
    let percentage = seconds_percentage(seconds, FULL_DAY_SECONDS).capped();
    let filled = (*percentage / 100. * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {percentage}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

pub fn render_dashboard(snapshot: &UsageSnapshot, styled: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Today's Screen Time: {}", format_time(snapshot.today_seconds));
    let _ = writeln!(out, "{}", progress_bar(snapshot.today_seconds));
    let _ = writeln!(out);

    if snapshot.current_app.is_empty() {
        let _ = writeln!(out, "Right Now: Not tracking");
    } else {
        let _ = writeln!(out, "Right Now: Using {}", display_name(&snapshot.current_app));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Most Used Apps");
    if snapshot.ranking.is_empty() {
        let _ = writeln!(out, "  Nothing tracked yet");
    }
    for (index, (app, seconds)) in snapshot.ranking.iter().take(TOP_APPLICATIONS).enumerate() {
        let line = format!(
            "{:>2}. {} - {}",
            index + 1,
            display_name(app),
            format_time(*seconds)
        );
        let line = match *seconds {
            s if styled && s > HEAVY_USE_SECONDS => Colour::Yellow.bold().paint(line).to_string(),
            s if styled && s > NOTABLE_USE_SECONDS => Colour::Cyan.paint(line).to_string(),
            _ => line,
        };
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn render_limits(snapshot: &UsageSnapshot, styled: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Current Limits");
    if snapshot.limits.is_empty() {
        let _ = writeln!(out, "  No limits set");
    }
    for (app, limit, used_seconds) in &snapshot.limits {
        let used_minutes = (used_seconds / 60.) as u64;
        let within = used_minutes <= u64::from(*limit);
        let status = match (within, styled) {
            (true, true) => Colour::Green.paint("OK").to_string(),
            (false, true) => Colour::Red.bold().paint("OVER").to_string(),
            (true, false) => "OK".to_string(),
            (false, false) => "OVER".to_string(),
        };
        let _ = writeln!(
            out,
            "  {} - {limit}m limit ({used_minutes}m used) {status}",
            display_name(app)
        );
    }
    out
}

pub fn render_settings(snapshot: &UsageSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Break Reminders");
    let _ = writeln!(out, "  Interval: {} minutes", snapshot.break_interval);
    let _ = writeln!(
        out,
        "  Status: {}",
        if snapshot.reminders_enabled {
            "running"
        } else {
            "stopped"
        }
    );
    out
}
