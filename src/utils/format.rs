//! Human readable renditions of usage values.

use std::path::Path;

/// Formats seconds the way the dashboard shows them: seconds below a minute, whole minutes
/// below an hour and hours with minutes above that. Values are truncated, never rounded.
pub fn format_time(seconds: f64) -> String {
    if seconds < 60. {
        format!("{}s", seconds.max(0.) as u64)
    } else if seconds < 3600. {
        format!("{}m", (seconds / 60.) as u64)
    } else {
        let hours = (seconds / 3600.) as u64;
        let minutes = ((seconds % 3600.) / 60.) as u64;
        format!("{hours}h {minutes}m")
    }
}

/// Reduces a full executable path to the file name. Names without a path are left alone.
pub fn clean_process_name(value: &str) -> String {
    // Windows paths are split manually so that they are handled on every platform.
    let tail = value.rsplit(['\\', '/']).next().unwrap_or(value);
    if tail.is_empty() {
        return Path::new(value)
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| value.to_string());
    }
    tail.to_string()
}

/// Name shown to the user: `.exe` dropped and every word capitalized, e.g. `chrome.exe` is
/// shown as `Chrome`.
pub fn display_name(app: &str) -> String {
    let stripped = app.replace(".exe", "");
    let mut result = String::with_capacity(stripped.len());
    let mut word_start = true;
    for c in stripped.chars() {
        if c.is_alphabetic() {
            if word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            result.push(c);
            word_start = true;
        }
    }
    result
}
