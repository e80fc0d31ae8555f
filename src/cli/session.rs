use std::{fmt::Write, io, path::PathBuf};

use anyhow::Result;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::daemon::{
    TrackerHandle, autosave::save_state, state::UsageSnapshot, storage::data_store::JsonDataStore,
};

use super::output::dashboard::{render_dashboard, render_limits, render_settings};

pub const HELP: &str = "\
Commands:
  dashboard                     today's screen time and the most used apps
  limits                        configured limits and how much of them is used
  limit set <app> <minutes>     limit an application, e.g. `limit set chrome.exe 45`
  limit remove <app>            remove the limit of an application
  settings                      break reminder settings
  interval <minutes>            change the break reminder interval
  reminders start|stop|toggle   schedule or cancel break reminders
  export [dir]                  write a timestamped copy of all data
  clear                         delete all tracked data and limits
  help                          show this message
  quit                          save and exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Quit,
}

/// Interactive front-end of the tracker. Every command produces text that is printed back.
pub struct Session {
    handle: TrackerHandle,
    pending_clear: bool,
    styled: bool,
}

impl Session {
    pub fn new(handle: TrackerHandle, styled: bool) -> Self {
        Self {
            handle,
            pending_clear: false,
            styled,
        }
    }

    /// Reads commands until `quit`, end of input or shutdown.
    pub async fn run(
        mut self,
        mut lines: impl Stream<Item = io::Result<String>> + Unpin,
    ) -> Result<()> {
        println!("Tesseract is tracking your screen time. Type `help` for commands.");
        let shutdown = self.handle.shutdown.clone();
        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => break,
                line = lines.next() => line,
            };
            let Some(line) = line.transpose()? else {
                debug!("Input closed");
                break;
            };
            let (output, flow) = self.handle_line(&line).await;
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
            if flow == SessionFlow::Quit {
                break;
            }
        }
        self.handle.reminder.stop();
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> (String, SessionFlow) {
        let words = line.split_whitespace().collect::<Vec<_>>();

        if std::mem::take(&mut self.pending_clear) {
            return match words.as_slice() {
                ["yes" | "y"] => (self.clear().await, SessionFlow::Continue),
                _ => ("Nothing was deleted".into(), SessionFlow::Continue),
            };
        }

        let output = match words.as_slice() {
            [] => String::new(),
            ["dashboard" | "d"] => {
                let snapshot = self.snapshot().await;
                render_dashboard(&snapshot, self.styled)
            }
            ["limits" | "l"] => {
                let snapshot = self.snapshot().await;
                render_limits(&snapshot, self.styled)
            }
            ["limit", "set", rest @ ..] => self.set_limit(rest).await,
            ["limit", "remove", rest @ ..] if !rest.is_empty() => {
                self.remove_limit(&rest.join(" ")).await
            }
            ["settings" | "s"] => render_settings(&self.snapshot().await),
            ["interval", minutes] => self.set_interval(minutes).await,
            ["reminders", "start"] => self.start_reminders().await,
            ["reminders", "stop"] => self.stop_reminders().await,
            ["reminders", "toggle"] => {
                if self.handle.reminder.is_active() {
                    self.stop_reminders().await
                } else {
                    self.start_reminders().await
                }
            }
            ["export"] => self.export(PathBuf::from(".")).await,
            ["export", dir @ ..] => self.export(PathBuf::from(dir.join(" "))).await,
            ["clear"] => {
                self.pending_clear = true;
                "This will delete all your tracking data. This can't be undone!\n\
                 Type `yes` to confirm."
                    .into()
            }
            ["help" | "h" | "?"] => HELP.into(),
            ["quit" | "exit" | "q"] => return ("Bye!".into(), SessionFlow::Quit),
            _ => format!("Unknown command `{}`. Type `help` for commands.", line.trim()),
        };
        (output, SessionFlow::Continue)
    }

    async fn snapshot(&self) -> UsageSnapshot {
        let now = self.handle.clock.time();
        self.handle.state.lock().await.snapshot(now)
    }

    /// Persists right away so that edits survive a crash before the next autosave.
    async fn persist(&self, out: &mut String) {
        let saved = save_state(
            &self.handle.state,
            &self.handle.store,
            self.handle.clock.as_ref(),
        )
        .await;
        if let Err(e) = saved {
            error!("Failed to save after an edit {e:?}");
            let _ = write!(out, "\nWarning: changes are kept in memory but couldn't be saved: {e}");
        }
    }

    async fn set_limit(&mut self, rest: &[&str]) -> String {
        // The last word is the limit, everything before it is the application name.
        let (app, minutes) = match rest {
            [] => (String::new(), ""),
            [app] => (app.to_string(), ""),
            [app @ .., minutes] => (app.join(" "), *minutes),
        };
        let app = app.as_str();
        let result = self.handle.state.lock().await.set_limit(app, minutes);
        match result {
            Ok(minutes) => {
                info!("Limit for {app} set to {minutes} minutes");
                let mut out = format!("Set {minutes} minute limit for {}", app.trim());
                self.persist(&mut out).await;
                out
            }
            Err(e) => format!("Invalid input: {e}"),
        }
    }

    async fn remove_limit(&mut self, app: &str) -> String {
        let removed = self.handle.state.lock().await.remove_limit(app);
        match removed {
            Some(_) => {
                let mut out = format!("Removed limit for {app}");
                self.persist(&mut out).await;
                out
            }
            None => format!("{app} has no limit"),
        }
    }

    async fn set_interval(&mut self, minutes: &str) -> String {
        let result = self.handle.state.lock().await.set_break_interval(minutes);
        match result {
            Ok(minutes) => {
                let mut out = format!("Break interval set to {minutes} minutes");
                if self.handle.reminder.is_active() {
                    self.handle.reminder.start(minutes);
                    out.push_str(", reminders rescheduled");
                }
                self.persist(&mut out).await;
                out
            }
            Err(e) => format!("Invalid input: {e}"),
        }
    }

    async fn start_reminders(&mut self) -> String {
        let mut state = self.handle.state.lock().await;
        let interval = state.break_interval();
        self.handle.reminder.start(interval);
        state.set_reminders_enabled(true);
        format!("Break reminders every {interval} minutes")
    }

    async fn stop_reminders(&mut self) -> String {
        self.handle.reminder.stop();
        self.handle.state.lock().await.set_reminders_enabled(false);
        "Break reminders disabled".into()
    }

    async fn export(&self, dir: PathBuf) -> String {
        let data = self.handle.state.lock().await.to_entity();
        match JsonDataStore::export(data, &dir, self.handle.clock.time()).await {
            Ok(path) => format!("Data exported to {}", path.display()),
            Err(e) => {
                error!("Export failed {e:?}");
                format!("Couldn't export data: {e}")
            }
        }
    }

    async fn clear(&mut self) -> String {
        self.handle.state.lock().await.clear();
        info!("All tracked data cleared");
        let mut out = String::from("All data has been cleared");
        self.persist(&mut out).await;
        out
    }
}
