//! One-shot commands working on the saved data file. They never talk to a running tracker, so
//! what they show is as fresh as the last autosave.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use chrono::Local;

use crate::daemon::{
    state::UsageSnapshot,
    storage::{data_store::JsonDataStore, entities::TrackerDataEntity},
};

use super::output::dashboard::{render_dashboard, render_limits, render_settings};

/// Renders everything the interactive session can show, plus the moment of the last save.
pub fn render_status(data: TrackerDataEntity, now: chrono::DateTime<Local>) -> String {
    let last_saved = data
        .last_saved_at()
        .map(|v| v.format("%x %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());
    let snapshot = UsageSnapshot::from_entity(data, now);
    format!(
        "{}\n{}\n{}\nLast saved: {last_saved}",
        render_dashboard(&snapshot, true),
        render_limits(&snapshot, true),
        render_settings(&snapshot),
    )
}

pub async fn process_status_command(app_dir: &Path) -> Result<()> {
    let store = JsonDataStore::in_dir(app_dir);
    let data = store.load().await?.unwrap_or_default();
    println!("{}", render_status(data, Local::now()));
    Ok(())
}

pub async fn process_export_command(app_dir: &Path, out: PathBuf) -> Result<()> {
    let store = JsonDataStore::in_dir(app_dir);
    let Some(data) = store.load().await? else {
        return Err(anyhow!("Nothing to export, {:?} doesn't exist", store.path()));
    };
    let path = JsonDataStore::export(data, &out, Local::now()).await?;
    println!("Data exported to {}", path.display());
    Ok(())
}
