use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use fs4::tokio::AsyncFileExt;
use thiserror::Error;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, info, warn};

use crate::utils::time::export_stamp;

use super::entities::TrackerDataEntity;

pub const DATA_FILE_NAME: &str = "tesseract_data.json";
pub const EXPORT_FILE_PREFIX: &str = "tesseract_export_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} doesn't contain valid tracker data: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keeps tracker data in a single pretty printed json file.
#[derive(Debug, Clone)]
pub struct JsonDataStore {
    path: PathBuf,
}

impl JsonDataStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store for the default data file inside an application directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DATA_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the data file. A missing file isn't an error, it just means that nothing has been
    /// tracked yet.
    pub async fn load(&self) -> Result<Option<TrackerDataEntity>, StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(e)),
        };

        file.lock_shared().map_err(io_err)?;
        let mut file = file;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await.map_err(io_err)?;
        read.map_err(io_err)?;

        let entity = serde_json::from_str::<TrackerDataEntity>(&content).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(Some(entity.sanitized()))
    }

    /// Startup flavour of [Self::load]. Never fails, anything unreadable becomes defaults.
    pub async fn load_or_default(&self) -> TrackerDataEntity {
        match self.load().await {
            Ok(Some(data)) => {
                info!("Loaded tracker data from {:?}", self.path);
                data
            }
            Ok(None) => {
                debug!("No data file at {:?}, starting fresh", self.path);
                TrackerDataEntity::default()
            }
            Err(e) => {
                warn!("Ignoring stored data: {e}");
                TrackerDataEntity::default()
            }
        }
    }

    /// Overwrites the data file, stamping it with `now`.
    pub async fn save(
        &self,
        data: TrackerDataEntity,
        now: DateTime<Local>,
    ) -> Result<(), StoreError> {
        let data = data.with_timestamp(now.fixed_offset());
        write_json(&self.path, &data).await?;
        debug!("Saved tracker data to {:?}", self.path);
        Ok(())
    }

    /// Writes `data` without the save timestamp into `dir`, named after `now`. Returns the path of
    /// the created file.
    pub async fn export(
        data: TrackerDataEntity,
        dir: &Path,
        now: DateTime<Local>,
    ) -> Result<PathBuf, StoreError> {
        let path = dir.join(format!("{EXPORT_FILE_PREFIX}{}.json", export_stamp(&now)));
        write_json(&path, &data.without_timestamp()).await?;
        info!("Exported tracker data to {path:?}");
        Ok(path)
    }
}

async fn write_json(path: &Path, data: &TrackerDataEntity) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let buffer = serde_json::to_vec_pretty(data).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .map_err(io_err)?;

    // Truncation happens under the lock so that readers never see an empty file.
    file.lock_exclusive().map_err(io_err)?;
    let result = async {
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok::<(), std::io::Error>(())
    }
    .await;
    file.unlock_async().await.map_err(io_err)?;
    result.map_err(io_err)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anyhow::Result;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use tempfile::tempdir;

    use crate::daemon::storage::entities::TrackerDataEntity;

    use super::{DATA_FILE_NAME, JsonDataStore, StoreError};

    fn moment() -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 3, 16)
                    .unwrap()
                    .and_hms_opt(14, 25, 1)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    fn sample_data() -> TrackerDataEntity {
        TrackerDataEntity {
            app_usage: BTreeMap::from([
                ("chrome.exe".to_string(), 3000.25),
                ("Unknown".to_string(), 12.),
                ("code".to_string(), 0.1 + 0.2),
            ]),
            daily_usage: BTreeMap::from([
                ("2025-03-15".to_string(), 1800.5),
                ("2025-03-16".to_string(), 1211.85),
            ]),
            app_limits: BTreeMap::from([("chrome.exe".to_string(), 45)]),
            break_interval: 25,
            last_saved: None,
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonDataStore::in_dir(dir.path());
        store.save(sample_data(), moment()).await?;

        let loaded = store.load().await?.unwrap();
        assert_eq!(loaded.app_usage, sample_data().app_usage);
        assert_eq!(loaded.daily_usage, sample_data().daily_usage);
        assert_eq!(loaded.app_limits, sample_data().app_limits);
        assert_eq!(loaded.break_interval, 25);
        assert_eq!(
            loaded.last_saved_at(),
            Some(moment().naive_local())
        );
        Ok(())
    }

    #[tokio::test]
    async fn saving_less_data_leaves_no_trailing_content() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonDataStore::in_dir(dir.path());
        store.save(sample_data(), moment()).await?;
        store.save(TrackerDataEntity::default(), moment()).await?;

        let loaded = store.load().await?.unwrap();
        assert!(loaded.app_usage.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonDataStore::in_dir(dir.path());
        assert!(store.load().await?.is_none());
        assert_eq!(store.load_or_default().await, TrackerDataEntity::default());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_defaults_on_startup() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(DATA_FILE_NAME), "{ \"app_usage\": [1, 2")?;
        let store = JsonDataStore::in_dir(dir.path());

        assert!(matches!(
            store.load().await,
            Err(StoreError::Malformed { .. })
        ));
        assert_eq!(store.load_or_default().await, TrackerDataEntity::default());
        Ok(())
    }

    #[tokio::test]
    async fn export_writes_timestamped_file_without_last_saved() -> Result<()> {
        let dir = tempdir()?;
        let path = JsonDataStore::export(
            sample_data().with_timestamp(moment().fixed_offset()),
            dir.path(),
            moment(),
        )
        .await?;

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "tesseract_export_20250316_142501.json"
        );
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("last_saved"));
        assert_eq!(object["app_limits"]["chrome.exe"], 45);
        assert_eq!(object["break_interval"], 25);
        assert!(!dir.path().join(DATA_FILE_NAME).exists());
        Ok(())
    }
}
