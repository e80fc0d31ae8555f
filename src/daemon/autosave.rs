use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::utils::clock::Clock;

use super::{
    state::SharedState,
    storage::data_store::{JsonDataStore, StoreError},
};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically writes the shared state into the data file. Failures are logged and the next
/// attempt happens on schedule.
pub struct AutosaveModule {
    state: SharedState,
    store: JsonDataStore,
    shutdown: CancellationToken,
    interval: Duration,
    time_provider: Arc<dyn Clock>,
}

impl AutosaveModule {
    pub fn new(
        state: SharedState,
        store: JsonDataStore,
        shutdown: CancellationToken,
        interval: Duration,
        time_provider: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state,
            store,
            shutdown,
            interval,
            time_provider,
        }
    }

    /// Saves once per interval and one final time on shutdown.
    pub async fn run(self) -> Result<(), StoreError> {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return save_state(&self.state, &self.store, self.time_provider.as_ref()).await;
                }
                _ = self.time_provider.sleep(self.interval) => ()
            }
            if let Err(e) = save_state(&self.state, &self.store, self.time_provider.as_ref()).await
            {
                error!("Autosave failed {e:?}");
            }
        }
    }
}

/// Writes the current state. The lock is released before touching the disk.
pub async fn save_state(
    state: &SharedState,
    store: &JsonDataStore,
    clock: &dyn Clock,
) -> Result<(), StoreError> {
    let data = state.lock().await.to_entity();
    store.save(data, clock.time()).await
}
