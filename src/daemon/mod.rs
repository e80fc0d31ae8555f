use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use autosave::{AutosaveModule, DEFAULT_AUTOSAVE_INTERVAL};
use collection::{collector::DataCollectionModule, probe::ActiveWindowProbe};
use notify::{ConsoleNotifier, Notifier};
use reminder::BreakReminder;
use state::{SharedState, TrackerState};
use storage::data_store::JsonDataStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    utils::clock::{Clock, DefaultClock},
    window_api::{GenericWindowManager, WindowManager},
};

pub mod autosave;
pub mod collection;
pub mod notify;
pub mod reminder;
pub mod shutdown;
pub mod state;
pub mod storage;
pub mod usage;
pub mod validation;

const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default)]
pub struct DaemonOptions {
    /// Schedule break reminders right away using the stored interval.
    pub break_reminders: bool,
}

/// What the presentation layer gets to work with while the tracker runs.
pub struct TrackerHandle {
    pub state: SharedState,
    pub store: JsonDataStore,
    pub reminder: BreakReminder,
    pub clock: Arc<dyn Clock>,
    pub shutdown: CancellationToken,
}

/// Represents the starting point for the tracker. Runs until Ctrl-C or until `presentation`
/// returns, saving the state on the way out.
pub async fn start_daemon<F, Fut>(dir: PathBuf, options: DaemonOptions, presentation: F) -> Result<()>
where
    F: FnOnce(TrackerHandle) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let manager = GenericWindowManager::new();
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let store = JsonDataStore::in_dir(&dir);

    let data = store.load_or_default().await;
    let state = TrackerState::from_entity(data, clock.time()).into_shared();

    let shutdown_token = CancellationToken::new();

    let collector = create_collector(
        state.clone(),
        manager,
        notifier.clone(),
        &shutdown_token,
        clock.clone(),
    );
    let autosave = create_autosave(state.clone(), store.clone(), &shutdown_token, clock.clone());

    let mut reminder = BreakReminder::new(clock.clone(), notifier, shutdown_token.clone());
    if options.break_reminders {
        let mut state = state.lock().await;
        reminder.start(state.break_interval());
        state.set_reminders_enabled(true);
    }

    let handle = TrackerHandle {
        state,
        store,
        reminder,
        clock,
        shutdown: shutdown_token.clone(),
    };

    info!("Tracker started");
    let (_, collection_result, autosave_result, presentation_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        collector.run(),
        autosave.run(),
        async {
            let result = presentation(handle).await;
            shutdown_token.cancel();
            result
        },
    );

    if let Err(collection_result) = collection_result {
        error!("Collection module got an error {:?}", collection_result);
    }

    if let Err(autosave_result) = autosave_result {
        error!("Final save failed {:?}", autosave_result);
    }

    info!("Tracker stopped");
    presentation_result
}

fn create_collector(
    state: SharedState,
    manager: impl WindowManager + 'static,
    notifier: Arc<dyn Notifier>,
    shutdown_token: &CancellationToken,
    clock: Arc<dyn Clock>,
) -> DataCollectionModule {
    DataCollectionModule::new(
        state,
        ActiveWindowProbe::new(Box::new(manager)),
        notifier,
        shutdown_token.clone(),
        DEFAULT_COLLECTION_INTERVAL,
        clock,
    )
}

fn create_autosave(
    state: SharedState,
    store: JsonDataStore,
    shutdown_token: &CancellationToken,
    clock: Arc<dyn Clock>,
) -> AutosaveModule {
    AutosaveModule::new(
        state,
        store,
        shutdown_token.clone(),
        DEFAULT_AUTOSAVE_INTERVAL,
        clock,
    )
}
