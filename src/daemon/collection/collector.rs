use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    daemon::{
        notify::Notifier,
        state::SharedState,
        usage::accumulator::{Sample, TickOutcome},
    },
    utils::clock::Clock,
};

use super::probe::ActiveWindowProbe;

/// Samples the foreground application and feeds it into the shared state.
pub struct DataCollectionModule {
    state: SharedState,
    probe: ActiveWindowProbe,
    notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
    collection_frequency: Duration,
    time_provider: Arc<dyn Clock>,
}

impl DataCollectionModule {
    pub fn new(
        state: SharedState,
        probe: ActiveWindowProbe,
        notifier: Arc<dyn Notifier>,
        shutdown: CancellationToken,
        collection_frequency: Duration,
        time_provider: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state,
            probe,
            notifier,
            shutdown,
            collection_frequency,
            time_provider,
        }
    }

    async fn collect_data(&mut self) {
        let sample = Sample {
            app: self.probe.probe(),
            timestamp: self.time_provider.time(),
        };
        trace!("Collected {:?}", sample);

        let recorded = self.state.lock().await.record(sample);
        if let TickOutcome::Skipped(gap) = recorded.outcome {
            debug!("Skipped a sample {gap} after the previous one");
        }
        if let Some(warning) = recorded.warning {
            self.notifier.limit_exceeded(&warning);
        }
    }

    /// Executes the collector event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut collection_point = self.time_provider.instant();
        loop {
            collection_point += self.collection_frequency;

            self.collect_data().await;

            tokio::select! {
                // Cancelation means we stop execution of the event loop.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(collection_point) => ()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc, time::Duration};

    use anyhow::Result;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{
            collection::probe::ActiveWindowProbe, notify::MockNotifier, state::TrackerState,
            storage::entities::TrackerDataEntity,
        },
        utils::{
            clock::{Clock, TestClock},
            logging::TEST_LOGGING,
        },
        window_api::MockWindowManager,
    };

    use super::DataCollectionModule;

    fn test_start() -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 3, 16)
                    .unwrap()
                    .and_hms_opt(18, 0, 0)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn crossing_a_limit_notifies_once() -> Result<()> {
        *TEST_LOGGING;
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_active_process_name()
            .returning(|| Ok("/usr/bin/test".into()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_limit_exceeded()
            .withf(|warning| warning.app == "test" && warning.limit_minutes == 45)
            .times(1)
            .return_const(());

        let clock: Arc<dyn Clock> = Arc::new(TestClock::starting_at(test_start()));
        let state = TrackerState::from_entity(
            TrackerDataEntity {
                app_usage: BTreeMap::from([("test".to_string(), 2999.)]),
                app_limits: BTreeMap::from([("test".to_string(), 45)]),
                ..Default::default()
            },
            clock.time(),
        )
        .into_shared();
        let shutdown = CancellationToken::new();

        let collector = DataCollectionModule::new(
            state.clone(),
            ActiveWindowProbe::new(Box::new(manager)),
            Arc::new(notifier),
            shutdown.clone(),
            Duration::from_secs(1),
            clock,
        );

        let (_, collection_result) = tokio::join!(
            async {
                tokio::time::sleep(Duration::from_millis(3500)).await;
                shutdown.cancel();
            },
            collector.run(),
        );
        collection_result?;

        assert_eq!(state.lock().await.to_entity().app_usage["test"], 3002.);
        Ok(())
    }
}
