pub mod dashboard;

use std::{io::Write, sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{daemon::state::SharedState, utils::clock::Clock};

use dashboard::render_dashboard;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Redraws the dashboard once per second until shutdown.
pub async fn watch_dashboard(
    state: SharedState,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    refresh: Duration,
) {
    let mut refresh_point = clock.instant();
    loop {
        refresh_point += refresh;
        let snapshot = state.lock().await.snapshot(clock.time());
        print!("{CLEAR_SCREEN}{}", render_dashboard(&snapshot, true));
        let _ = std::io::stdout().flush();

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = clock.sleep_until(refresh_point) => ()
        }
    }
}
