use std::time::Duration;

use anyhow::Result;

/// Blocking stdin reads can't be interrupted, so the runtime is given this long to wind down
/// after the tracker stops instead of waiting for the next line of input.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

pub fn multi_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
