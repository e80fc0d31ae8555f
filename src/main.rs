use anyhow::Result;
use tracing::error;
use tesseract::{
    cli::run_cli,
    utils::runtime::{SHUTDOWN_GRACE, multi_thread_runtime},
};


fn main() -> Result<()> {
    let runtime = multi_thread_runtime()?;
    let result = runtime.block_on(run_cli()).inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
