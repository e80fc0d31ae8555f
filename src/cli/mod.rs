pub mod output;
pub mod report;
pub mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::watch_dashboard;
use report::{process_export_command, process_status_command};
use session::Session;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{DaemonOptions, start_daemon},
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{CLI_PREFIX, TRACKER_PREFIX, enable_logging},
    },
};

const DASHBOARD_REFRESH: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "Tesseract", version, long_about = None)]
#[command(about = "Screen time tracker with app limits and break reminders", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable trace logging")]
    log: bool,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", global = true)]
    log_console: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Track screen time and manage limits through an interactive session")]
    Run {
        #[arg(long, help = "Start break reminders right away")]
        break_reminders: bool,
    },
    #[command(about = "Track screen time without reading commands. Stops on Ctrl-C")]
    Serve {
        #[arg(long, help = "Redraw the dashboard every second")]
        watch: bool,
        #[arg(long, help = "Start break reminders right away")]
        break_reminders: bool,
    },
    #[command(about = "Show saved screen time, limits and settings")]
    Status {},
    #[command(about = "Write a timestamped copy of the saved data")]
    Export {
        #[arg(long, help = "Directory for the export. Defaults to the current directory")]
        out: Option<PathBuf>,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let prefix = match args.commands {
        Commands::Run { .. } | Commands::Serve { .. } => TRACKER_PREFIX,
        Commands::Status {} | Commands::Export { .. } => CLI_PREFIX,
    };
    enable_logging(prefix, &app_dir, logging_level, args.log_console)?;

    match args.commands {
        Commands::Run { break_reminders } => {
            start_daemon(app_dir, DaemonOptions { break_reminders }, |handle| {
                let lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());
                Session::new(handle, true).run(lines)
            })
            .await
        }
        Commands::Serve {
            watch,
            break_reminders,
        } => {
            start_daemon(app_dir, DaemonOptions { break_reminders }, |handle| async move {
                if watch {
                    watch_dashboard(handle.state, handle.clock, handle.shutdown, DASHBOARD_REFRESH)
                        .await;
                } else {
                    handle.shutdown.cancelled().await;
                }
                // The reminder lives in the handle and is stopped when it's dropped here.
                Ok(())
            })
            .await
        }
        Commands::Status {} => process_status_command(&app_dir).await,
        Commands::Export { out } => {
            process_export_command(&app_dir, out.unwrap_or_else(|| PathBuf::from("."))).await
        }
    }
}
