//! Contains logic for finding out which application the user is looking at.
//! [GenericWindowManager] is the main artifact of this module that abstracts
//! the operations.

#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use thiserror::Error;

/// Reasons the foreground application couldn't be determined. None of them are fatal, the
/// tracker records such samples under [UNKNOWN_APPLICATION](crate::daemon::collection::probe::UNKNOWN_APPLICATION).
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("No window has input focus")]
    NoForegroundWindow,
    #[error("Access to process {pid} was denied")]
    AccessDenied { pid: u32 },
    #[error("Process {pid} exited before its name could be read")]
    ProcessGone { pid: u32 },
    #[error("No window manager backend was compiled in")]
    Unsupported,
    #[error(transparent)]
    Platform(#[from] anyhow::Error),
}

/// Intended to serve as a contract windows and linux systems must implement.
#[cfg_attr(test, mockall::automock)]
pub trait WindowManager: Send {
    /// Name of the process owning the focused window. Might be a full path to an executable,
    /// for example /usr/lib/firefox/firefox or C:\Program Files\...\chrome.exe
    fn get_active_process_name(&mut self) -> Result<String, ProbeError>;
}

/// Serves as a cross-compatible WindowManager implementation.
pub struct GenericWindowManager {
    inner: Box<dyn WindowManager>,
}

impl GenericWindowManager {
    /// Never fails. A backend that can't start, for example without a reachable X display, is
    /// replaced by [UnsupportedWindowManager] so that tracking still runs.
    pub fn new() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                Self::with_backend(Ok(win::WindowsWindowManager::new()))
            }
            else if #[cfg(feature = "x11")] {
                Self::with_backend(x11::LinuxWindowManager::new())
            }
            else {
                tracing::warn!("No window manager was specified, every sample will be unknown");
                Self {
                    inner: Box::new(UnsupportedWindowManager),
                }
            }
        }
    }

    #[cfg_attr(not(any(feature = "win", feature = "x11")), allow(dead_code))]
    fn with_backend(backend: anyhow::Result<impl WindowManager + 'static>) -> Self {
        let inner: Box<dyn WindowManager> = match backend {
            Ok(backend) => Box::new(backend),
            Err(e) => {
                tracing::warn!("Window manager is unavailable, every sample will be unknown: {e:?}");
                Box::new(UnsupportedWindowManager)
            }
        };
        Self { inner }
    }
}

impl Default for GenericWindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager for GenericWindowManager {
    fn get_active_process_name(&mut self) -> Result<String, ProbeError> {
        self.inner.get_active_process_name()
    }
}

/// Used when the binary is built without a platform backend. Lets the rest of the tracker run
/// so that it can be developed and tested anywhere.
pub struct UnsupportedWindowManager;

impl WindowManager for UnsupportedWindowManager {
    fn get_active_process_name(&mut self) -> Result<String, ProbeError> {
        Err(ProbeError::Unsupported)
    }
}
