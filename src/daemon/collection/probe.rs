use tracing::debug;

use crate::{
    utils::format::clean_process_name,
    window_api::{ProbeError, WindowManager},
};

/// Recorded when the foreground application can't be determined.
pub const UNKNOWN_APPLICATION: &str = "Unknown";

/// Best-effort application identifier. Failures are degraded into [UNKNOWN_APPLICATION].
pub struct ActiveWindowProbe {
    manager: Box<dyn WindowManager>,
}

impl ActiveWindowProbe {
    pub fn new(manager: Box<dyn WindowManager>) -> Self {
        Self { manager }
    }

    /// Explicit result of a probe, mostly useful to tell apart expected degradation and
    /// unexpected faults.
    pub fn try_probe(&mut self) -> Result<String, ProbeError> {
        let name = self.manager.get_active_process_name()?;
        let name = clean_process_name(name.trim());
        if name.is_empty() {
            return Err(ProbeError::NoForegroundWindow);
        }
        Ok(name)
    }

    pub fn probe(&mut self) -> String {
        match self.try_probe() {
            Ok(name) => name,
            Err(e) => {
                debug!("Foreground application is unknown: {e}");
                UNKNOWN_APPLICATION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::window_api::{MockWindowManager, ProbeError};

    use super::{ActiveWindowProbe, UNKNOWN_APPLICATION};

    fn probe_returning(
        result: impl Fn() -> Result<String, ProbeError> + Send + 'static,
    ) -> ActiveWindowProbe {
        let mut manager = MockWindowManager::new();
        manager
            .expect_get_active_process_name()
            .returning(move || result());
        ActiveWindowProbe::new(Box::new(manager))
    }

    #[test]
    fn reduces_paths_to_executable_names() {
        let mut probe = probe_returning(|| Ok("/usr/lib/firefox/firefox".into()));
        assert_eq!(probe.probe(), "firefox");
    }

    #[test]
    fn failures_degrade_to_sentinel() {
        let mut probe = probe_returning(|| Err(ProbeError::AccessDenied { pid: 4 }));
        assert_eq!(probe.probe(), UNKNOWN_APPLICATION);

        let mut probe = probe_returning(|| Err(anyhow!("connection dropped").into()));
        assert!(matches!(probe.try_probe(), Err(ProbeError::Platform(_))));
        assert_eq!(probe.probe(), UNKNOWN_APPLICATION);
    }

    #[test]
    fn empty_names_are_unknown() {
        let mut probe = probe_returning(|| Ok("   ".into()));
        assert!(matches!(
            probe.try_probe(),
            Err(ProbeError::NoForegroundWindow)
        ));
        assert_eq!(probe.probe(), UNKNOWN_APPLICATION);
    }
}
