
use anyhow::anyhow;
use tracing::error;
use windows::{
    Win32::{
        Foundation::{BOOL, CloseHandle, E_ACCESSDENIED, HANDLE},
        System::Threading::{
            OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
            QueryFullProcessImageNameW,
        },
        UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId},
    },
    core::PWSTR,
};

use super::{ProbeError, WindowManager};

#[tracing::instrument]
pub fn get_active_process() -> Result<String, ProbeError> {
    let window = unsafe { GetForegroundWindow() };

    if window.is_invalid() {
        return Err(ProbeError::NoForegroundWindow);
    }

    let mut id = 0u32;
    unsafe { GetWindowThreadProcessId(window, Some(&mut id)) };
    if id == 0 {
        return Err(ProbeError::NoForegroundWindow);
    }

    let process_handle = unsafe {
        OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, BOOL::from(false), id)
    }
    .map_err(|e| {
        if e.code() == E_ACCESSDENIED {
            ProbeError::AccessDenied { pid: id }
        } else {
            ProbeError::ProcessGone { pid: id }
        }
    })?;

    let mut text: [u16; 4096] = [0; 4096];
    let process_name = unsafe { get_window_process_path(process_handle, &mut text) };

    unsafe { CloseHandle(process_handle) }
        .inspect_err(|e| error!("Failed to close handle {e:?}"))
        .map_err(|e| anyhow!("Failed to close process handle {e}"))?;

    process_name.map_err(|_| ProbeError::ProcessGone { pid: id })
}

unsafe fn get_window_process_path(
    process_handle: HANDLE,
    text: &mut [u16],
) -> windows::core::Result<String> {
    unsafe {
        let mut length = text.len() as u32;
        QueryFullProcessImageNameW(
            process_handle,
            PROCESS_NAME_WIN32,
            PWSTR(text.as_mut_ptr()),
            &mut length,
        )?;
        Ok(String::from_utf16_lossy(&text[..length as usize]))
    }
}

pub struct WindowsWindowManager {}

impl WindowsWindowManager {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for WindowsWindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager for WindowsWindowManager {
    fn get_active_process_name(&mut self) -> Result<String, ProbeError> {
        get_active_process()
    }
}
