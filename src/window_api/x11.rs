use anyhow::anyhow;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::instrument;
use xcb::{
    Connection,
    x::{ATOM_ANY, ATOM_NONE, Atom, GetProperty, InternAtom, Window},
};

use super::{ProbeError, WindowManager};

/// Looks up an atom the window manager must already have created.
fn existing_atom(conn: &Connection, name: &'static [u8]) -> anyhow::Result<Atom> {
    let reply = conn.wait_for_reply(conn.send_request(&InternAtom {
        only_if_exists: true,
        name,
    }))?;
    let atom = reply.atom();
    if atom == ATOM_NONE {
        return Err(anyhow!(
            "Window manager doesn't support {}",
            String::from_utf8_lossy(name)
        ));
    }
    Ok(atom)
}

fn get_pid(conn: &Connection, window: Window, pid_atom: Atom) -> anyhow::Result<Option<u32>> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window,
        property: pid_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    Ok(result.value::<u32>().first().copied())
}

fn get_active_window(
    conn: &Connection,
    root: Window,
    active_window_atom: Atom,
) -> anyhow::Result<Option<Window>> {
    let result = conn.wait_for_reply(conn.send_request(&GetProperty {
        delete: false,
        window: root,
        property: active_window_atom,
        r#type: ATOM_ANY,
        long_offset: 0,
        long_length: 1,
    }))?;
    Ok(result.value::<Window>().first().copied())
}

pub struct LinuxWindowManager {
    connection: Connection,
    preferred_screen: i32,
    active_window_atom: Atom,
    pid_atom: Atom,
    system: System,
}

impl LinuxWindowManager {
    pub fn new() -> anyhow::Result<Self> {
        let (connection, preferred_screen) = xcb::Connection::connect(None)?;
        let active_window_atom = existing_atom(&connection, b"_NET_ACTIVE_WINDOW")?;
        let pid_atom = existing_atom(&connection, b"_NET_WM_PID")?;
        Ok(Self {
            connection,
            preferred_screen,
            active_window_atom,
            pid_atom,
            system: System::new(),
        })
    }

    /// Only the process in question is refreshed, a full refresh every second is too slow.
    fn get_process_name(&mut self, id: u32) -> Result<String, ProbeError> {
        let pid = Pid::from_u32(id);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        let process = self
            .system
            .process(pid)
            .ok_or(ProbeError::ProcessGone { pid: id })?;
        Ok(process.name().to_string_lossy().to_string())
    }
}

impl WindowManager for LinuxWindowManager {
    #[instrument(skip(self))]
    fn get_active_process_name(&mut self) -> Result<String, ProbeError> {
        let setup = self.connection.get_setup();

        // Currently the application only supports 1 x11 screen.
        let root = setup
            .roots()
            .nth(self.preferred_screen.max(0) as usize)
            .ok_or_else(|| anyhow!("Screen {} is missing", self.preferred_screen))?
            .root();

        let active_window = get_active_window(&self.connection, root, self.active_window_atom)?
            .ok_or(ProbeError::NoForegroundWindow)?;
        let pid = get_pid(&self.connection, active_window, self.pid_atom)?
            .ok_or(ProbeError::NoForegroundWindow)?;
        self.get_process_name(pid)
    }
}
