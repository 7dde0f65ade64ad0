//! In-memory [`WindowHost`] shared by the unit tests.
//!
//! The fake records every mutating call so tests can assert on what the
//! engine did, and lets tests script launches: a path registered with
//! [`FakeHost::on_launch`] makes a new window appear when launched.

use crate::model::{Monitor, Rect, WindowHandle, WindowState};
use crate::traits::{HostWindow, ProcessInfo, WindowHost};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
#[error("fake host error: {0}")]
pub(crate) struct FakeHostError(pub String);

#[derive(Debug)]
pub(crate) struct FakeHost {
    windows: Mutex<Vec<HostWindow>>,
    processes: Mutex<HashMap<u32, ProcessInfo>>,
    monitors: Mutex<Vec<Monitor>>,
    foreground: Mutex<Option<WindowHandle>>,
    launch_templates: Mutex<HashMap<String, (String, String)>>,
    unlaunchable: Mutex<HashSet<String>>,
    next_handle: AtomicU64,
    next_pid: AtomicU32,
    pub fail_enumeration: AtomicBool,
    pub enumerations: AtomicUsize,
    moves: Mutex<Vec<(WindowHandle, Rect)>>,
    state_changes: Mutex<Vec<(WindowHandle, WindowState)>>,
    closed: Mutex<Vec<WindowHandle>>,
    launches: Mutex<Vec<(String, String)>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// A host with a single 1920×1080 monitor and no windows.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
            processes: Mutex::new(HashMap::new()),
            monitors: Mutex::new(vec![Monitor {
                index: 0,
                name: "FAKE-1".into(),
                work_area: Rect::new(0, 0, 1920, 1080),
            }]),
            foreground: Mutex::new(None),
            launch_templates: Mutex::new(HashMap::new()),
            unlaunchable: Mutex::new(HashSet::new()),
            next_handle: AtomicU64::new(0x1000),
            next_pid: AtomicU32::new(100),
            fail_enumeration: AtomicBool::new(false),
            enumerations: AtomicUsize::new(0),
            moves: Mutex::new(Vec::new()),
            state_changes: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            launches: Mutex::new(Vec::new()),
        }
    }

    /// Replace the monitor list with the given work areas.
    pub fn set_monitors(&self, work_areas: &[Rect]) {
        *self.monitors.lock().unwrap() = work_areas
            .iter()
            .enumerate()
            .map(|(index, &work_area)| Monitor {
                index,
                name: format!("FAKE-{}", index + 1),
                work_area,
            })
            .collect();
    }

    /// Add a window owned by a fresh process called `process`.
    pub fn add_window(&self, process: &str, title: &str, rect: Rect) -> WindowHandle {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.processes.lock().unwrap().insert(
            pid,
            ProcessInfo {
                name: process.into(),
                path: format!("/usr/bin/{}", process),
            },
        );
        self.add_window_with_pid(pid, title, rect)
    }

    /// Add a window whose owning process is not known to the host, as if it
    /// exited right after enumeration.
    pub fn add_orphan_window(&self, title: &str) -> WindowHandle {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.add_window_with_pid(pid, title, Rect::new(0, 0, 100, 100))
    }

    fn add_window_with_pid(&self, pid: u32, title: &str, rect: Rect) -> WindowHandle {
        let handle = WindowHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.windows.lock().unwrap().push(HostWindow {
            handle,
            pid,
            title: title.into(),
            rect,
            state: WindowState::Normal,
        });
        handle
    }

    pub fn remove_window(&self, handle: WindowHandle) {
        self.windows.lock().unwrap().retain(|w| w.handle != handle);
    }

    pub fn set_foreground(&self, handle: Option<WindowHandle>) {
        *self.foreground.lock().unwrap() = handle;
    }

    /// Launching `path` makes a window of `process` titled `title` appear.
    pub fn on_launch(&self, path: &str, process: &str, title: &str) {
        self.launch_templates
            .lock()
            .unwrap()
            .insert(path.into(), (process.into(), title.into()));
    }

    /// Launching `path` fails.
    pub fn refuse_launch(&self, path: &str) {
        self.unlaunchable.lock().unwrap().insert(path.into());
    }

    pub fn window_count(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    pub fn moves(&self) -> Vec<(WindowHandle, Rect)> {
        self.moves.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<(String, String)> {
        self.launches.lock().unwrap().clone()
    }

    pub fn state_changes(&self) -> Vec<(WindowHandle, WindowState)> {
        self.state_changes.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<WindowHandle> {
        self.closed.lock().unwrap().clone()
    }
}

impl WindowHost for FakeHost {
    type Error = FakeHostError;

    fn windows(&self) -> Result<Vec<HostWindow>, FakeHostError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(FakeHostError("enumeration failed".into()));
        }
        Ok(self.windows.lock().unwrap().clone())
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Option<Rect>, FakeHostError> {
        Ok(self
            .windows
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.rect))
    }

    fn set_window_rect(&self, handle: WindowHandle, rect: Rect) -> Result<bool, FakeHostError> {
        let mut windows = self.windows.lock().unwrap();
        match windows.iter_mut().find(|w| w.handle == handle) {
            Some(w) => {
                w.rect = rect;
                self.moves.lock().unwrap().push((handle, rect));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_window_state(
        &self,
        handle: WindowHandle,
        state: WindowState,
    ) -> Result<bool, FakeHostError> {
        let mut windows = self.windows.lock().unwrap();
        match windows.iter_mut().find(|w| w.handle == handle) {
            Some(w) => {
                w.state = state;
                self.state_changes.lock().unwrap().push((handle, state));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn close_window(&self, handle: WindowHandle) -> Result<bool, FakeHostError> {
        let mut windows = self.windows.lock().unwrap();
        let before = windows.len();
        windows.retain(|w| w.handle != handle);
        if windows.len() == before {
            return Ok(false);
        }
        self.closed.lock().unwrap().push(handle);
        Ok(true)
    }

    fn monitors(&self) -> Result<Vec<Monitor>, FakeHostError> {
        Ok(self.monitors.lock().unwrap().clone())
    }

    fn foreground_window(&self) -> Result<Option<WindowHandle>, FakeHostError> {
        Ok(*self.foreground.lock().unwrap())
    }

    fn process_info(&self, pid: u32) -> Result<Option<ProcessInfo>, FakeHostError> {
        Ok(self.processes.lock().unwrap().get(&pid).cloned())
    }

    fn launch(&self, path: &str, arguments: &str) -> Result<(), FakeHostError> {
        if self.unlaunchable.lock().unwrap().contains(path) {
            return Err(FakeHostError(format!("cannot launch {}", path)));
        }
        self.launches
            .lock()
            .unwrap()
            .push((path.to_string(), arguments.to_string()));
        let template = self.launch_templates.lock().unwrap().get(path).cloned();
        if let Some((process, title)) = template {
            self.add_window(&process, &title, Rect::new(10, 10, 640, 480));
        }
        Ok(())
    }
}
