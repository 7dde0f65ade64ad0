//! Query and command surface over a [`WindowHost`].
//!
//! [`WindowQuery`] turns the raw host capability into the operations the
//! engine needs: titled-window discovery with process resolution,
//! case-insensitive lookup, best-effort moves and state changes, and
//! nearest-monitor resolution.
//!
//! Failures addressed at a single window are absorbed here: a window whose
//! process exited mid-enumeration is skipped, a stale handle yields
//! `false`/`None`, host errors are logged.  Only enumeration failure and
//! launch failure are returned as errors.

use crate::geometry::compute_zone_rect;
use crate::model::{
    CapturedWindow, Monitor, Rect, SnapZone, WindowHandle, WindowPosition, WindowState,
};
use crate::traits::{HostWindow, WindowHost};
use log::{debug, error, warn};

/// Errors returned by [`WindowQuery`].
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The host could not enumerate windows at all.
    #[error("window enumeration failed: {0}")]
    Enumerate(String),
    /// The host refused to start an application.
    #[error("failed to launch {path}: {reason}")]
    Launch { path: String, reason: String },
}

/// Stateless query/command facade over a host.
pub struct WindowQuery<H: WindowHost> {
    host: H,
}

impl<H: WindowHost> WindowQuery<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// The wrapped host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Every visible window with a non-empty title, fully resolved.
    pub fn list_visible_windows(&self) -> Result<Vec<CapturedWindow>, QueryError> {
        let windows = self
            .host
            .windows()
            .map_err(|e| QueryError::Enumerate(e.to_string()))?;
        let monitors = self.list_monitors();

        Ok(windows
            .into_iter()
            .filter(|w| !w.title.trim().is_empty())
            .filter_map(|w| self.resolve(w, &monitors))
            .collect())
    }

    /// Resolve the owning process of a host window.  `None` if the process
    /// is gone.
    fn resolve(&self, w: HostWindow, monitors: &[Monitor]) -> Option<CapturedWindow> {
        let info = match self.host.process_info(w.pid) {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!("process {} of window {} exited, skipping", w.pid, w.handle);
                return None;
            }
            Err(e) => {
                debug!("process lookup for window {} failed: {}", w.handle, e);
                return None;
            }
        };
        let monitor_index = nearest_monitor(monitors, w.rect).map_or(0, |m| m.index);
        Some(CapturedWindow {
            handle: w.handle,
            process_name: info.name,
            window_title: w.title,
            application_path: info.path,
            monitor_index,
            rect: w.rect,
            state: w.state,
        })
    }

    /// Handles of windows whose process name equals `process_name`
    /// (case-insensitive) and, when given, whose title contains
    /// `title_filter` (case-insensitive).
    pub fn find_windows(&self, process_name: &str, title_filter: Option<&str>) -> Vec<WindowHandle> {
        let windows = match self.list_visible_windows() {
            Ok(w) => w,
            Err(e) => {
                warn!("find_windows({}): {}", process_name, e);
                return Vec::new();
            }
        };
        let needle = title_filter.map(str::to_lowercase);
        windows
            .into_iter()
            .filter(|w| w.process_name.eq_ignore_ascii_case(process_name))
            .filter(|w| match &needle {
                Some(n) => w.window_title.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .map(|w| w.handle)
            .collect()
    }

    pub fn get_foreground_window(&self) -> Option<WindowHandle> {
        self.host.foreground_window().unwrap_or_else(|e| {
            warn!("foreground window query failed: {}", e);
            None
        })
    }

    /// Current placement of `handle` in persisted form.  `None` if the
    /// window has gone away.
    pub fn get_window_position(&self, handle: WindowHandle) -> Option<WindowPosition> {
        let windows = self.list_visible_windows().ok()?;
        windows
            .into_iter()
            .find(|w| w.handle == handle)
            .map(|w| w.to_position())
    }

    /// Move and resize a window.  Never fails loudly: returns `false` when
    /// the window is gone or the host refused.
    pub fn move_window(&self, handle: WindowHandle, rect: Rect) -> bool {
        match self.host.set_window_rect(handle, rect) {
            Ok(true) => true,
            Ok(false) => {
                debug!("move {}: window no longer exists", handle);
                false
            }
            Err(e) => {
                warn!("move {} failed: {}", handle, e);
                false
            }
        }
    }

    /// Set minimized/maximized/normal state.  Same contract as
    /// [`move_window`](Self::move_window).
    pub fn set_window_state(&self, handle: WindowHandle, state: WindowState) -> bool {
        match self.host.set_window_state(handle, state) {
            Ok(true) => true,
            Ok(false) => {
                debug!("set {:?} on {}: window no longer exists", state, handle);
                false
            }
            Err(e) => {
                warn!("set {:?} on {} failed: {}", state, handle, e);
                false
            }
        }
    }

    pub fn close_window(&self, handle: WindowHandle) -> bool {
        match self.host.close_window(handle) {
            Ok(closed) => closed,
            Err(e) => {
                warn!("close {} failed: {}", handle, e);
                false
            }
        }
    }

    pub fn launch(&self, path: &str, arguments: &str) -> Result<(), QueryError> {
        self.host
            .launch(path, arguments)
            .map_err(|e| QueryError::Launch {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn list_monitors(&self) -> Vec<Monitor> {
        self.host.monitors().unwrap_or_else(|e| {
            error!("monitor query failed: {}", e);
            Vec::new()
        })
    }

    /// The monitor nearest the window's current rectangle.
    ///
    /// Falls back to the first monitor when the window cannot be resolved.
    /// `None` only when the host reports no monitors.
    pub fn monitor_for_window(&self, handle: WindowHandle) -> Option<Monitor> {
        let monitors = self.list_monitors();
        let rect = match self.host.window_rect(handle) {
            Ok(Some(rect)) => Some(rect),
            Ok(None) => None,
            Err(e) => {
                debug!("rect of {} unavailable: {}", handle, e);
                None
            }
        };
        rect.and_then(|r| nearest_monitor(&monitors, r))
            .or_else(|| monitors.first())
            .cloned()
    }

    /// Snap `handle` to `zone` on the monitor it is on.
    pub fn snap_window(&self, handle: WindowHandle, zone: SnapZone) -> bool {
        let Some(monitor) = self.monitor_for_window(handle) else {
            warn!("snap {} to {}: no monitor information", handle, zone);
            return false;
        };
        let rect = compute_zone_rect(zone, monitor.work_area);
        debug!("snap {} to {} on {} -> {:?}", handle, zone, monitor.name, rect);
        self.move_window(handle, rect)
    }

    /// Snap whatever window currently has focus.
    pub fn snap_foreground(&self, zone: SnapZone) -> bool {
        match self.get_foreground_window() {
            Some(handle) => self.snap_window(handle, zone),
            None => {
                debug!("snap to {}: no foreground window", zone);
                false
            }
        }
    }
}

/// Monitor whose work area contains the centre of `rect`, otherwise the one
/// closest to it.
pub fn nearest_monitor(monitors: &[Monitor], rect: Rect) -> Option<&Monitor> {
    let (cx, cy) = rect.center();
    monitors
        .iter()
        .find(|m| m.work_area.contains(cx, cy))
        .or_else(|| monitors.iter().min_by_key(|m| m.work_area.distance_sq(cx, cy)))
}

//  Tests
