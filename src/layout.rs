//! Layout capture and replay.
//!
//! [`LayoutEngine`] owns the in-memory layout collection.  It can snapshot
//! the desktop into a new [`WindowLayout`] and replay a layout, starting
//! applications where the layout's [`LaunchBehavior`] allows it.
//!
//! Replay may block for a while when it has to wait for launched windows, so
//! the daemon runs it on a worker thread via
//! [`spawn_apply`](LayoutEngine::spawn_apply) and can cancel it through the
//! returned [`ApplyTask`].

use crate::config::LaunchConfig;
use crate::model::{LaunchBehavior, WindowHandle, WindowLayout, WindowPosition, WindowState};
use crate::query::{QueryError, WindowQuery};
use crate::store::{LayoutStore, StoreError};
use crate::traits::WindowHost;
use chrono::Local;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Icon given to captured layouts.
pub const DEFAULT_LAYOUT_ICON: &str = "▦";

/// Possible errors from the layout engine.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// No titled window exists.
    #[error("nothing to capture: no titled windows are open")]
    NothingToCapture,
    #[error("no layout named {0:?}")]
    UnknownLayout(String),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cooperative cancellation flag shared between a replay and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Applications started.
    pub launched: usize,
    /// Windows moved to their stored rectangle.
    pub positioned: usize,
    /// Entries for which no window could be found.
    pub skipped: usize,
    /// The replay stopped early because it was cancelled.
    pub cancelled: bool,
}

/// A replay running on a worker thread.
pub struct ApplyTask {
    name: String,
    token: CancelToken,
    handle: JoinHandle<ApplyReport>,
}

impl ApplyTask {
    /// Name of the layout being replayed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the replay to stop before its next entry or poll.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the replay to end.
    pub fn join(self) -> ApplyReport {
        self.handle.join().unwrap_or_else(|_| {
            error!("layout replay '{}' panicked", self.name);
            ApplyReport::default()
        })
    }
}

/// Capture/replay engine plus the layout collection.
pub struct LayoutEngine<H: WindowHost> {
    query: Arc<WindowQuery<H>>,
    launch: LaunchConfig,
    store: LayoutStore,
    layouts: Vec<WindowLayout>,
}

impl<H: WindowHost> LayoutEngine<H> {
    /// Create an engine and load the stored layouts.
    pub fn new(query: Arc<WindowQuery<H>>, launch: LaunchConfig, store: LayoutStore) -> Self {
        let layouts = store.load();
        Self {
            query,
            launch,
            store,
            layouts,
        }
    }

    pub fn layouts(&self) -> &[WindowLayout] {
        &self.layouts
    }

    /// Case-insensitive lookup.
    pub fn layout_by_name(&self, name: &str) -> Option<&WindowLayout> {
        self.layouts
            .iter()
            .find(|l| l.name.to_lowercase() == name.to_lowercase())
    }

    pub fn add_layout(&mut self, layout: WindowLayout) {
        self.layouts.push(layout);
    }

    /// Remove the first layout with this name (case-insensitive).
    pub fn remove_layout(&mut self, name: &str) -> Option<WindowLayout> {
        let lower = name.to_lowercase();
        let idx = self
            .layouts
            .iter()
            .position(|l| l.name.to_lowercase() == lower)?;
        Some(self.layouts.remove(idx))
    }

    /// Replace the collection with what is on disk.
    pub fn reload(&mut self) {
        self.layouts = self.store.load();
    }

    /// Persist the collection.
    pub fn save(&self) -> Result<(), StoreError> {
        self.store.save(&self.layouts)
    }

    /// Snapshot every titled window into a new, position-only layout.
    pub fn capture_layout(&self, default_order: i32) -> Result<WindowLayout, LayoutError> {
        let windows: Vec<WindowPosition> = self
            .query
            .list_visible_windows()?
            .iter()
            .filter(|w| !w.window_title.trim().is_empty())
            .map(|w| w.to_position())
            .collect();
        if windows.is_empty() {
            return Err(LayoutError::NothingToCapture);
        }
        let name = format!("Layout {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        info!("captured {} windows into '{}'", windows.len(), name);
        Ok(WindowLayout {
            name,
            icon: DEFAULT_LAYOUT_ICON.to_string(),
            order: default_order,
            show_label: true,
            launch_behavior: LaunchBehavior::OnlyPosition,
            windows,
        })
    }

    /// Replay `layout` on the calling thread.
    pub fn apply_layout(&self, layout: &WindowLayout, cancel: &CancelToken) -> ApplyReport {
        replay(&self.query, &self.launch, layout, cancel)
    }

    /// Replay the named layout on a worker thread.
    pub fn spawn_apply(&self, name: &str) -> Result<ApplyTask, LayoutError>
    where
        H: 'static,
    {
        let layout = self
            .layout_by_name(name)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownLayout(name.to_string()))?;
        let token = CancelToken::new();
        let worker_token = token.clone();
        let query = Arc::clone(&self.query);
        let launch = self.launch;
        let name = layout.name.clone();
        let handle = std::thread::spawn(move || replay(&query, &launch, &layout, &worker_token));
        Ok(ApplyTask {
            name,
            token,
            handle,
        })
    }
}

fn replay<H: WindowHost>(
    query: &WindowQuery<H>,
    launch: &LaunchConfig,
    layout: &WindowLayout,
    cancel: &CancelToken,
) -> ApplyReport {
    info!(
        "applying layout '{}' ({} windows, {:?})",
        layout.name,
        layout.windows.len(),
        layout.launch_behavior
    );
    let mut report = ApplyReport::default();

    for entry in &layout.windows {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        let title = Some(entry.window_title.as_str()).filter(|t| !t.is_empty());
        let mut handles = query.find_windows(&entry.process_name, title);

        let should_launch = match layout.launch_behavior {
            LaunchBehavior::AlwaysLaunch => true,
            LaunchBehavior::LaunchIfNotRunning => handles.is_empty(),
            LaunchBehavior::OnlyPosition => false,
        };
        if should_launch {
            if entry.application_path.is_empty() {
                warn!("'{}' has no application path, cannot launch", entry.process_name);
            } else {
                match query.launch(&entry.application_path, &entry.arguments) {
                    Ok(()) => {
                        report.launched += 1;
                        let appeared = wait_for_new_windows(query, launch, entry, title, &handles, cancel);
                        handles.extend(appeared);
                    }
                    Err(e) => error!("{}", e),
                }
            }
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
        }

        if handles.is_empty() {
            info!("no window for '{}', skipping", entry.process_name);
            report.skipped += 1;
            continue;
        }
        for handle in handles {
            if query.move_window(handle, entry.rect) {
                report.positioned += 1;
                if entry.state != WindowState::Normal {
                    query.set_window_state(handle, entry.state);
                }
            }
        }
    }

    if report.cancelled {
        info!("layout '{}' cancelled", layout.name);
    } else {
        info!(
            "layout '{}' applied: {} positioned, {} launched, {} skipped",
            layout.name, report.positioned, report.launched, report.skipped
        );
    }
    report
}

/// Poll until a matching window not in `existing` shows up, at most
/// `launch.max_attempts` times.
fn wait_for_new_windows<H: WindowHost>(
    query: &WindowQuery<H>,
    launch: &LaunchConfig,
    entry: &WindowPosition,
    title: Option<&str>,
    existing: &[WindowHandle],
    cancel: &CancelToken,
) -> Vec<WindowHandle> {
    for attempt in 1..=launch.max_attempts {
        if cancel.is_cancelled() {
            return Vec::new();
        }
        let appeared: Vec<WindowHandle> = query
            .find_windows(&entry.process_name, title)
            .into_iter()
            .filter(|h| !existing.contains(h))
            .collect();
        if !appeared.is_empty() {
            debug!(
                "'{}' appeared after {} attempt(s)",
                entry.process_name, attempt
            );
            return appeared;
        }
        if attempt < launch.max_attempts {
            std::thread::sleep(launch.poll_interval());
        }
    }
    warn!(
        "gave up waiting for '{}' after {} attempts",
        entry.process_name, launch.max_attempts
    );
    Vec::new()
}

//  Tests
