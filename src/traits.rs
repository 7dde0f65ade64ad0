//! Core traits that decouple hyprsnap from any specific compositor or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  The engine in [`query`](crate::query),
//! [`layout`](crate::layout) and [`rules`](crate::rules) only depends on
//! these abstractions.

use crate::command::Command;
use crate::model::{Monitor, Rect, WindowHandle, WindowState};
use std::sync::mpsc;

/// One visible top-level window as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostWindow {
    pub handle: WindowHandle,
    /// Id of the owning process.
    pub pid: u32,
    pub title: String,
    pub rect: Rect,
    pub state: WindowState,
}

/// Identity of a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Short executable name (e.g. `"firefox"`).
    pub name: String,
    /// Absolute path of the executable, empty if it could not be resolved.
    pub path: String,
}

/// Abstraction over the host windowing system.
///
/// This is a pure query/command surface with no engine state.  Methods that
/// address a window by handle return `Ok(None)` / `Ok(false)` when the
/// window no longer exists; `Err` is reserved for failures of the host
/// itself (IPC down, malformed reply, …).
///
/// Implementations must be shareable across threads: the rule monitor and
/// layout replay run on worker threads.  Any serialization the host requires
/// is the implementation's responsibility.
pub trait WindowHost: Send + Sync {
    /// The error type produced by this host.
    type Error: std::error::Error + Send + 'static;

    /// Enumerate visible top-level windows, in host stacking order.
    fn windows(&self) -> Result<Vec<HostWindow>, Self::Error>;

    /// Current rectangle of `handle`, or `None` if the window is gone.
    fn window_rect(&self, handle: WindowHandle) -> Result<Option<Rect>, Self::Error>;

    /// Move and resize `handle`.  Returns `false` if the window is gone.
    fn set_window_rect(&self, handle: WindowHandle, rect: Rect) -> Result<bool, Self::Error>;

    /// Change the run state of `handle`.  Returns `false` if the window is
    /// gone.
    fn set_window_state(&self, handle: WindowHandle, state: WindowState)
        -> Result<bool, Self::Error>;

    /// Ask `handle` to close.  Returns `false` if the window is gone.
    fn close_window(&self, handle: WindowHandle) -> Result<bool, Self::Error>;

    /// Monitors with their work areas, in host order.  The position in the
    /// returned list is the monitor index.
    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error>;

    /// The window that currently has keyboard focus, if any.
    fn foreground_window(&self) -> Result<Option<WindowHandle>, Self::Error>;

    /// Resolve `pid`, or `None` if the process has already exited.
    fn process_info(&self, pid: u32) -> Result<Option<ProcessInfo>, Self::Error>;

    /// Start `path` with a space-separated `arguments` string.
    fn launch(&self, path: &str, arguments: &str) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
