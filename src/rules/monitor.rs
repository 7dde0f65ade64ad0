//! Background rule monitor.
//!
//! [`RuleMonitor`] periodically scans for titled windows it has not handled
//! yet, finds the first matching rule for each and applies that rule's
//! action once.  The set of handled windows lives as long as the monitor
//! session: [`stop`](RuleMonitor::stop) clears it, so a restart evaluates
//! every window again.
//!
//! # Threading
//!
//! While running, one worker thread drives [`tick`](RuleMonitor::tick) at a
//! fixed interval.  Ticks never overlap: the worker runs them back to back,
//! and a tick started from elsewhere while one is in progress is skipped.
//! The rule collection and the handled set share one mutex, so a rule edit
//! never observes a half-finished tick.

use crate::model::{RuleAction, WindowHandle, WindowRule, WindowState};
use crate::query::WindowQuery;
use crate::rules::matcher::RuleMatcher;
use crate::traits::WindowHost;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

/// Rules plus the windows already handled in this session.
#[derive(Debug, Default)]
struct MonitorState {
    rules: Vec<WindowRule>,
    processed: HashSet<WindowHandle>,
}

/// What one tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Another tick was still running, nothing was done.
    pub skipped: bool,
    /// Windows seen for the first time in this session.
    pub examined: usize,
    /// `(window, rule name)` for every rule applied.
    pub applied: Vec<(WindowHandle, String)>,
}

struct Shared<H: WindowHost> {
    query: Arc<WindowQuery<H>>,
    matcher: RuleMatcher,
    state: Mutex<MonitorState>,
    tick_guard: Mutex<()>,
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Polling rule engine.  Starts stopped.
pub struct RuleMonitor<H: WindowHost + 'static> {
    shared: Arc<Shared<H>>,
    interval: Duration,
    worker: Option<Worker>,
}

impl<H: WindowHost + 'static> RuleMonitor<H> {
    pub fn new(query: Arc<WindowQuery<H>>, rules: Vec<WindowRule>, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                query,
                matcher: RuleMatcher::new(),
                state: Mutex::new(MonitorState {
                    rules,
                    processed: HashSet::new(),
                }),
                tick_guard: Mutex::new(()),
            }),
            interval,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Start the worker.  Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.worker.is_some() {
            debug!("rule monitor already running");
            return false;
        }
        info!("starting window rule monitoring every {:?}", self.interval);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    shared.tick();
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        self.worker = Some(Worker { stop_tx, handle });
        true
    }

    /// Stop the worker and forget every handled window.  Returns `false` if
    /// it was not running.
    pub fn stop(&mut self) -> bool {
        let Some(worker) = self.worker.take() else {
            return false;
        };
        info!("stopping window rule monitoring");
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            error!("rule monitor worker panicked");
        }
        self.shared.lock_state().processed.clear();
        true
    }

    /// Run one scan now.  Skipped if a scan is already in progress.
    pub fn tick(&self) -> TickOutcome {
        self.shared.tick()
    }

    /// Replace the rule collection.  Windows already handled stay handled.
    pub fn set_rules(&self, rules: Vec<WindowRule>) {
        let mut state = self.shared.lock_state();
        info!("rule monitor now has {} rules", rules.len());
        state.rules = rules;
    }

    /// Snapshot of the current rules.
    pub fn rules(&self) -> Vec<WindowRule> {
        self.shared.lock_state().rules.clone()
    }

    /// Number of windows handled in this session.
    pub fn processed_count(&self) -> usize {
        self.shared.lock_state().processed.len()
    }
}

impl<H: WindowHost + 'static> Drop for RuleMonitor<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<H: WindowHost> Shared<H> {
    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tick(&self) -> TickOutcome {
        let Ok(_guard) = self.tick_guard.try_lock() else {
            debug!("previous rule tick still running, skipping");
            return TickOutcome {
                skipped: true,
                ..Default::default()
            };
        };

        let windows = match self.query.list_visible_windows() {
            Ok(w) => w,
            Err(e) => {
                error!("error checking windows for rules: {}", e);
                return TickOutcome::default();
            }
        };

        let (rules, fresh) = {
            let state = self.lock_state();
            let fresh: Vec<_> = windows
                .into_iter()
                .filter(|w| !state.processed.contains(&w.handle))
                .collect();
            (state.rules.clone(), fresh)
        };

        let mut outcome = TickOutcome {
            examined: fresh.len(),
            ..Default::default()
        };
        for window in fresh {
            let Some(rule) = self
                .matcher
                .first_match(&window.process_name, &window.window_title, &rules)
            else {
                continue;
            };
            info!(
                "applying rule '{}' to {} ({})",
                rule.name, window.handle, window.process_name
            );
            if !self.apply(window.handle, rule) {
                warn!("rule '{}' could not be applied to {}", rule.name, window.handle);
            }
            self.lock_state().processed.insert(window.handle);
            outcome.applied.push((window.handle, rule.name.clone()));
        }
        outcome
    }

    fn apply(&self, handle: WindowHandle, rule: &WindowRule) -> bool {
        let query = &self.query;
        match rule.action {
            RuleAction::Position => match &rule.custom_position {
                Some(pos) => query.move_window(handle, pos.rect),
                None => {
                    warn!("rule '{}' has no custom position", rule.name);
                    false
                }
            },
            // Acts on the focused window and its monitor, not necessarily the
            // window that matched.
            RuleAction::SnapToZone => match rule.snap_zone {
                Some(zone) => query.snap_foreground(zone),
                None => {
                    warn!("rule '{}' has no snap zone", rule.name);
                    false
                }
            },
            RuleAction::Maximize => query.set_window_state(handle, WindowState::Maximized),
            RuleAction::Minimize => query.set_window_state(handle, WindowState::Minimized),
            RuleAction::Close => query.close_window(handle),
        }
    }
}

//  Tests
