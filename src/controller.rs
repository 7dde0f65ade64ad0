//! The daemon's orchestrator.
//!
//! [`Controller`] owns the layout engine, the rule monitor and the stores,
//! and reacts to [`Command`]s coming from any
//! [`CommandSource`](crate::traits::CommandSource).

use crate::command::Command;
use crate::config::Config;
use crate::layout::{ApplyTask, LayoutEngine, LayoutError};
use crate::model::{WindowRule, WindowState};
use crate::query::WindowQuery;
use crate::rules::monitor::RuleMonitor;
use crate::store::{PositionStore, RuleStore, StoreError, Stores};
use crate::traits::WindowHost;
use log::{debug, info, warn};
use std::sync::Arc;

/// Possible errors from the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Dispatches commands to the layout engine, the rule monitor and the
/// position store.
///
/// At most one layout replay runs at a time; starting another cancels the
/// one in flight.
pub struct Controller<H: WindowHost + 'static> {
    query: Arc<WindowQuery<H>>,
    layouts: LayoutEngine<H>,
    monitor: RuleMonitor<H>,
    rule_store: RuleStore,
    positions: PositionStore,
    apply: Option<ApplyTask>,
}

impl<H: WindowHost + 'static> Controller<H> {
    /// Build a controller over `host`, loading layouts and rules from
    /// `stores`.  The rule monitor is created stopped.
    pub fn new(host: H, config: &Config, stores: Stores) -> Self {
        let query = Arc::new(WindowQuery::new(host));
        let layouts = LayoutEngine::new(Arc::clone(&query), config.launch, stores.layouts);
        let rules = stores.rules.load();
        info!("loaded {} layouts and {} rules", layouts.layouts().len(), rules.len());
        let monitor = RuleMonitor::new(Arc::clone(&query), rules, config.rules.tick_interval());
        Self {
            query,
            layouts,
            monitor,
            rule_store: stores.rules,
            positions: stores.positions,
            apply: None,
        }
    }

    pub fn query(&self) -> &WindowQuery<H> {
        &self.query
    }

    pub fn layouts(&self) -> &LayoutEngine<H> {
        &self.layouts
    }

    pub fn monitor(&self) -> &RuleMonitor<H> {
        &self.monitor
    }

    /// Name of the layout currently being replayed, if any.
    pub fn applying(&self) -> Option<&str> {
        self.apply
            .as_ref()
            .filter(|t| !t.is_finished())
            .map(|t| t.name())
    }

    /// Process a single command.
    pub fn handle(&mut self, cmd: Command) -> Result<(), ControllerError> {
        debug!("handling {:?}", cmd);
        self.reap_finished_apply();

        match cmd {
            Command::Snap(zone) => {
                if !self.query.snap_foreground(zone) {
                    warn!("snap to {} did not move any window", zone);
                }
            }
            Command::CaptureLayout => {
                let order = self.layouts.layouts().len() as i32;
                let layout = self.layouts.capture_layout(order)?;
                info!("saved layout '{}'", layout.name);
                self.layouts.add_layout(layout);
                self.layouts.save()?;
            }
            Command::ApplyLayout(name) => {
                self.cancel_apply();
                let task = self.layouts.spawn_apply(&name)?;
                info!("replaying layout '{}'", task.name());
                self.apply = Some(task);
            }
            Command::CancelLayout => {
                if !self.cancel_apply() {
                    debug!("no layout replay to cancel");
                }
            }
            Command::DeleteLayout(name) => {
                let removed = self
                    .layouts
                    .remove_layout(&name)
                    .ok_or(LayoutError::UnknownLayout(name))?;
                info!("deleted layout '{}'", removed.name);
                self.layouts.save()?;
            }
            Command::ReloadLayouts => {
                self.layouts.reload();
                info!("reloaded {} layouts", self.layouts.layouts().len());
            }
            Command::StartRules => {
                if !self.monitor.start() {
                    debug!("rule monitor already running");
                }
            }
            Command::StopRules => {
                if !self.monitor.stop() {
                    debug!("rule monitor already stopped");
                }
            }
            Command::ReloadRules => {
                let rules = self.rule_store.load();
                info!("reloaded {} rules", rules.len());
                self.monitor.set_rules(rules);
            }
            Command::SavePosition(process) => self.save_position(&process)?,
            Command::RestorePosition(process) => self.restore_position(&process),
        }
        Ok(())
    }

    /// Persist `rules`, then hand them to the monitor.
    pub fn save_rules(&mut self, rules: Vec<WindowRule>) -> Result<(), ControllerError> {
        self.rule_store.save(&rules)?;
        self.monitor.set_rules(rules);
        Ok(())
    }

    /// Cancel any replay and stop the rule monitor.
    pub fn shutdown(&mut self) {
        self.cancel_apply();
        self.monitor.stop();
        info!("controller shut down");
    }

    fn save_position(&self, process: &str) -> Result<(), ControllerError> {
        let Some(position) = self
            .query
            .find_windows(process, None)
            .into_iter()
            .find_map(|h| self.query.get_window_position(h))
        else {
            warn!("no window of '{}' to save", process);
            return Ok(());
        };
        info!("saving position of '{}': {:?}", process, position.rect);
        self.positions.upsert(position)?;
        Ok(())
    }

    fn restore_position(&self, process: &str) {
        let Some(position) = self.positions.find(process) else {
            warn!("no saved position for '{}'", process);
            return;
        };
        let Some(handle) = self.query.find_windows(process, None).into_iter().next() else {
            warn!("no window of '{}' to restore", process);
            return;
        };
        if self.query.move_window(handle, position.rect) && position.state != WindowState::Normal {
            self.query.set_window_state(handle, position.state);
        }
    }

    /// Cancel and join the running replay.  Returns whether one existed.
    fn cancel_apply(&mut self) -> bool {
        let Some(task) = self.apply.take() else {
            return false;
        };
        task.cancel();
        let name = task.name().to_string();
        let report = task.join();
        info!("layout '{}' stopped: {:?}", name, report);
        true
    }

    fn reap_finished_apply(&mut self) {
        if self.apply.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.apply.take() {
                let name = task.name().to_string();
                debug!("layout '{}' finished: {:?}", name, task.join());
            }
        }
    }
}

impl<H: WindowHost + 'static> Drop for Controller<H> {
    fn drop(&mut self) {
        self.cancel_apply();
    }
}
