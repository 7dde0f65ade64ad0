//! Commands accepted by the hyprsnap daemon.
//!
//! [`Command`] is the vocabulary shared by every
//! [`CommandSource`](crate::traits::CommandSource) and the
//! [`Controller`](crate::controller::Controller).  On the wire each command
//! is one line of externally tagged JSON:
//!
//! ```json
//! {"Snap":"LeftHalf"}
//! "CaptureLayout"
//! {"ApplyLayout":"Work"}
//! "StopRules"
//! ```

use crate::model::SnapZone;
use serde::{Deserialize, Serialize};

/// Every action the daemon can perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Snap the focused window to a zone of the monitor it is on.
    ///
    /// Zone names are parsed loosely: `"left-half"`, `"LeftHalf"` and
    /// `"left"` are all accepted.
    Snap(SnapZone),

    /// Capture every titled window into a new layout and persist it.
    CaptureLayout,

    /// Replay the layout with the given name (case-insensitive).
    ///
    /// Replay runs on a worker thread; a replay already in flight is
    /// cancelled first.
    ApplyLayout(String),

    /// Cancel the layout replay in flight, if any.
    CancelLayout,

    /// Remove a layout by name and persist the collection.
    DeleteLayout(String),

    /// Re-read `layouts.json`.
    ReloadLayouts,

    /// Start the rule monitor.  No-op when already running.
    StartRules,

    /// Stop the rule monitor and forget which windows were handled.
    StopRules,

    /// Re-read `window_rules.json` into the running monitor.
    ReloadRules,

    /// Record the current placement of the first window of a process in
    /// `positions.json`.
    SavePosition(String),

    /// Move the first window of a process back to its recorded placement.
    RestorePosition(String),
}
