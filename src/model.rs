//! Data model shared by every part of hyprsnap.
//!
//! Types in this module fall into two groups:
//!
//! * **Transient** values produced by a single discovery pass
//!   ([`WindowHandle`], [`Monitor`], [`CapturedWindow`]).  They are only
//!   meaningful while the windows they describe exist.
//! * **Persisted** values ([`WindowPosition`], [`WindowLayout`],
//!   [`WindowRule`]) that identify a window by its `(process, title, path)`
//!   triple instead of a handle, so they survive restarts.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a live top-level window.
///
/// Wraps the raw host value (a Hyprland client address).  Compared by value,
/// never dereferenced, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// A rectangle in virtual-screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre point, rounded towards the origin.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether the point lies inside the rectangle (right/bottom edges
    /// exclusive).
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Squared distance from a point to the closest point of this rectangle.
    /// Zero when the point is inside.
    pub fn distance_sq(&self, px: i32, py: i32) -> i64 {
        let (px, py) = (i64::from(px), i64::from(py));
        let (left, top) = (i64::from(self.x), i64::from(self.y));
        let right = left + i64::from(self.width);
        let bottom = top + i64::from(self.height);
        let dx = (left - px).max(0).max(px - right);
        let dy = (top - py).max(0).max(py - bottom);
        dx * dx + dy * dy
    }
}

/// Run state of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

/// A monitor and the part of it available to windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    /// Position in the host's monitor list.  Only stable within one query
    /// pass.
    pub index: usize,
    /// Host name of the output (e.g. `"DP-1"`).
    pub name: String,
    /// Monitor rectangle minus reserved areas (bars, docks).
    pub work_area: Rect,
}

/// Snapshot of one live window, produced by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedWindow {
    pub handle: WindowHandle,
    pub process_name: String,
    pub window_title: String,
    pub application_path: String,
    pub monitor_index: usize,
    pub rect: Rect,
    pub state: WindowState,
}

impl CapturedWindow {
    /// Convert into the persisted, replayable form.
    pub fn to_position(&self) -> WindowPosition {
        WindowPosition {
            process_name: self.process_name.clone(),
            window_title: self.window_title.clone(),
            application_path: self.application_path.clone(),
            arguments: String::new(),
            rect: self.rect,
            monitor: self.monitor_index,
            state: self.state,
        }
    }
}

/// Persisted placement of one application window.
///
/// The rectangle is flattened into the JSON object, so a stored entry reads
/// `{"process_name": "foot", "x": 0, "y": 0, "width": 960, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPosition {
    pub process_name: String,
    pub window_title: String,
    pub application_path: String,
    pub arguments: String,
    #[serde(flatten)]
    pub rect: Rect,
    pub monitor: usize,
    pub state: WindowState,
}

/// Whether replaying a layout may start applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchBehavior {
    /// Always start a new instance, and also reposition existing ones.
    AlwaysLaunch,
    /// Start the application only when no matching window exists.
    #[default]
    LaunchIfNotRunning,
    /// Never start anything; only move windows that already exist.
    OnlyPosition,
}

/// A named, ordered set of window placements.
///
/// `windows` is replayed front to back; there is no other priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowLayout {
    pub name: String,
    pub icon: String,
    pub order: i32,
    pub show_label: bool,
    pub launch_behavior: LaunchBehavior,
    pub windows: Vec<WindowPosition>,
}

impl Default for WindowLayout {
    fn default() -> Self {
        Self {
            name: String::new(),
            icon: String::new(),
            order: 0,
            show_label: true,
            launch_behavior: LaunchBehavior::default(),
            windows: Vec::new(),
        }
    }
}

/// Named target area on a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SnapZone {
    LeftHalf,
    RightHalf,
    TopHalf,
    BottomHalf,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    Maximize,
}

impl SnapZone {
    /// Every zone, in presentation order.
    pub const ALL: [SnapZone; 10] = [
        SnapZone::LeftHalf,
        SnapZone::RightHalf,
        SnapZone::TopHalf,
        SnapZone::BottomHalf,
        SnapZone::TopLeft,
        SnapZone::TopRight,
        SnapZone::BottomLeft,
        SnapZone::BottomRight,
        SnapZone::Center,
        SnapZone::Maximize,
    ];

    /// Built-in presentation entries for every zone.
    pub fn definitions() -> Vec<SnapZoneDefinition> {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(order, &zone)| SnapZoneDefinition {
                name: zone.display_name().to_string(),
                icon: zone.icon().to_string(),
                zone,
                order: order as i32,
            })
            .collect()
    }

    fn display_name(self) -> &'static str {
        match self {
            SnapZone::LeftHalf => "Left Half",
            SnapZone::RightHalf => "Right Half",
            SnapZone::TopHalf => "Top Half",
            SnapZone::BottomHalf => "Bottom Half",
            SnapZone::TopLeft => "Top Left",
            SnapZone::TopRight => "Top Right",
            SnapZone::BottomLeft => "Bottom Left",
            SnapZone::BottomRight => "Bottom Right",
            SnapZone::Center => "Center",
            SnapZone::Maximize => "Maximize",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            SnapZone::LeftHalf => "▌",
            SnapZone::RightHalf => "▐",
            SnapZone::TopHalf => "▀",
            SnapZone::BottomHalf => "▄",
            SnapZone::TopLeft => "▘",
            SnapZone::TopRight => "▝",
            SnapZone::BottomLeft => "▖",
            SnapZone::BottomRight => "▗",
            SnapZone::Center => "▣",
            SnapZone::Maximize => "█",
        }
    }
}

impl fmt::Display for SnapZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Parse a zone name case-insensitively, ignoring separators
/// (`"left-half"`, `"LeftHalf"`, `"top_right"`).
pub fn parse_snap_zone(s: &str) -> Option<SnapZone> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "lefthalf" | "left" => Some(SnapZone::LeftHalf),
        "righthalf" | "right" => Some(SnapZone::RightHalf),
        "tophalf" | "top" => Some(SnapZone::TopHalf),
        "bottomhalf" | "bottom" => Some(SnapZone::BottomHalf),
        "topleft" => Some(SnapZone::TopLeft),
        "topright" => Some(SnapZone::TopRight),
        "bottomleft" => Some(SnapZone::BottomLeft),
        "bottomright" => Some(SnapZone::BottomRight),
        "center" | "centre" => Some(SnapZone::Center),
        "maximize" | "maximise" | "full" => Some(SnapZone::Maximize),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for SnapZone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_snap_zone(&s).ok_or_else(|| DeError::custom(format!("invalid snap zone: {:?}", s)))
    }
}

/// Presentation metadata for a [`SnapZone`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapZoneDefinition {
    pub name: String,
    pub icon: String,
    pub zone: SnapZone,
    pub order: i32,
}

/// What a matching [`WindowRule`] does to the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleAction {
    /// Move to [`WindowRule::custom_position`].
    #[default]
    Position,
    /// Snap to [`WindowRule::snap_zone`].
    SnapToZone,
    Minimize,
    Maximize,
    Close,
}

/// Process + optional title pattern, paired with an automatic action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowRule {
    pub name: String,
    pub process_name: String,
    /// Wildcard pattern (`*`, `?`) matched against the whole title.
    pub title_pattern: Option<String>,
    pub action: RuleAction,
    pub snap_zone: Option<SnapZone>,
    pub custom_position: Option<WindowPosition>,
    pub enabled: bool,
    pub order: i32,
}

impl Default for WindowRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            process_name: String::new(),
            title_pattern: None,
            action: RuleAction::default(),
            snap_zone: None,
            custom_position: None,
            enabled: true,
            order: 0,
        }
    }
}

//  Tests
