//! [`WindowHost`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! Process details come from `/proc`.
//!
//! Hyprland has no native "minimized" state; a minimized window is one
//! parked on the `special:minimized` workspace.  "Maximized" maps to
//! fullscreen mode 1, which keeps gaps and bars.

use crate::model::{Monitor, Rect, WindowHandle, WindowState};
use crate::traits::{HostWindow, ProcessInfo, WindowHost};
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Workspace minimized windows are moved to.
pub const MINIMIZED_WORKSPACE: &str = "special:minimized";

/// Hyprland-backed window host.
///
/// Every trait method runs its whole IPC exchange under one lock, so
/// multi-step operations (float, resize, move) from different threads
/// never interleave.
#[derive(Debug, Default)]
pub struct HyprlandHost {
    ipc: Mutex<()>,
}

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandHostError(String);

impl HyprlandHost {
    /// No connection is opened eagerly; each call opens short-lived IPC
    /// requests.
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self) -> MutexGuard<'_, ()> {
        self.ipc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//  Direct Hyprland IPC helpers

fn socket_path() -> Result<PathBuf, HyprlandHostError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandHostError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandHostError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!("{}/hypr/{}/.socket.sock", runtime_dir, his)))
}

fn ipc_request(command: &str) -> Result<String, HyprlandHostError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandHostError(format!("connect to {}: {}", path.display(), e)))?;
    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandHostError(format!("write: {}", e)))?;
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandHostError(format!("read: {}", e)))?;
    String::from_utf8(response).map_err(|e| HyprlandHostError(format!("utf-8: {}", e)))
}

/// Send `j/<command>` and decode the JSON answer.
fn ipc_json<T: serde::de::DeserializeOwned>(data_command: &str) -> Result<T, HyprlandHostError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json)
        .map_err(|e| HyprlandHostError(format!("parse {}: {}", data_command, e)))
}

fn ipc_dispatch(args: &str) -> Result<(), HyprlandHostError> {
    debug!("dispatch {}", args);
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandHostError(format!("dispatch {}: {}", args, response.trim())))
    }
}

//  Minimal serde structs for the JSON we care about

#[derive(Debug, Deserialize)]
struct WorkspaceRef {
    id: i64,
    #[serde(default)]
    name: String,
}

/// `fullscreen` is a bool on older Hyprland and a mode number since 0.41.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Fullscreen {
    Flag(bool),
    Mode(i64),
}

impl Default for Fullscreen {
    fn default() -> Self {
        Fullscreen::Flag(false)
    }
}

impl Fullscreen {
    fn is_on(&self) -> bool {
        match *self {
            Fullscreen::Flag(on) => on,
            Fullscreen::Mode(mode) => mode != 0,
        }
    }
}

fn yes() -> bool {
    true
}

/// Subset of an object returned by `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    at: [i32; 2],
    size: [i32; 2],
    workspace: WorkspaceRef,
    pid: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    fullscreen: Fullscreen,
}

impl ClientJson {
    fn state(&self) -> WindowState {
        if self.workspace.name == MINIMIZED_WORKSPACE {
            WindowState::Minimized
        } else if self.fullscreen.is_on() {
            WindowState::Maximized
        } else {
            WindowState::Normal
        }
    }

    fn into_host_window(self) -> Option<HostWindow> {
        if !self.mapped || self.hidden || self.pid <= 0 {
            return None;
        }
        let handle = parse_address(&self.address)?;
        let state = self.state();
        Some(HostWindow {
            handle,
            pid: u32::try_from(self.pid).ok()?,
            title: self.title,
            rect: Rect::new(self.at[0], self.at[1], self.size[0], self.size[1]),
            state,
        })
    }
}

fn one() -> f64 {
    1.0
}

/// Subset of an object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    id: i64,
    name: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "one")]
    scale: f64,
    #[serde(default)]
    transform: i64,
    /// Left, top, right, bottom space claimed by layer-shell bars.
    #[serde(default)]
    reserved: [i32; 4],
}

impl MonitorJson {
    /// Logical area minus reserved edges, in global layout coordinates.
    fn work_area(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let mut w = (f64::from(self.width) / scale).round() as i32;
        let mut h = (f64::from(self.height) / scale).round() as i32;
        // Transforms 1, 3, 5 and 7 rotate by 90 or 270 degrees.
        if self.transform % 2 == 1 {
            std::mem::swap(&mut w, &mut h);
        }
        let [left, top, right, bottom] = self.reserved;
        Rect::new(
            self.x + left,
            self.y + top,
            (w - left - right).max(0),
            (h - top - bottom).max(0),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ActiveWindowJson {
    address: String,
}

/// `0x55d0c0a1b2c0` → handle.
fn parse_address(address: &str) -> Option<WindowHandle> {
    let hex = address.trim().trim_start_matches("0x");
    u64::from_str_radix(hex, 16).ok().map(WindowHandle)
}

fn target(handle: WindowHandle) -> String {
    format!("address:{}", handle)
}

/// The `exec` argument for launching `path` with `arguments`.  Hyprland
/// hands the line to a shell, so a path with whitespace is quoted.
fn exec_line(path: &str, arguments: &str) -> String {
    let program = if path.chars().any(char::is_whitespace) {
        format!("'{}'", path.replace('\'', r"'\''"))
    } else {
        path.to_string()
    };
    let arguments = arguments.trim();
    if arguments.is_empty() {
        program
    } else {
        format!("{} {}", program, arguments)
    }
}

/// `comm` length at which the kernel has cut the name.
const COMM_MAX: usize = 15;

/// The process name behind `comm`.  A truncated `comm` is completed from
/// the executable's file name or, failing that, argv[0]; a short one is
/// used as is, since it also names shebang scripts correctly.
fn process_name(exe: Option<&Path>, cmdline: Option<&[u8]>, comm: &str) -> String {
    let comm = comm.trim();
    if comm.len() < COMM_MAX {
        return comm.to_string();
    }
    let exe_name = exe
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().trim_end_matches(" (deleted)").to_string());
    let argv0_name = cmdline
        .and_then(|c| c.split(|&b| b == 0).next())
        .map(String::from_utf8_lossy)
        .and_then(|a| {
            let program = a.split_whitespace().next()?;
            Path::new(program)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });
    [exe_name, argv0_name]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.starts_with(comm))
        .unwrap_or_else(|| comm.to_string())
}

fn clients() -> Result<Vec<ClientJson>, HyprlandHostError> {
    ipc_json("clients")
}

fn find_client(handle: WindowHandle) -> Result<Option<ClientJson>, HyprlandHostError> {
    Ok(clients()?
        .into_iter()
        .find(|c| parse_address(&c.address) == Some(handle)))
}

//  WindowHost implementation

impl WindowHost for HyprlandHost {
    type Error = HyprlandHostError;

    fn windows(&self) -> Result<Vec<HostWindow>, Self::Error> {
        let _session = self.session();
        Ok(clients()?
            .into_iter()
            .filter_map(ClientJson::into_host_window)
            .collect())
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Option<Rect>, Self::Error> {
        let _session = self.session();
        Ok(find_client(handle)?.map(|c| Rect::new(c.at[0], c.at[1], c.size[0], c.size[1])))
    }

    fn set_window_rect(&self, handle: WindowHandle, rect: Rect) -> Result<bool, Self::Error> {
        let _session = self.session();
        if find_client(handle)?.is_none() {
            return Ok(false);
        }
        let t = target(handle);
        // Tiled windows ignore pixel geometry.
        ipc_dispatch(&format!("setfloating {}", t))?;
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},{}",
            rect.width, rect.height, t
        ))?;
        ipc_dispatch(&format!("movewindowpixel exact {} {},{}", rect.x, rect.y, t))?;
        Ok(true)
    }

    fn set_window_state(&self, handle: WindowHandle, state: WindowState) -> Result<bool, Self::Error> {
        let _session = self.session();
        let Some(client) = find_client(handle)? else {
            return Ok(false);
        };
        let current = client.state();
        if current == state {
            return Ok(true);
        }
        let t = target(handle);

        if current == WindowState::Minimized {
            let active: WorkspaceRef = ipc_json("activeworkspace")?;
            ipc_dispatch(&format!("movetoworkspacesilent {},{}", active.id, t))?;
        }
        match state {
            WindowState::Minimized => {
                ipc_dispatch(&format!("movetoworkspacesilent {},{}", MINIMIZED_WORKSPACE, t))?;
            }
            // `fullscreen 1` toggles the focused window.
            WindowState::Maximized if !client.fullscreen.is_on() => {
                ipc_dispatch(&format!("focuswindow {}", t))?;
                ipc_dispatch("fullscreen 1")?;
            }
            WindowState::Normal if client.fullscreen.is_on() => {
                ipc_dispatch(&format!("focuswindow {}", t))?;
                ipc_dispatch("fullscreen 1")?;
            }
            _ => {}
        }
        Ok(true)
    }

    fn close_window(&self, handle: WindowHandle) -> Result<bool, Self::Error> {
        let _session = self.session();
        if find_client(handle)?.is_none() {
            return Ok(false);
        }
        ipc_dispatch(&format!("closewindow {}", target(handle)))?;
        Ok(true)
    }

    fn monitors(&self) -> Result<Vec<Monitor>, Self::Error> {
        let _session = self.session();
        let mut monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        monitors.sort_by_key(|m| m.id);
        Ok(monitors
            .iter()
            .enumerate()
            .map(|(index, m)| Monitor {
                index,
                name: m.name.clone(),
                work_area: m.work_area(),
            })
            .collect())
    }

    fn foreground_window(&self) -> Result<Option<WindowHandle>, Self::Error> {
        let _session = self.session();
        let json = ipc_request("j/activewindow")?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if json.trim() == "{}" {
            return Ok(None);
        }
        let w: ActiveWindowJson = serde_json::from_str(&json)
            .map_err(|e| HyprlandHostError(format!("parse activewindow: {}", e)))?;
        Ok(parse_address(&w.address))
    }

    fn process_info(&self, pid: u32) -> Result<Option<ProcessInfo>, Self::Error> {
        let proc_dir = PathBuf::from(format!("/proc/{}", pid));
        let comm = match std::fs::read_to_string(proc_dir.join("comm")) {
            Ok(comm) => comm,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HyprlandHostError(format!("read comm of {}: {}", pid, e))),
        };
        // The executable link is unreadable for other users' processes.
        let exe = std::fs::read_link(proc_dir.join("exe")).ok();
        let cmdline = std::fs::read(proc_dir.join("cmdline")).ok();
        let name = process_name(exe.as_deref(), cmdline.as_deref(), &comm);
        let path = exe
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Some(ProcessInfo { name, path }))
    }

    fn launch(&self, path: &str, arguments: &str) -> Result<(), Self::Error> {
        // `exec` succeeds even for a missing binary, so check what we can.
        if Path::new(path).is_absolute() && !Path::new(path).exists() {
            return Err(HyprlandHostError(format!("{} does not exist", path)));
        }
        let _session = self.session();
        ipc_dispatch(&format!("exec {}", exec_line(path, arguments)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENTS: &str = r#"[
        {
            "address": "0x55d0c0a1b2c0", "mapped": true, "hidden": false,
            "at": [10, 40], "size": [940, 1030],
            "workspace": { "id": 1, "name": "1" },
            "floating": false, "pid": 4242, "class": "foot", "title": "shell",
            "fullscreen": 0
        },
        {
            "address": "0x55d0c0a1c000", "mapped": true, "hidden": false,
            "at": [0, 0], "size": [800, 600],
            "workspace": { "id": -98, "name": "special:minimized" },
            "pid": 4243, "title": "parked", "fullscreen": false
        },
        {
            "address": "0x55d0c0a1d000", "mapped": true, "hidden": false,
            "at": [0, 0], "size": [1920, 1080],
            "workspace": { "id": 2, "name": "2" },
            "pid": 4244, "title": "video", "fullscreen": 1
        },
        {
            "address": "0x55d0c0a1e000", "mapped": false, "hidden": false,
            "at": [0, 0], "size": [0, 0],
            "workspace": { "id": -1, "name": "" },
            "pid": -1, "title": ""
        }
    ]"#;

    fn parsed() -> Vec<HostWindow> {
        let clients: Vec<ClientJson> = serde_json::from_str(CLIENTS).unwrap();
        clients
            .into_iter()
            .filter_map(ClientJson::into_host_window)
            .collect()
    }

    #[test]
    fn clients_map_to_host_windows() {
        let windows = parsed();
        assert_eq!(windows.len(), 3, "unmapped clients are dropped");
        assert_eq!(windows[0].handle, WindowHandle(0x55d0c0a1b2c0));
        assert_eq!(windows[0].pid, 4242);
        assert_eq!(windows[0].rect, Rect::new(10, 40, 940, 1030));
    }

    #[test]
    fn client_states() {
        let states: Vec<WindowState> = parsed().iter().map(|w| w.state).collect();
        assert_eq!(
            states,
            vec![WindowState::Normal, WindowState::Minimized, WindowState::Maximized]
        );
    }

    #[test]
    fn work_area_subtracts_reserved_edges() {
        let json = r#"{ "id": 0, "name": "DP-1", "width": 1920, "height": 1080,
                        "x": 0, "y": 0, "scale": 1.0, "transform": 0,
                        "reserved": [0, 30, 0, 0] }"#;
        let m: MonitorJson = serde_json::from_str(json).unwrap();
        assert_eq!(m.work_area(), Rect::new(0, 30, 1920, 1050));
    }

    #[test]
    fn work_area_uses_logical_size() {
        let json = r#"{ "id": 1, "name": "eDP-1", "width": 2880, "height": 1800,
                        "x": 1920, "y": 0, "scale": 2.0, "transform": 1 }"#;
        let m: MonitorJson = serde_json::from_str(json).unwrap();
        assert_eq!(m.work_area(), Rect::new(1920, 0, 900, 1440));
    }

    #[test]
    fn address_parsing() {
        assert_eq!(parse_address("0x1a2b"), Some(WindowHandle(0x1a2b)));
        assert_eq!(parse_address("ff"), Some(WindowHandle(0xff)));
        assert_eq!(parse_address("0xnothex"), None);
        assert_eq!(target(WindowHandle(0x1a2b)), "address:0x1a2b");
    }

    #[test]
    fn exec_line_quotes_paths_with_spaces() {
        assert_eq!(exec_line("/usr/bin/foot", ""), "/usr/bin/foot");
        assert_eq!(exec_line("/usr/bin/foot", " -e htop "), "/usr/bin/foot -e htop");
        assert_eq!(
            exec_line("/opt/My App/run", "--x"),
            "'/opt/My App/run' --x"
        );
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let host = HyprlandHost::new();
        assert!(host.launch("/definitely/not/here/app", "").is_err());
    }

    #[test]
    fn truncated_comm_is_completed() {
        let exe = Path::new("/usr/bin/gnome-text-editor");
        assert_eq!(
            process_name(Some(exe), None, "gnome-text-edit\n"),
            "gnome-text-editor"
        );
        let cmdline = b"/opt/app/very-long-launcher-name\0--flag\0";
        assert_eq!(
            process_name(Some(Path::new("/usr/bin/python3")), Some(cmdline), "very-long-launc"),
            "very-long-launcher-name"
        );
        assert_eq!(
            process_name(Some(Path::new("/opt/x/tool-renamed-build (deleted)")), None, "tool-renamed-bu"),
            "tool-renamed-build"
        );
    }

    #[test]
    fn short_comm_wins_over_interpreter() {
        let exe = Path::new("/usr/bin/python3.12");
        assert_eq!(process_name(Some(exe), None, "backup.py\n"), "backup.py");
        assert_eq!(process_name(None, None, "foot"), "foot");
        // Nothing completes it, keep what the kernel gave.
        assert_eq!(process_name(None, None, "abcdefghijklmno"), "abcdefghijklmno");
    }

    #[test]
    fn long_executable_name_is_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("gnome-text-editor-long");
        std::fs::copy("/bin/sleep", &exe).unwrap();
        // A fresh copy can briefly be "text file busy".
        let mut child = (0..20)
            .find_map(|_| match std::process::Command::new(&exe).arg("5").spawn() {
                Ok(child) => Some(child),
                Err(_) => {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    None
                }
            })
            .expect("spawn copied sleep");

        let info = HyprlandHost::new().process_info(child.id()).unwrap();
        let _ = child.kill();
        let _ = child.wait();

        let info = info.unwrap();
        assert_eq!(info.name, "gnome-text-editor-long");
        assert!(info.path.ends_with("gnome-text-editor-long"));
    }

    #[test]
    fn own_process_is_resolvable() {
        let host = HyprlandHost::new();
        let info = host.process_info(std::process::id()).unwrap().unwrap();
        assert!(!info.name.is_empty());
    }
}
