//! Entry point for the **hyprsnap** daemon.
//!
//! Spawns the Unix-socket command listener on a background thread and
//! processes incoming commands on the main thread.
//!
//! ```text
//! hyprsnap [--config <path>]   run the daemon
//! hyprsnap --list-zones        print the snap zone catalogue as JSON
//! ```

use hyprsnap::command::Command;
use hyprsnap::config::{default_config_path, Config};
use hyprsnap::controller::Controller;
use hyprsnap::hyprland::host::HyprlandHost;
use hyprsnap::ipc::listener::UnixSocketListener;
use hyprsnap::model::SnapZone;
use hyprsnap::store::Stores;
use hyprsnap::traits::{CommandSource, WindowHost};
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("hyprsnap.sock")
}

/// The value following `--config`, if given.
fn config_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

/// Load the config from `--config` or the default location.  A missing
/// default file means defaults; an explicit file that cannot be loaded is
/// fatal.
fn load_config() -> Config {
    if let Some(path) = config_arg() {
        return match Config::load(&path) {
            Ok(cfg) => {
                info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        };
    }
    let path = default_config_path();
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    if std::env::args().any(|a| a == "--list-zones") {
        list_zones();
    } else {
        run_daemon();
    }
}

fn list_zones() {
    match serde_json::to_string_pretty(&SnapZone::definitions()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("failed to serialize zones: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_daemon() {
    let config = load_config();

    let host = HyprlandHost::new();
    match host.monitors() {
        Ok(m) => info!("found {} monitor(s)", m.len()),
        Err(e) => {
            error!("failed to query monitors: {}", e);
            std::process::exit(1);
        }
    }

    let data_dir = config.storage.resolve_data_dir();
    info!("data directory: {}", data_dir.display());
    let mut controller = Controller::new(host, &config, Stores::in_dir(&data_dir));

    if config.rules.autostart {
        if let Err(e) = controller.handle(Command::StartRules) {
            error!("failed to start rule monitor: {}", e);
        }
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    info!("hyprsnap running");
    for cmd in cmd_rx {
        if let Err(e) = controller.handle(cmd) {
            error!("command error: {}", e);
        }
    }
    info!("all command sources closed, exiting");
    controller.shutdown();
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
