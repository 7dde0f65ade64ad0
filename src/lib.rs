//! **hyprsnap**: window layout capture/replay and rule-driven window
//! placement for Hyprland.
//!
//! A *layout* is a named snapshot of where application windows sit.  It can
//! be replayed later, optionally starting the applications that are not
//! running.  *Rules* are watched by a background monitor: the first time a
//! window of a matching process (and title pattern) shows up, the rule's
//! action is applied to it once.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowHost`]: abstracts window enumeration and manipulation
//!   so layout and rule logic is not coupled to any specific compositor.
//! * [`traits::CommandSource`]: abstracts the transport that delivers
//!   user intent so the main loop is not coupled to any IPC mechanism.
//!
//! [`query::WindowQuery`] builds the engine-facing operations on top of a
//! host; [`layout`] and [`rules`] implement the engines, and
//! [`controller::Controller`] dispatches [`command::Command`]s to them.
//! Concrete implementations live in [`hyprland`] (Hyprland IPC) and
//! [`ipc`] (Unix-socket command listener).

pub mod command;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod hyprland;
pub mod ipc;
pub mod layout;
pub mod model;
pub mod query;
pub mod rules;
pub mod store;
pub mod traits;

#[cfg(test)]
mod testing;
