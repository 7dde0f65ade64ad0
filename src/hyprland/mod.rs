//! Hyprland-specific implementations.
//!
//! This module provides the concrete [`WindowHost`](crate::traits::WindowHost)
//! backend, powered by Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod host;
