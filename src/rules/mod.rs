//! Window rules: matching and the background monitor that applies them.

pub mod matcher;
pub mod monitor;
