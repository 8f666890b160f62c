// src/display/mod.rs
//! Terminal rendering and the interactive explorer

pub mod command;
pub mod terminal;

pub use command::Command;
pub use terminal::TerminalDisplay;
