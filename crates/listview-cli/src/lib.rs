//! Reference collaborators and command implementations for the `listview`
//! binary: a JSON file record store, a JSON Lines audit log, a directory
//! file saver, and per-screen TOML configuration.

pub mod audit;
pub mod commands;
pub mod console;
pub mod flags;
pub mod logging;
pub mod render;
pub mod saver;
pub mod screen;
pub mod store;
