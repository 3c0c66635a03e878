//! Configuration module for the book reviews service.
//! Reads settings from the environment and wires up the application dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings};
