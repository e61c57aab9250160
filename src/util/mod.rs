//! Small formatting helpers shared by the services and the CLI.

pub mod format;
