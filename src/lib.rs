//! CyberShield client library.
//!
//! DESIGN
//! ======
//! The crate is the client-side orchestration layer for the CyberShield
//! file-security service. The service does the cryptography; this side picks
//! the input, dispatches operations with per-kind single-flight, interprets
//! the replies, and drives two feedback channels (notifications and the
//! operation log). The `cybershield` binary is a thin terminal front end.

pub mod config;
pub mod remote;
pub mod services;
pub mod shell;
pub mod state;
pub mod util;

pub use wire;
