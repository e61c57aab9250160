//! The boundary to the file-security service.
//!
//! DESIGN
//! ======
//! Callers talk to [`RemoteClient`], never to HTTP directly. [`HttpRemote`] is
//! the production implementation; tests substitute in-memory mocks. Every
//! completed call becomes exactly one [`wire::Outcome`]; only calls that never
//! produced a usable reply surface as [`RemoteError`].

pub mod http;
pub mod types;

pub use http::HttpRemote;
pub use types::{RemoteClient, RemoteError, RemoteRequest};
