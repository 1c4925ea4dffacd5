//! Transports carrying MCP messages to and from the server.

pub mod http;
pub mod session;
pub mod stdio;

pub use http::{router, serve, AppState, SESSION_HEADER};
pub use session::{Session, SessionError, SessionRegistry};
pub use stdio::{serve_lines, serve_stdio};
