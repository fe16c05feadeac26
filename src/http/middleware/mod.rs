//! Request middleware, outermost first: host switch, then session.

pub mod host_switch;
pub mod session;

pub use host_switch::host_switch_middleware;
pub use session::session_middleware;
