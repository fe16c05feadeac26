//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load sites → Validate → Open site stores → Build tenant registry
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Sweeper (sweeper.rs):
//!     Interval tick → Purge expired sessions per site → Stop on shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Sites initialize in file order, not concurrently
//! - Listeners start last (traffic only when ready)

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod sweeper;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{build_registry, StartupError};
pub use sweeper::SessionSweeper;
