//! Threshold monitoring
//!
//! Watches one instrument's ticker stream until a target is crossed, then
//! attempts a single alert and hands control back to the caller.

mod runner;
mod session;
mod threshold;

pub use runner::{Monitor, MonitorConfig};
pub use session::{MonitorSession, SessionOutcome};
pub use threshold::{crossed, AlertTarget, Direction};
