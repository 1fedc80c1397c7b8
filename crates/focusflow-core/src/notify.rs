//! Completion notification sinks.
//!
//! The engine fires these and forgets them; an error is logged and dropped.

use std::io::Write;

use crate::timer::Mode;

pub trait Notifier: Send + Sync {
    /// Signal that an interval of `completed` mode has finished.
    fn notify(&self, completed: Mode) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Notifier for TerminalBell {
    fn notify(&self, _completed: Mode) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

/// Does nothing. Used when notifications are turned off in the config.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _completed: Mode) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
