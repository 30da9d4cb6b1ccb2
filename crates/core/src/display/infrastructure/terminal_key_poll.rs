use std::io::{self, IsTerminal};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use crate::display::domain::quit_signal::QuitSignal;

/// Non-blocking keypress check on the controlling terminal.
///
/// Raw mode is only held for the duration of one poll so regular log
/// output keeps its line discipline. Without a terminal on stdin the
/// signal never fires.
pub struct TerminalKeyPoll {
    interactive: bool,
}

impl TerminalKeyPoll {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalKeyPoll {
    fn default() -> Self {
        Self::new()
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl QuitSignal for TerminalKeyPoll {
    fn requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        if !self.interactive {
            return Ok(false);
        }
        let _raw = RawModeGuard::enable()?;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_never_requests_quit() {
        let mut poll = TerminalKeyPoll { interactive: false };
        assert!(!poll.requested().unwrap());
        assert!(!poll.requested().unwrap());
    }
}
