use std::io::{stdout, Stdout};

use crate::gui::error::GuiError;

use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{prelude::CrosstermBackend, Terminal};

/// Raw mode plus the alternate screen, for as long as this value lives.
/// Dropping it puts the terminal back, on the error paths too.
pub struct RawTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

/// Best effort: there is nothing sensible left to do if the terminal refuses
/// to be restored.
fn restore() {
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
}

impl RawTerminal {
    pub fn enter() -> Result<Self, GuiError> {
        enable_raw_mode()?;
        let terminal = stdout()
            .execute(EnterAlternateScreen)
            .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())));
        let mut raw = match terminal {
            Ok(terminal) => Self { terminal },
            Err(e) => {
                restore();
                return Err(e.into());
            }
        };
        raw.terminal.clear()?;
        Ok(raw)
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        restore();
    }
}
