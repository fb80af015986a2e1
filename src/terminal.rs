use anyhow::Context;
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Stdout, Write};

/// Raw mode plus alternate screen for the lifetime of the preview.
/// Dropping the guard puts the terminal back the way it was.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // From here on Drop undoes raw mode even if a later step fails.
        let guard = Self { _private: () };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?
            .execute(terminal::Clear(ClearType::All))
            .context("clear screen")?
            .execute(cursor::Hide)
            .context("hide cursor")?;
        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }

    /// Current terminal size as (columns, rows).
    pub fn size() -> anyhow::Result<(u16, u16)> {
        terminal::size().context("get terminal size")
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        // Undo synchronized output, autowrap-off and colors left by the renderer.
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
    }
}
