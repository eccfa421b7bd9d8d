use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};

use crate::render::{Canvas, Glyph};

/// Where frames are shown and input events come from. `restore` must undo
/// whatever part of `setup` took effect, even when `setup` failed halfway.
pub trait Surface {
    fn setup(&mut self) -> Result<()>;
    fn restore(&mut self) -> Result<()>;
    fn size(&self) -> Result<(u16, u16)>;
    fn read_events_queue(&self) -> Result<Vec<Event>>;
    fn present(&mut self, canvas: &Canvas) -> Result<()>;
}

/// The terminal as a drawing surface. Keeps the last presented frame so only
/// changed cells are written.
pub struct TermManager {
    stdout: Stdout,
    screen: Option<Canvas>,
}

impl TermManager {
    pub fn new() -> Self {
        TermManager { stdout: stdout(), screen: None }
    }

    fn print_at(&mut self, column: u16, row: u16, glyph: Glyph) -> Result<()> {
        let intensity = if glyph.dim { Attribute::Dim } else { Attribute::NormalIntensity };

        queue!(
            self.stdout,
            cursor::MoveTo(column, row),
            SetAttribute(intensity),
            SetForegroundColor(glyph.fg),
            Print(glyph.ch)
        )
        .context("Failed to draw cell")?;
        Ok(())
    }
}

impl Surface for TermManager {
    fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("Failed to hide cursor")?;
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        // leave the alternate screen even if raw mode was never entered
        let raw = terminal::disable_raw_mode().context("Failed to disable raw mode");
        let screen = execute!(
            self.stdout,
            ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen");
        raw.and(screen)
    }

    fn size(&self) -> Result<(u16, u16)> {
        terminal::size().context("Failed to read terminal size")
    }

    /// Drains every event already waiting without blocking.
    fn read_events_queue(&self) -> Result<Vec<Event>> {
        let mut events = vec![];

        while poll(Duration::ZERO).context("Failed to poll terminal events")? {
            events.push(read().context("Failed to read terminal event")?);
        }

        Ok(events)
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        let previous = match self.screen.take() {
            Some(screen) if screen.width() == canvas.width() && screen.height() == canvas.height() => screen,
            _ => {
                queue!(self.stdout, terminal::Clear(ClearType::All)).context("Failed to clear screen")?;
                Canvas::new(canvas.width(), canvas.height())
            }
        };

        for row in 0..canvas.height() {
            for column in 0..canvas.width() {
                let glyph = canvas.get(column, row);
                if glyph != previous.get(column, row) {
                    self.print_at(column, row, glyph)?;
                }
            }
        }

        queue!(self.stdout, ResetColor, SetAttribute(Attribute::Reset)).context("Failed to reset style")?;
        self.stdout.flush().context("Failed to flush terminal")?;
        self.screen = Some(canvas.clone());
        Ok(())
    }
}
