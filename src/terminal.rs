use crate::error::Error;
use crate::renderer::{Framebuffer, Viewport};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{
    Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::tty::IsTty;
use crossterm::{execute, queue};
use log::*;
use std::io::{self, BufWriter, Stdout, Write};

/// Upper half block: the foreground paints the top pixel, the background the bottom one
const HALF_BLOCK: char = '▀';

/// The process's terminal, used as the drawing surface.
///
/// Opening it switches to the alternate screen in raw mode with mouse capture;
/// dropping it restores the terminal.
pub struct TerminalSurface {
    out: BufWriter<Stdout>,
}

impl TerminalSurface {
    pub fn open() -> Result<Self, Error> {
        let stdout = io::stdout();
        if !stdout.is_tty() {
            return Err(Error::NoSurface);
        }
        if termsize::get().is_none() {
            return Err(Error::NoSurface);
        }

        // Constructed before touching terminal modes so that a failure below still
        // restores them on drop
        let mut surface = TerminalSurface {
            out: BufWriter::new(stdout),
        };
        enable_raw_mode()?;
        execute!(surface.out, EnterAlternateScreen, EnableMouseCapture, Hide)?;

        debug!("Terminal surface opened");
        Ok(surface)
    }

    /// Current size of the terminal in pixels
    pub fn viewport(&self) -> Result<Viewport, Error> {
        let size = termsize::get().ok_or(Error::NoSurface)?;
        Ok(Viewport::from_cells(size.cols, size.rows))
    }

    /// Draws a frame, two pixel rows per terminal row, then prints `overlay` lines over
    /// its top left corner
    pub fn present(&mut self, frame: &Framebuffer, overlay: &[String]) -> Result<(), Error> {
        let rows = frame.height().div_ceil(2);
        for row in 0..rows {
            queue!(self.out, MoveTo(0, row as u16))?;

            let mut current = None;
            for x in 0..frame.width() {
                let top = frame.pixel(x, row * 2).unwrap_or_default();
                let bottom = frame.pixel(x, row * 2 + 1).unwrap_or_default();

                if current != Some((top, bottom)) {
                    queue!(
                        self.out,
                        SetForegroundColor(term_color(top)),
                        SetBackgroundColor(term_color(bottom))
                    )?;
                    current = Some((top, bottom));
                }
                queue!(self.out, Print(HALF_BLOCK))?;
            }
        }

        queue!(self.out, ResetColor)?;
        for (row, line) in overlay.iter().enumerate() {
            queue!(self.out, MoveTo(0, row as u16), Print(line))?;
        }

        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Err(err) = execute!(
            self.out,
            ResetColor,
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        ) {
            error!("Couldn't leave the alternate screen: {err}");
        }
        if let Err(err) = disable_raw_mode() {
            error!("Couldn't disable raw mode: {err}");
        }
    }
}

fn term_color((r, g, b): (u8, u8, u8)) -> TermColor {
    TermColor::Rgb { r, g, b }
}
