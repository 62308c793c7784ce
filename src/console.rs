use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor},
};
use elca::{Observer, Symbol, enc::encode_row};
use std::io::{self, Write};

/// Background colors for symbols 0, 1 and 2
const PALETTE: [Color; 3] = [Color::Black, Color::White, Color::DarkRed];

/// Draws every step of a run as one terminal row
///
/// The first row is preceded by the run's properties and the final row is
/// followed by its digits.
pub struct ConsoleRender<W: Write> {
    out: W,
    colored: bool,
    rule: String,
    last_step: usize,
    error: Option<io::Error>,
}
impl<W: Write> ConsoleRender<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self {
            out,
            colored,
            rule: String::new(),
            last_step: 0,
            error: None,
        }
    }

    /// Prepares for a run of `rule` ending at `last_step`
    pub fn begin<T: ToString>(&mut self, rule: T, last_step: usize) {
        self.rule = rule.to_string();
        self.last_step = last_step;
    }

    fn write_properties(&mut self, cells: &[Symbol]) -> io::Result<()> {
        writeln!(self.out, "cell count: {}", cells.len())?;
        writeln!(self.out, "rule number: {}", self.rule)?;
        writeln!(self.out, "    {}", encode_row(cells))
    }

    fn write_step(&mut self, step: usize, cells: &[Symbol]) -> io::Result<()> {
        if step == 0 {
            self.write_properties(cells)?;
        }

        write!(self.out, "{:<3} ", step)?;
        if self.colored {
            for &symbol in cells {
                let color = PALETTE.get(symbol as usize).copied().unwrap_or(Color::Reset);
                queue!(self.out, SetBackgroundColor(color), Print(' '))?;
            }
            queue!(self.out, ResetColor)?;
        } else {
            self.out.write_all(encode_row(cells).as_bytes())?;
        }
        writeln!(self.out)?;

        if step == self.last_step {
            writeln!(self.out, "    {}", encode_row(cells))?;
        }
        Ok(())
    }

    /// Flushes the output, returning the first error hit while rendering
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
impl<W: Write> Observer for ConsoleRender<W> {
    fn observe(&mut self, step: usize, cells: &[Symbol]) {
        // the first failure is kept, rendering stops after it
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_step(step, cells) {
            self.error = Some(err);
        }
    }
}
