use anyhow::Result;
use std::io::Write;
use termion::{clear, cursor};

/// Redraws a block of lines in place on a raw-mode terminal.
pub struct BufferedStdout<W: Write> {
    out: W,
    buffer: String,
    printed_lines: u16,
}

impl<W: Write> BufferedStdout<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffer: String::new(),
            printed_lines: 0,
        }
    }

    pub fn add(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Writes the buffered block and remembers its height for [`clear`](Self::clear).
    pub fn flush(&mut self) -> Result<()> {
        if !self.buffer.ends_with("\r\n") {
            self.buffer.push_str("\r\n");
        }
        let lines = u16::try_from(self.buffer.lines().count()).unwrap_or(u16::MAX);
        self.printed_lines = self.printed_lines.saturating_add(lines);
        self.out.write_all(std::mem::take(&mut self.buffer).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.printed_lines > 0 {
            write!(
                self.out,
                "{}{}",
                cursor::Up(self.printed_lines),
                clear::AfterCursor
            )?;
            self.out.flush()?;
        }
        self.printed_lines = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_terminates_the_block() {
        let mut out = BufferedStdout::new(Vec::new());
        out.add("code: 1234\r\nttl: 5");
        out.flush().unwrap();
        assert_eq!(out.printed_lines, 2);
        assert_eq!(out.out, b"code: 1234\r\nttl: 5\r\n");
    }

    #[test]
    fn clear_moves_back_over_printed_lines() {
        let mut out = BufferedStdout::new(Vec::new());
        out.add("a\r\nb\r\n");
        out.flush().unwrap();
        out.out.clear();

        out.clear().unwrap();
        let expected = format!("{}{}", cursor::Up(2), clear::AfterCursor);
        assert_eq!(out.out, expected.as_bytes());
        assert_eq!(out.printed_lines, 0);

        out.out.clear();
        out.clear().unwrap();
        assert!(out.out.is_empty());
    }
}
