use anyhow::Result;
use std::io::{stdin, stdout, Write};
use termion::input::TermRead;

/// Prompts on stdout and reads a line without echoing it.
pub fn read_secret(prompt: &str) -> Result<String> {
    let stdout = stdout();
    let mut stdout = stdout.lock();
    let stdin = stdin();
    let mut stdin = stdin.lock();

    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    let input = stdin.read_passwd(&mut stdout)?.unwrap_or_default();
    stdout.write_all(b"\n")?;
    stdout.flush()?;

    Ok(input)
}

pub fn read_line(prompt: &str) -> Result<String> {
    let stdout = stdout();
    let mut stdout = stdout.lock();
    let stdin = stdin();
    let mut stdin = stdin.lock();

    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    let input = stdin.read_line()?.unwrap_or_default();

    Ok(input.trim().to_owned())
}
