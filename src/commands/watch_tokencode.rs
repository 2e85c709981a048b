use anyhow::Result;
use chrono::Utc;
use std::io::{stdin, stdout};
use std::sync::mpsc::channel;
use std::{thread, time};
use termion::{event::Key, input::TermRead, raw::IntoRawMode};

use stoken::{format_tokencode, TokenContext};

use super::unlock_token::{current_token, load_token, unlock_token};
use crate::cli::TokenArgs;
use crate::terminal::BufferedStdout;

enum AppEvent {
    Terminate,
    Timer,
}

/// Redraws the current and next tokencode every second until 'q' is pressed.
pub fn watch_tokencode(args: &TokenArgs) -> Result<()> {
    let mut ctx = load_token(args, false)?;
    let unlocked = unlock_token(&mut ctx, args, true)?;
    let pin = unlocked.pin.as_deref();

    // fail before touching the terminal if the code can't be computed
    ctx.compute_tokencode(Utc::now().timestamp(), pin)?;

    let stdout = stdout().into_raw_mode()?;
    let mut buffered_stdout = BufferedStdout::new(stdout);

    let (sender, receiver) = channel::<AppEvent>();
    let sender_key = sender.clone();

    thread::spawn(move || {
        let stdin = stdin();
        let stdin = stdin.lock();

        for key in stdin.keys() {
            let event = match key {
                Ok(Key::Char('q') | Key::Esc | Key::Ctrl('c')) | Err(_) => AppEvent::Terminate,
                Ok(_) => continue,
            };
            if sender_key.send(event).is_err() {
                break;
            }
        }
    });

    thread::spawn(move || loop {
        if sender.send(AppEvent::Timer).is_err() {
            break;
        }
        thread::sleep(time::Duration::from_millis(1000));
    });

    while let Ok(AppEvent::Timer) = receiver.recv() {
        render(&ctx, pin, &mut buffered_stdout)?;
    }

    buffered_stdout.clear()?;
    Ok(())
}

fn render<W: std::io::Write>(
    ctx: &TokenContext,
    pin: Option<&str>,
    buffered_stdout: &mut BufferedStdout<W>,
) -> Result<()> {
    let token = current_token(ctx)?;
    let interval = i64::from(token.interval());
    let now = Utc::now().timestamp();

    let code = ctx.compute_tokencode(now, pin)?;
    let next = ctx.compute_tokencode(now + interval, pin)?;
    let ttl = interval - now.rem_euclid(interval);

    buffered_stdout.add(&format!(
        "serial: {}\r\ncode: {}  ttl: {}s\r\nnext: {}\r\n\r\n",
        token.serial,
        format_tokencode(&code),
        ttl,
        format_tokencode(&next)
    ));
    buffered_stdout.add("press 'q', 'Ctrl+c' or 'Esc' to exit\r\n");
    buffered_stdout.clear()?;
    buffered_stdout.flush()?;

    Ok(())
}
