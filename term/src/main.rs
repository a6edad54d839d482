//! Runs a chip8 program inside of the terminal.
//!
//! The keypad is mapped onto the left side of the keyboard
//!
//! ```text
//! 1 2 3 4        1 2 3 C
//! q w e r   ->   4 5 6 D
//! a s d f        7 8 9 E
//! z x c v        A 0 B F
//! ```
//!
//! Esc or Ctrl-C quit. The log goes to stderr, which is the terminal the screen
//! is drawn on, so nothing is logged unless a level is set with `RUST_LOG`.
//! A halted machine reports its state once the terminal is restored.
use std::{env, path::PathBuf};

use anyhow::{bail, Context};
use chip::{resources::Rom, Config};
use log::LevelFilter;
use simple_logger::SimpleLogger;

mod app;
mod definitions;
mod input;
mod render;

const USAGE: &str = "usage: chip8 <program>";

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Off)
        .env()
        .init()
        .context("Unable to set up the logger")?;

    let path = program_path(env::args_os().skip(1).map(PathBuf::from))?;
    let rom = Rom::from_file(&path).context("Unable to load the program")?;

    app::run(&rom, &Config::default())
}

/// Exactly one argument is accepted.
fn program_path<I: Iterator<Item = PathBuf>>(mut args: I) -> anyhow::Result<PathBuf> {
    match (args.next(), args.next()) {
        (Some(path), None) => Ok(path),
        _ => bail!(USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_path() {
        let path = program_path(vec![PathBuf::from("pong.ch8")].into_iter()).unwrap();
        assert_eq!(PathBuf::from("pong.ch8"), path);

        let err = program_path(Vec::new().into_iter()).unwrap_err();
        assert_eq!(USAGE, err.to_string());

        let args = vec![PathBuf::from("a"), PathBuf::from("b")];
        assert!(program_path(args.into_iter()).is_err());
    }
}
