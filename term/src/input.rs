//! Translates terminal key events into keypad states.
use std::time::Instant;

use chip::{
    definitions::keyboard::{self, LAYOUT},
    devices::KeyStates,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::definitions::keyboard::{HOLD, TERMINAL_LAYOUT};

/// maps the terminal keyboard layout to the internaly given.
static LAYOUT_MAP: Lazy<HashMap<char, usize>> = Lazy::new(|| {
    let mut map = HashMap::new();

    for (terminal_row, chip_row) in TERMINAL_LAYOUT.iter().zip(LAYOUT.iter()) {
        for (&physical, &key) in terminal_row.iter().zip(chip_row.iter()) {
            map.insert(physical, key);
        }
    }

    map
});

/// Will return the keypad key of the given character.
pub fn map_key(key: char) -> Option<usize> {
    LAYOUT_MAP.get(&key.to_ascii_lowercase()).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What a single terminal event asks for.
pub enum Command {
    Quit,
    Press(usize),
    Release(usize),
    Ignore,
}

/// Esc and Ctrl-C quit, mapped keys are forwarded to the keypad.
pub fn translate(event: KeyEvent) -> Command {
    match event.code {
        KeyCode::Esc => Command::Quit,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char(c) => match (map_key(c), event.kind) {
            (Some(key), KeyEventKind::Release) => Command::Release(key),
            (Some(key), _) => Command::Press(key),
            (None, _) => Command::Ignore,
        },
        _ => Command::Ignore,
    }
}

/// Keeps keys pressed between the repeats of the terminal.
#[derive(Debug, Clone, Default)]
pub struct KeyLatch {
    until: [Option<Instant>; keyboard::SIZE],
}

impl KeyLatch {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn press(&mut self, key: usize, now: Instant) {
        if let Some(until) = self.until.get_mut(key) {
            *until = Some(now + HOLD);
        }
    }

    pub fn release(&mut self, key: usize) {
        if let Some(until) = self.until.get_mut(key) {
            *until = None;
        }
    }

    /// The keys that are still held at `now`.
    pub fn states(&self, now: Instant) -> KeyStates {
        let mut keys = [false; keyboard::SIZE];
        for (state, until) in keys.iter_mut().zip(self.until.iter()) {
            *state = matches!(until, Some(until) if *until > now);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::empty(),
        }
    }

    fn press(c: char) -> KeyEvent {
        key(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn test_layout() {
        assert_eq!(Some(0x1), map_key('1'));
        assert_eq!(Some(0xC), map_key('4'));
        assert_eq!(Some(0x4), map_key('q'));
        assert_eq!(Some(0xD), map_key('r'));
        assert_eq!(Some(0x7), map_key('a'));
        assert_eq!(Some(0xE), map_key('f'));
        assert_eq!(Some(0xA), map_key('z'));
        assert_eq!(Some(0x0), map_key('x'));
        assert_eq!(Some(0xB), map_key('c'));
        assert_eq!(Some(0xF), map_key('v'));
        assert_eq!(Some(0x5), map_key('W'));
        assert_eq!(None, map_key('p'));
    }

    #[test]
    fn test_every_key_is_mapped_once() {
        let mut keys = LAYOUT_MAP.values().copied().collect::<Vec<_>>();
        keys.sort_unstable();
        assert_eq!((0..keyboard::SIZE).collect::<Vec<_>>(), keys);
    }

    #[test]
    fn test_translate() {
        assert_eq!(Command::Press(0x5), translate(press('w')));
        assert_eq!(Command::Ignore, translate(press('p')));
        assert_eq!(
            Command::Quit,
            translate(key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press))
        );
        assert_eq!(
            Command::Quit,
            translate(key(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                KeyEventKind::Press
            ))
        );
        assert_eq!(
            Command::Release(0xB),
            translate(key(
                KeyCode::Char('c'),
                KeyModifiers::NONE,
                KeyEventKind::Release
            ))
        );
        assert_eq!(
            Command::Ignore,
            translate(key(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Press))
        );
    }

    #[test]
    fn test_latch_holds_keys() {
        let now = Instant::now();
        let mut latch = KeyLatch::new();
        assert_eq!([false; keyboard::SIZE], latch.states(now));

        latch.press(0x3, now);
        assert!(latch.states(now)[0x3]);
        assert!(latch.states(now + HOLD / 2)[0x3]);
        assert!(!latch.states(now + HOLD)[0x3]);

        // a repeat extends the hold
        latch.press(0x3, now + HOLD / 2);
        assert!(latch.states(now + HOLD)[0x3]);

        latch.release(0x3);
        assert!(!latch.states(now)[0x3]);

        // ignored
        latch.press(keyboard::SIZE, now);
        latch.release(keyboard::SIZE);
    }
}
