use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::{definitions::keyboard, display::Framebuffer};

/// The state of every key on the keypad.
pub type KeyStates = [bool; keyboard::SIZE];

/// The keypad shared between the input side and the interpreter.
pub type SharedKeypad = Arc<RwLock<Keypad>>;

/// The last frame published by the interpreter.
pub type SharedDisplay = Arc<Mutex<Framebuffer>>;

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will receive every frame that has to be redrawn.
    fn display(&mut self, frame: &Framebuffer);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// The last polled state of the keypad.
    fn keys(&self) -> KeyStates;
}

/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
///
/// The keypad only knows the last polled state, there is no edge detection.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    keys: KeyStates,
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// Replaces the whole state, the previous poll is discarded.
    pub fn set_all(&mut self, keys: KeyStates) {
        self.keys = keys;
    }

    /// Will set the value of a single key, keys outside of the keypad are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        if let Some(state) = self.keys.get_mut(key) {
            *state = to;
        }
    }

    /// Keys outside of the keypad are never pressed.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// The lowest key that is currently pressed.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&pressed| pressed).map(|key| key as u8)
    }

    pub fn keys(&self) -> KeyStates {
        self.keys
    }
}

/// Publishes frames into a [`SharedDisplay`].
#[derive(Debug, Clone, Default)]
pub struct DisplayAdapter {
    frame: SharedDisplay,
}

impl DisplayAdapter {
    pub fn new() -> Self {
        Default::default()
    }

    /// The slot the frames are published to.
    pub fn shared(&self) -> SharedDisplay {
        self.frame.clone()
    }
}

impl DisplayCommands for DisplayAdapter {
    fn display(&mut self, frame: &Framebuffer) {
        log::trace!("publishing frame");
        // an unconsumed frame is simply overwritten
        let mut slot = self.frame.lock();
        slot.clone_from(frame);
        slot.mark_dirty();
    }
}

/// Reads the keys from a [`SharedKeypad`].
#[derive(Debug, Clone, Default)]
pub struct KeyboardAdapter {
    keypad: SharedKeypad,
}

impl KeyboardAdapter {
    pub fn new() -> Self {
        Default::default()
    }

    /// The keypad the input side writes to.
    pub fn shared(&self) -> SharedKeypad {
        self.keypad.clone()
    }
}

impl KeyboardCommands for KeyboardAdapter {
    fn keys(&self) -> KeyStates {
        self.keypad.read().keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_all_discards_previous() {
        let mut keypad = Keypad::new();
        keypad.set_key(3, true);
        let mut keys = [false; keyboard::SIZE];
        keys[7] = true;
        keypad.set_all(keys);

        assert!(!keypad.is_pressed(3));
        assert!(keypad.is_pressed(7));
        assert_eq!(keys, keypad.keys());
    }

    #[test]
    fn test_is_pressed_out_of_range() {
        let mut keypad = Keypad::new();
        keypad.set_all([true; keyboard::SIZE]);
        assert!(keypad.is_pressed(0xF));
        assert!(!keypad.is_pressed(16));
        assert!(!keypad.is_pressed(0xFF));
        // ignored
        keypad.set_key(16, true);
    }

    #[test]
    fn test_first_pressed() {
        let mut keypad = Keypad::new();
        assert_eq!(None, keypad.first_pressed());
        keypad.set_key(0xB, true);
        keypad.set_key(0x4, true);
        assert_eq!(Some(0x4), keypad.first_pressed());
    }

    #[test]
    fn test_adapters_share_state() {
        let mut display = DisplayAdapter::new();
        let shared = display.shared();
        let mut frame = Framebuffer::new();
        frame.toggle_pixel(2, 3);
        display.display(&frame);
        // the published copy is always marked as new
        assert!(shared.lock().take_dirty());
        assert_eq!(*shared.lock(), frame);

        let keyboard = KeyboardAdapter::new();
        keyboard.shared().write().set_key(0xA, true);
        assert!(keyboard.keys()[0xA]);
    }
}
