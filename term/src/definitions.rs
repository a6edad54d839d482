//! The definitions of the terminal frontend

pub(crate) mod keyboard {
    use std::time::Duration;

    /// The physical keys, laid out the same way as
    /// [`chip::definitions::keyboard::LAYOUT`].
    pub const TERMINAL_LAYOUT: [[char; 4]; 4] = [
        ['1', '2', '3', '4'],
        ['q', 'w', 'e', 'r'],
        ['a', 's', 'd', 'f'],
        ['z', 'x', 'c', 'v'],
    ];

    /// Most terminals only report presses, so a key stays down for this long
    /// after the last press or repeat.
    pub const HOLD: Duration = Duration::from_millis(250);
}

pub(crate) mod screen {
    use std::time::Duration;

    /// The time between two presented frames (~60 hertz).
    pub const FRAME: Duration = Duration::from_micros(16_667);
    /// How long the beep marker is shown.
    pub const BEEP: Duration = Duration::from_millis(200);
    /// A single terminal cell shows two pixels stacked on top of each other.
    pub const PIXEL: &str = "▀";
    pub const TITLE: &str = "CHIP-8";
}
