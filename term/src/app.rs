//! The presentation loop, it owns the terminal and the main thread while the
//! machine runs in the background.
use std::{
    io::{self, Stdout, Write},
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use anyhow::Context;
use chip::{
    chip8::ChipSet,
    devices::{DisplayAdapter, KeyboardAdapter, SharedDisplay, SharedKeypad},
    display::Framebuffer,
    resources::Rom,
    runner::{self, Halt, Runner},
    timer::{TimedWorker, TimerCallback, Worker},
    Config,
};
use crossterm::{
    cursor,
    event::{self, Event, KeyEvent},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    widgets::{Block, Borders},
    Frame, Terminal,
};

use crate::{
    definitions::screen::{BEEP, FRAME, TITLE},
    input::{self, Command, KeyLatch},
    render::{self, Screen},
};

/// Raises a flag for the presentation loop whenever the machine beeps.
#[derive(Debug, Clone, Default)]
pub struct SoundCallback {
    beep: Arc<AtomicBool>,
}

impl SoundCallback {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        self.beep.clone()
    }
}

impl TimerCallback for SoundCallback {
    fn handle(&mut self) {
        self.beep.store(true, Ordering::Release);
    }
}

/// Puts the terminal into raw mode on the alternate screen and restores it
/// when dropped.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("Unable to leave raw mode: {}", err);
        }
        if let Err(err) = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        ) {
            log::error!("Unable to restore the terminal: {}", err);
        }
    }
}

/// The state of the presentation side.
struct App {
    name: String,
    display: SharedDisplay,
    keypad: SharedKeypad,
    beep: Arc<AtomicBool>,
    latch: KeyLatch,
    /// The last frame consumed from the machine
    frame: Framebuffer,
    beep_until: Option<Instant>,
}

impl App {
    fn new(
        name: &str,
        display: SharedDisplay,
        keypad: SharedKeypad,
        beep: Arc<AtomicBool>,
    ) -> Self {
        Self {
            name: name.to_string(),
            display,
            keypad,
            beep,
            latch: KeyLatch::new(),
            frame: Framebuffer::new(),
            beep_until: None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> ControlFlow<()> {
        match input::translate(key) {
            Command::Quit => return ControlFlow::Break(()),
            Command::Press(key) => self.latch.press(key, now),
            Command::Release(key) => self.latch.release(key),
            Command::Ignore => {}
        }
        ControlFlow::Continue(())
    }

    /// Copies the latest frame out of the shared slot, returns if there was
    /// a new one.
    fn consume_frame(&mut self) -> bool {
        let mut slot = self.display.lock();
        if slot.take_dirty() {
            self.frame.clone_from(&slot);
            true
        } else {
            false
        }
    }

    /// Returns if the beep marker changed.
    fn update_beep(&mut self, now: Instant) -> io::Result<bool> {
        if self.beep.swap(false, Ordering::Acquire) {
            // the terminal bell
            let mut stdout = io::stdout();
            stdout.write_all(b"\x07")?;
            stdout.flush()?;

            let was_beeping = self.beep_until.is_some();
            self.beep_until = Some(now + BEEP);
            return Ok(!was_beeping);
        }

        match self.beep_until {
            Some(until) if until <= now => {
                self.beep_until = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn title(&self) -> String {
        let marker = if self.beep_until.is_some() { " ♪" } else { "" };
        format!("{} {}{}", TITLE, self.name, marker)
    }

    fn draw<B: Backend>(&self, f: &mut Frame<B>) {
        let area = render::layout(f.size());
        let block = Block::default().title(self.title()).borders(Borders::ALL);
        let inner = block.inner(area);

        f.render_widget(block, area);
        f.render_widget(Screen::new(&self.frame), inner);
    }

    /// Runs until the user quits or the machine halts.
    fn present<W: TimedWorker>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        runner: &Runner<W>,
    ) -> anyhow::Result<()> {
        let mut redraw = true;

        loop {
            let start = Instant::now();

            while event::poll(std::time::Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key, start).is_break() {
                            log::info!("quit requested");
                            return Ok(());
                        }
                    }
                    Event::Resize(..) => redraw = true,
                    _ => {}
                }
            }
            self.keypad.write().set_all(self.latch.states(start));

            redraw |= self.consume_frame();
            redraw |= self.update_beep(start)?;

            if redraw {
                terminal.draw(|f| self.draw(f))?;
                redraw = false;
            }

            if !runner.is_running() {
                return Ok(());
            }

            thread::sleep(FRAME.saturating_sub(start.elapsed()));
        }
    }
}

/// Will run the rom until the user quits, fails if the machine halted.
pub fn run(rom: &Rom, config: &Config) -> anyhow::Result<()> {
    let sound = SoundCallback::new();
    let beep = sound.flag();

    let mut chip = ChipSet::with_config(config, sound);
    chip.load(rom)
        .with_context(|| format!("Unable to load {} into memory", rom.get_name()))?;

    let display = DisplayAdapter::new();
    let keyboard = KeyboardAdapter::new();
    let mut app = App::new(rom.get_name(), display.shared(), keyboard.shared(), beep);

    let mut guard = TerminalGuard::new().context("Unable to set up the terminal")?;
    let mut runner: Runner<Worker> = runner::run(chip, display, keyboard, config);

    let result = app.present(&mut guard.terminal, &runner);
    runner.stop();
    // the terminal has to be restored before anything is reported
    drop(guard);

    result?;
    report(&runner)
}

/// The halt of the machine as an error, together with the state it halted in.
fn report<W: TimedWorker>(runner: &Runner<W>) -> anyhow::Result<()> {
    match runner.halt() {
        Some(Halt { error, state }) => {
            Err(anyhow::Error::new(error)
                .context(format!("The machine halted with the state\n{}", state)))
        }
        None => Ok(()),
    }
}
