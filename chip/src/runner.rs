//! Drives the chip on a background thread.
use std::{ops::ControlFlow, sync::Arc};

use parking_lot::Mutex;

use crate::{
    chip8::ChipSet,
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    timer::{TimedWorker, TimerCallback},
    Config, ProcessError,
};

/// The chip together with the devices it talks to.
pub struct Machine<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: TimerCallback,
{
    chip: ChipSet<S>,
    display: D,
    keyboard: K,
}

impl<D, K, S> Machine<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: TimerCallback,
{
    pub fn new(chip: ChipSet<S>, display: D, keyboard: K) -> Self {
        Self {
            chip,
            display,
            keyboard,
        }
    }

    pub fn chip(&self) -> &ChipSet<S> {
        &self.chip
    }

    /// Runs a single cycle.
    ///
    /// The keys are polled before the instruction runs and a changed frame
    /// is published after it. An unknown opcode is logged and skipped, every
    /// other error stops the machine.
    pub fn step(&mut self) -> ControlFlow<ProcessError, Operation> {
        self.chip.set_keyboard(self.keyboard.keys());

        match self.chip.next() {
            Ok(operation) => {
                if let Some(frame) = self.chip.take_frame() {
                    self.display.display(frame);
                }
                ControlFlow::Continue(operation)
            }
            Err(err) if !err.is_fatal() => {
                log::warn!(
                    "{} Skipping it at {:#06X}.",
                    err,
                    self.chip.get_program_counter()
                );
                self.chip.skip();
                ControlFlow::Continue(Operation::None)
            }
            Err(err) => {
                log::error!("{}", err);
                log::debug!("The machine halted with the state\n{}", self.chip);
                ControlFlow::Break(err)
            }
        }
    }
}

/// Why the machine stopped, with the state dump taken when it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    pub error: ProcessError,
    pub state: String,
}

/// The handle to a running machine, dropping it stops the machine.
pub struct Runner<W: TimedWorker> {
    worker: W,
    halt: Arc<Mutex<Option<Halt>>>,
}

impl<W: TimedWorker> Runner<W> {
    /// Is false once the machine halted or was stopped.
    pub fn is_running(&self) -> bool {
        self.worker.is_alive()
    }

    /// The reason the machine halted.
    pub fn error(&self) -> Option<ProcessError> {
        self.halt.lock().as_ref().map(|halt| halt.error.clone())
    }

    pub fn halt(&self) -> Option<Halt> {
        self.halt.lock().clone()
    }

    pub fn stop(&mut self) {
        self.worker.stop();
    }
}

/// Will run the chip with the configured speed until it halts or the
/// returned runner is dropped.
pub fn run<D, K, S, W>(chip: ChipSet<S>, display: D, keyboard: K, config: &Config) -> Runner<W>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: TimerCallback + Send + 'static,
    W: TimedWorker,
{
    let halt = Arc::new(Mutex::new(None));
    let slot = halt.clone();
    let mut machine = Machine::new(chip, display, keyboard);

    let inner_run = move || match machine.step() {
        ControlFlow::Continue(_) => ControlFlow::Continue(()),
        ControlFlow::Break(error) => {
            *slot.lock() = Some(Halt {
                error,
                state: machine.chip().to_string(),
            });
            ControlFlow::Break(())
        }
    };

    let interval = config.cycle_interval();
    log::debug!("starting the machine with a cycle every {:?}", interval);

    let mut worker = W::new();
    worker.start(inner_run, interval);

    Runner { worker, halt }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{
        devices::{DisplayAdapter, KeyboardAdapter, MockDisplayCommands, MockKeyboardCommands},
        opcode::Opcode,
        resources::Rom,
        timer::{NoCallback, Worker},
        StackError,
    };

    fn chip_with(program: &[Opcode]) -> ChipSet<NoCallback> {
        let data = program
            .iter()
            .flat_map(|opcode| opcode.to_be_bytes())
            .collect::<Vec<_>>();
        let mut chip = ChipSet::new();
        chip.load(&Rom::new("runner", data).unwrap()).unwrap();
        chip
    }

    fn idle_keyboard() -> MockKeyboardCommands {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard.expect_keys().return_const([false; 16]);
        keyboard
    }

    #[test]
    fn test_step_publishes_frame() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().times(1).return_const(());

        let mut machine = Machine::new(chip_with(&[0x00E0, 0x6001]), display, idle_keyboard());

        assert_eq!(ControlFlow::Continue(Operation::Draw), machine.step());
        // nothing changed on the screen
        assert_eq!(ControlFlow::Continue(Operation::None), machine.step());
    }

    #[test]
    fn test_step_polls_keys() {
        let mut display = MockDisplayCommands::new();
        display.expect_display().times(0);
        let mut keyboard = MockKeyboardCommands::new();
        let mut keys = [false; 16];
        keys[0x5] = true;
        keyboard.expect_keys().times(1).return_const(keys);

        let mut machine = Machine::new(chip_with(&[0xF10A]), display, keyboard);

        assert_eq!(ControlFlow::Continue(Operation::None), machine.step());
        assert_eq!(0x5, machine.chip().get_registers()[0x1]);
        assert!(machine.chip().get_keyboard().is_pressed(0x5));
    }

    #[test]
    fn test_step_skips_invalid_opcode() {
        let mut machine = Machine::new(
            chip_with(&[0x0123, 0x6001]),
            MockDisplayCommands::new(),
            idle_keyboard(),
        );

        assert_eq!(ControlFlow::Continue(Operation::None), machine.step());
        assert_eq!(0x202, machine.chip().get_program_counter());
        assert_eq!(ControlFlow::Continue(Operation::None), machine.step());
        assert_eq!(1, machine.chip().get_registers()[0x0]);
    }

    #[test]
    fn test_step_halts() {
        let mut machine = Machine::new(
            chip_with(&[0x00EE]),
            MockDisplayCommands::new(),
            idle_keyboard(),
        );

        assert_eq!(
            ControlFlow::Break(ProcessError::Stack(StackError::Empty)),
            machine.step()
        );
    }

    fn wait_for_halt<W: TimedWorker>(runner: &Runner<W>) {
        let start = Instant::now();
        while runner.is_running() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_run_stores_halt_reason() {
        let config = Config { cpu_hertz: 1000 };
        let runner: Runner<Worker> = run(
            chip_with(&[0x6001, 0x00EE]),
            DisplayAdapter::new(),
            KeyboardAdapter::new(),
            &config,
        );

        wait_for_halt(&runner);
        assert!(!runner.is_running());
        assert_eq!(
            Some(ProcessError::Stack(StackError::Empty)),
            runner.error()
        );

        // the dump is taken at the failing return
        let halt = runner.halt().unwrap();
        assert!(halt.state.contains("Program counter: 0x0202 Opcode: 0x00EE"));
        assert!(halt.state.contains("V0: 0x01"));
    }

    #[test]
    fn test_run_publishes_frames() {
        let config = Config { cpu_hertz: 1000 };
        let display = DisplayAdapter::new();
        let frame = display.shared();
        let keyboard = KeyboardAdapter::new();

        // draws a zero in the top left corner and loops
        let mut runner: Runner<Worker> = run(
            chip_with(&[0xA050, 0xD005, 0x1204]),
            display,
            keyboard,
            &config,
        );

        let start = Instant::now();
        while !frame.lock().is_dirty() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(runner.is_running());
        runner.stop();
        assert!(!runner.is_running());

        let frame = frame.lock();
        assert!(frame.is_dirty());
        assert_eq!(Ok(true), frame.pixel(0, 0));
        assert_eq!(None, runner.error());
        assert_eq!(None, runner.halt());
    }
}
