use rand::{rngs::SmallRng, RngCore, SeedableRng};
use tinyvec::ArrayVec;

use crate::{
    definitions::{cpu, memory::opcodes},
    devices::{KeyStates, Keypad},
    display::Framebuffer,
    memory::Memory,
    opcode::{Instruction, Opcode, Operation},
    resources::Rom,
    timer::{NoCallback, TimerCallback, Timers},
    Config, MemoryError, ProcessError, StackError,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet<S: TimerCallback> {
    /// name of the loaded rom
    pub(super) name: String,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// The whole addressable memory, the fontset is written on creation.
    pub(super) memory: Memory,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// The delay and the sound timer
    pub(super) timers: Timers<S>,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`.
    pub(super) display: Framebuffer,
    /// The last polled state of the hex keyboard.
    pub(super) keyboard: Keypad,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet<NoCallback> {
    /// A silent chip with timers running in lockstep with the cpu.
    pub fn new() -> Self {
        Self::with_callback(NoCallback)
    }
}

impl Default for ChipSet<NoCallback> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimerCallback> ChipSet<S> {
    /// The timers tick once per cycle, the callback is called whenever the
    /// sound timer runs out.
    pub fn with_callback(callback: S) -> Self {
        Self::build(Timers::lockstep(callback))
    }

    /// The timers tick at 60 hertz relative to the configured cpu speed.
    pub fn with_config(config: &Config, callback: S) -> Self {
        Self::build(Timers::new(config.cycle_interval(), callback))
    }

    fn build(timers: Timers<S>) -> Self {
        Self {
            name: String::new(),
            opcode: 0,
            memory: Memory::with_fontset(),
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            timers,
            display: Framebuffer::new(),
            keyboard: Keypad::new(),
            rng: Box::new(SmallRng::from_entropy()),
        }
    }

    /// Will replace the random number generator used by `CXNN`.
    pub fn set_rng<R: RngCore + Send + 'static>(&mut self, rng: R) {
        self.rng = Box::new(rng);
    }

    /// Will copy the rom to the start of the program area and reset the
    /// program counter.
    pub fn load(&mut self, rom: &Rom) -> Result<(), MemoryError> {
        self.memory.load(cpu::PROGRAM_COUNTER, rom.get_data())?;
        self.name = rom.get_name().to_string();
        self.program_counter = cpu::PROGRAM_COUNTER;
        log::info!(
            "loaded rom {} with {} bytes",
            self.name,
            rom.get_data().len()
        );
        Ok(())
    }

    /// will advance the program by a single step
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        // get next opcode
        let opcode = self.memory.read16(self.program_counter)?;
        self.opcode = opcode;
        let instruction = Instruction::try_from(opcode)?;

        log::debug!(
            "{:#06X}: {:#06X} {:?}",
            self.program_counter,
            opcode,
            instruction
        );

        // run the opcode
        let (step, operation) = self.execute(instruction)?;
        self.program_counter = step.apply(self.program_counter);
        self.timers.cycle();

        Ok(operation)
    }

    /// Will move the program counter past the current instruction without
    /// running it.
    pub fn skip(&mut self) {
        self.program_counter += opcodes::SIZE;
    }

    /// Will write keyboard data into the internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: KeyStates) {
        self.keyboard.set_all(keys);
    }

    /// Will set the value of the given key
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to);
    }

    pub fn get_keyboard(&self) -> &Keypad {
        &self.keyboard
    }

    /// The current frame if it changed since the last call.
    pub fn take_frame(&mut self) -> Option<&Framebuffer> {
        if self.display.take_dirty() {
            Some(&self.display)
        } else {
            None
        }
    }

    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_registers(&self) -> &[u8; cpu::register::SIZE] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn get_delay_timer(&self) -> u8 {
        self.timers.delay()
    }

    pub fn get_sound_timer(&self) -> u8 {
        self.timers.sound()
    }

    /// Will push the address onto the stack, failing if all levels are used.
    pub(super) fn push_stack(&mut self, address: u16) -> Result<(), StackError> {
        match self.stack.try_push(address) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }
}
