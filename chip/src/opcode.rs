//! Opcode abstractions, decoding and the program counter policy.
use crate::{definitions::memory, OpcodeError};

/// the mask for the register `X`
const MASK_X: u16 = 0x0F00;
/// the mask for the register `Y`
const MASK_Y: u16 = 0x00F0;
/// the mask for the last four bits
const MASK_N: u16 = 0x000F;
/// the mask for the last eight bits
const MASK_NN: u16 = 0x00FF;
/// the mask for the twelve bit address
const MASK_NNN: u16 = 0x0FFF;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// The opcode class, the highest nibble `T` of `TXYN`.
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `NNN` is an address
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.nnn(), 0xEDA);
    /// ```
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `X` is a register index
    /// - `NN` is a constant
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a constant or an opcode subtype
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8);
}

impl OpcodeTrait for Opcode {
    #[inline]
    fn t(&self) -> u8 {
        (self >> 12) as u8
    }

    #[inline]
    fn nnn(&self) -> usize {
        (self & MASK_NNN) as usize
    }

    #[inline]
    fn xnn(&self) -> (usize, u8) {
        let x = ((self & MASK_X) >> 8) as usize;
        (x, (self & MASK_NN) as u8)
    }

    #[inline]
    fn xyn(&self) -> (usize, usize, u8) {
        let x = ((self & MASK_X) >> 8) as usize;
        let y = ((self & MASK_Y) >> 4) as usize;
        (x, y, (self & MASK_N) as u8)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take after an instruction.
pub enum ProgramCounterStep {
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip the next instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Computes the program counter following `current`.
    #[inline]
    pub fn apply(&self, current: usize) -> usize {
        match *self {
            ProgramCounterStep::Next => current + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => current + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents a command from the interpreter up to the scheduler.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The interpreter is waiting for the next key press.
    Wait,
    /// The framebuffer changed and has to be redrawn.
    Draw,
}

/// The register-register operations of the `8XYN` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alu {
    /// `8XY0` - `Vx = Vy`
    Assign,
    /// `8XY1` - `Vx |= Vy`
    Or,
    /// `8XY2` - `Vx &= Vy`
    And,
    /// `8XY3` - `Vx ^= Vy`
    Xor,
    /// `8XY4` - `Vx += Vy`, `VF` is the carry
    Add,
    /// `8XY5` - `Vx -= Vy`, `VF` is set when there is no borrow
    Sub,
    /// `8XY6` - `Vx >>= 1`, `VF` is the shifted out bit
    ShiftRight,
    /// `8XY7` - `Vx = Vy - Vx`, `VF` is set when there is no borrow
    SubReverse,
    /// `8XYE` - `Vx <<= 1`, `VF` is the shifted out bit
    ShiftLeft,
}

/// A fully decoded instruction.
///
/// - `X`, `Y` are register indices
/// - `NN` is a byte constant
/// - `NNN` is an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` - `disp_clear()`
    Clear,
    /// `00EE` - `return;`
    Return,
    /// `1NNN` - `goto NNN;`
    Jump { nnn: usize },
    /// `2NNN` - `*(0xNNN)()`
    Call { nnn: usize },
    /// `3XNN` - `if(Vx==NN)`
    SkipEqual { x: usize, nn: u8 },
    /// `4XNN` - `if(Vx!=NN)`
    SkipNotEqual { x: usize, nn: u8 },
    /// `5XY0` - `if(Vx==Vy)`
    SkipRegEqual { x: usize, y: usize },
    /// `6XNN` - `Vx = NN`
    Load { x: usize, nn: u8 },
    /// `7XNN` - `Vx += NN`
    Add { x: usize, nn: u8 },
    /// `8XYN`
    Alu { op: Alu, x: usize, y: usize },
    /// `9XY0` - `if(Vx!=Vy)`
    SkipRegNotEqual { x: usize, y: usize },
    /// `ANNN` - `I = NNN`
    LoadIndex { nnn: usize },
    /// `BNNN` - `PC = V0 + NNN`
    JumpOffset { nnn: usize },
    /// `CXNN` - `Vx = rand() & NN`
    Random { x: usize, nn: u8 },
    /// `DXYN` - `draw(Vx, Vy, N)`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` - `if(key()==Vx)`
    SkipPressed { x: usize },
    /// `EXA1` - `if(key()!=Vx)`
    SkipNotPressed { x: usize },
    /// `FX07` - `Vx = get_delay()`
    GetDelayTimer { x: usize },
    /// `FX0A` - `Vx = get_key()`
    AwaitKeyPress { x: usize },
    /// `FX15` - `delay_timer(Vx)`
    SetDelayTimer { x: usize },
    /// `FX18` - `sound_timer(Vx)`
    SetSoundTimer { x: usize },
    /// `FX1E` - `I += Vx`
    AddIndex { x: usize },
    /// `FX29` - `I = sprite_addr[Vx]`
    LoadFont { x: usize },
    /// `FX33` - `set_BCD(Vx)`
    StoreBcd { x: usize },
    /// `FX55` - `reg_dump(Vx, &I)`
    StoreRegisters { x: usize },
    /// `FX65` - `reg_load(Vx, &I)`
    LoadRegisters { x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    /// Decodes the opcode by its class and then by its subform.
    ///
    /// # Example
    /// ```rust
    /// # use chip::{opcode::*, OpcodeError};
    /// assert_eq!(Ok(Instruction::Jump { nnn: 0x234 }), Instruction::try_from(0x1234_u16));
    /// assert_eq!(Err(OpcodeError::InvalidOpcode(0x8128)), Instruction::try_from(0x8128_u16));
    /// ```
    fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
        let (x, y, n) = opcode.xyn();
        let (_, nn) = opcode.xnn();
        let nnn = opcode.nnn();

        let instruction = match opcode.t() {
            0x0 => match opcode {
                0x00E0 => Instruction::Clear,
                0x00EE => Instruction::Return,
                _ => return Err(OpcodeError::InvalidOpcode(opcode)),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqual { x, nn },
            0x4 => Instruction::SkipNotEqual { x, nn },
            0x5 if n == 0 => Instruction::SkipRegEqual { x, y },
            0x6 => Instruction::Load { x, nn },
            0x7 => Instruction::Add { x, nn },
            0x8 => {
                let op = match n {
                    0x0 => Alu::Assign,
                    0x1 => Alu::Or,
                    0x2 => Alu::And,
                    0x3 => Alu::Xor,
                    0x4 => Alu::Add,
                    0x5 => Alu::Sub,
                    0x6 => Alu::ShiftRight,
                    0x7 => Alu::SubReverse,
                    0xE => Alu::ShiftLeft,
                    _ => return Err(OpcodeError::InvalidOpcode(opcode)),
                };
                Instruction::Alu { op, x, y }
            }
            0x9 if n == 0 => Instruction::SkipRegNotEqual { x, y },
            0xA => Instruction::LoadIndex { nnn },
            0xB => Instruction::JumpOffset { nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::SkipPressed { x },
                0xA1 => Instruction::SkipNotPressed { x },
                _ => return Err(OpcodeError::InvalidOpcode(opcode)),
            },
            0xF => match nn {
                0x07 => Instruction::GetDelayTimer { x },
                0x0A => Instruction::AwaitKeyPress { x },
                0x15 => Instruction::SetDelayTimer { x },
                0x18 => Instruction::SetSoundTimer { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::LoadFont { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return Err(OpcodeError::InvalidOpcode(opcode)),
            },
            _ => return Err(OpcodeError::InvalidOpcode(opcode)),
        };
        Ok(instruction)
    }
}
