use crate::{
    definitions::{cpu, display::fontset, memory::opcodes},
    opcode::{Alu, Instruction, Operation, ProgramCounterStep},
    timer::TimerCallback,
    ProcessError,
};

use super::ChipSet;

type Executed = Result<(ProgramCounterStep, Operation), ProcessError>;

/// Shorthand for the instructions that only advance the program.
const NEXT: (ProgramCounterStep, Operation) = (ProgramCounterStep::Next, Operation::None);

impl<S: TimerCallback> ChipSet<S> {
    /// Runs a single decoded instruction and reports how the program counter
    /// has to move. The program counter itself is never touched here.
    pub(super) fn execute(&mut self, instruction: Instruction) -> Executed {
        match instruction {
            Instruction::Clear => {
                // 00E0
                // clear display
                self.display.clear();
                self.display.mark_dirty();
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                log::debug!("return to {:#06X}", pc);
                Ok((ProgramCounterStep::Jump(pc as usize), Operation::None))
            }
            Instruction::Jump { nnn } => Ok((ProgramCounterStep::Jump(nnn), Operation::None)),
            Instruction::Call { nnn } => {
                // 2NNN
                // the return address is the opcode after the call
                let next = self.program_counter + opcodes::SIZE;
                self.push_stack(next as u16)?;
                Ok((ProgramCounterStep::Jump(nnn), Operation::None))
            }
            Instruction::SkipEqual { x, nn } => Ok(Self::skip_if(self.registers[x] == nn)),
            Instruction::SkipNotEqual { x, nn } => Ok(Self::skip_if(self.registers[x] != nn)),
            Instruction::SkipRegEqual { x, y } => {
                Ok(Self::skip_if(self.registers[x] == self.registers[y]))
            }
            Instruction::Load { x, nn } => {
                self.registers[x] = nn;
                Ok(NEXT)
            }
            Instruction::Add { x, nn } => {
                // 7XNN
                // the carry flag is not changed
                self.registers[x] = self.registers[x].wrapping_add(nn);
                Ok(NEXT)
            }
            Instruction::Alu { op, x, y } => {
                self.alu(op, x, y);
                Ok(NEXT)
            }
            Instruction::SkipRegNotEqual { x, y } => {
                Ok(Self::skip_if(self.registers[x] != self.registers[y]))
            }
            Instruction::LoadIndex { nnn } => {
                self.index_register = nnn as u16;
                Ok(NEXT)
            }
            Instruction::JumpOffset { nnn } => {
                // BNNN
                // a target outside of the memory fails on the next fetch
                let target = nnn + self.registers[0] as usize;
                Ok((ProgramCounterStep::Jump(target), Operation::None))
            }
            Instruction::Random { x, nn } => {
                let mut random = [0u8; 1];
                self.rng.fill_bytes(&mut random);
                self.registers[x] = random[0] & nn;
                Ok(NEXT)
            }
            Instruction::Draw { x, y, n } => self.draw(x, y, n),
            Instruction::SkipPressed { x } => Ok(Self::skip_if(
                self.keyboard.is_pressed(self.registers[x] as usize),
            )),
            Instruction::SkipNotPressed { x } => Ok(Self::skip_if(
                !self.keyboard.is_pressed(self.registers[x] as usize),
            )),
            Instruction::GetDelayTimer { x } => {
                self.registers[x] = self.timers.delay();
                Ok(NEXT)
            }
            Instruction::AwaitKeyPress { x } => Ok(self.await_key(x)),
            Instruction::SetDelayTimer { x } => {
                self.timers.set_delay(self.registers[x]);
                Ok(NEXT)
            }
            Instruction::SetSoundTimer { x } => {
                self.timers.set_sound(self.registers[x]);
                Ok(NEXT)
            }
            Instruction::AddIndex { x } => {
                // FX1E
                // VF is not affected
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
                Ok(NEXT)
            }
            Instruction::LoadFont { x } => {
                let glyph = (self.registers[x] & 0xF) as usize;
                self.index_register = (fontset::LOCATION + glyph * fontset::GLYPH_SIZE) as u16;
                Ok(NEXT)
            }
            Instruction::StoreBcd { x } => {
                let value = self.registers[x];
                let bcd = [value / 100, (value / 10) % 10, value % 10];
                self.memory
                    .write_slice(self.index_register as usize, &bcd)?;
                Ok(NEXT)
            }
            Instruction::StoreRegisters { x } => {
                // FX55
                // I is left unchanged
                self.memory
                    .write_slice(self.index_register as usize, &self.registers[..=x])?;
                Ok(NEXT)
            }
            Instruction::LoadRegisters { x } => {
                let values = self.memory.read_slice(self.index_register as usize, x + 1)?;
                self.registers[..=x].copy_from_slice(values);
                Ok(NEXT)
            }
        }
    }

    fn skip_if(cond: bool) -> (ProgramCounterStep, Operation) {
        (ProgramCounterStep::cond(cond), Operation::None)
    }

    /// 8XYN, the flag register is always written after the result so that
    /// `X == F` ends up holding the flag.
    fn alu(&mut self, op: Alu, x: usize, y: usize) {
        let vx = self.registers[x];
        let vy = self.registers[y];

        let (result, flag) = match op {
            Alu::Assign => (vy, None),
            Alu::Or => (vx | vy, None),
            Alu::And => (vx & vy, None),
            Alu::Xor => (vx ^ vy, None),
            Alu::Add => {
                let (result, carry) = vx.overflowing_add(vy);
                (result, Some(carry as u8))
            }
            Alu::Sub => {
                // VF is the "no borrow" flag
                let (result, borrow) = vx.overflowing_sub(vy);
                (result, Some(!borrow as u8))
            }
            Alu::ShiftRight => (vx >> 1, Some(vx & 0x1)),
            Alu::SubReverse => {
                let (result, borrow) = vy.overflowing_sub(vx);
                (result, Some(!borrow as u8))
            }
            Alu::ShiftLeft => (vx << 1, Some(vx >> 7)),
        };

        self.registers[x] = result;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
    }

    /// DXYN
    ///
    /// Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N`
    /// pixels. Each row of `8` pixels is read as bit-coded starting from memory location `I`; `I`
    /// value doesn't change after the execution of this instruction. `VF` is set to `1` if any
    /// screen pixels are flipped from set to unset when the sprite is drawn, and to `0` if that
    /// doesn't happen.
    fn draw(&mut self, x: usize, y: usize, n: u8) -> Executed {
        // the whole sprite is fetched before a single pixel changes
        let sprite = self
            .memory
            .read_slice(self.index_register as usize, n as usize)?;

        let origin_x = self.registers[x] as usize;
        let origin_y = self.registers[y] as usize;
        let mut collision = false;

        for (row, line) in sprite.iter().enumerate() {
            for column in 0..8 {
                if line & (0x80 >> column) == 0 {
                    continue;
                }
                if !self
                    .display
                    .toggle_pixel(origin_x + column, origin_y + row)
                {
                    collision = true;
                }
            }
        }

        self.registers[cpu::register::LAST] = collision as u8;
        self.display.mark_dirty();

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    /// FX0A
    ///
    /// Blocks by repeating itself until a key is pressed.
    fn await_key(&mut self, x: usize) -> (ProgramCounterStep, Operation) {
        match self.keyboard.first_pressed() {
            Some(key) => {
                self.registers[x] = key;
                NEXT
            }
            None => (
                ProgramCounterStep::Jump(self.program_counter),
                Operation::Wait,
            ),
        }
    }
}
