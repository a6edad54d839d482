//! The pretty print implementation of the chipset, used when the machine
//! halts. This implementation was split up into this file for smaller file
//! sizes and higher cohesion.

use std::fmt;

use super::ChipSet;
use crate::timer::TimerCallback;

/// The amount of bytes shown in a single memory row.
const MEMORY_ROW: usize = 16;
/// The amount of registers shown in a single row.
const REGISTER_ROW: usize = 8;
const INDENT: &str = "    ";

impl<S: TimerCallback> fmt::Display for ChipSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rom: {}", self.name)?;
        writeln!(
            f,
            "Program counter: {:#06X} Opcode: {:#06X} Index: {:#06X}",
            self.program_counter, self.opcode, self.index_register
        )?;
        writeln!(
            f,
            "Delay timer: {} Sound timer: {}",
            self.timers.delay(),
            self.timers.sound()
        )?;

        write!(f, "Stack ({}):", self.stack.len())?;
        for address in self.stack.iter() {
            write!(f, " {:#06X}", address)?;
        }
        writeln!(f)?;

        writeln!(f, "Registers:")?;
        for (row, chunk) in self.registers.chunks(REGISTER_ROW).enumerate() {
            f.write_str(INDENT)?;
            for (column, value) in chunk.iter().enumerate() {
                write!(f, "V{:X}: {:#04X} ", row * REGISTER_ROW + column, value)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Memory:")?;
        print_memory(f, self.memory.as_slice())
    }
}

/// Hex dump of the memory, consecutive rows that only contain zeros are
/// collapsed into a single `...` line.
fn print_memory(f: &mut fmt::Formatter<'_>, memory: &[u8]) -> fmt::Result {
    let mut collapsed = false;

    for (row, chunk) in memory.chunks(MEMORY_ROW).enumerate() {
        if chunk.iter().all(|&byte| byte == 0) {
            if !collapsed {
                writeln!(f, "{}...", INDENT)?;
                collapsed = true;
            }
            continue;
        }
        collapsed = false;

        write!(f, "{}{:#06X}:", INDENT, row * MEMORY_ROW)?;
        for byte in chunk {
            write!(f, " {:02X}", byte)?;
        }
        writeln!(f)?;
    }

    Ok(())
}
