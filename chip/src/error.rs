use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
    #[error("Invalid display access '{0}'.")]
    Display(#[from] DisplayError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
}

impl ProcessError {
    /// Decides if the machine state can still be trusted after the error.
    ///
    /// An unknown opcode leaves the machine untouched, so the caller can skip
    /// it and carry on. Everything else means the program corrupted the
    /// machine state.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProcessError::Opcode(OpcodeError::InvalidOpcode(_)))
    }
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MemoryError {
    #[error("Address {address:#06X} with length {len} is outside of the memory.")]
    OutOfBounds { address: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DisplayError {
    #[error("Pixel ({x}, {y}) is outside of the display.")]
    OutOfBounds { x: usize, y: usize },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

/// Startup errors, these are never recoverable.
#[derive(Error, Debug)]
pub enum RomError {
    #[error("Unable to read the rom '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("The rom '{name}' is {len} bytes long, but only {max} bytes fit into memory.")]
    TooLarge { name: String, len: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(!ProcessError::from(OpcodeError::InvalidOpcode(0x8128)).is_fatal());
        assert!(ProcessError::from(StackError::Full).is_fatal());
        assert!(ProcessError::from(StackError::Empty).is_fatal());
        assert!(ProcessError::from(MemoryError::OutOfBounds {
            address: 0x1000,
            len: 1
        })
        .is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = ProcessError::from(OpcodeError::InvalidOpcode(0x00EA));
        assert_eq!(
            "Invalid opcode state 'An unsupported opcode was used 0x00EA.'.",
            err.to_string()
        );
        assert_eq!("Stack is full!", StackError::Full.to_string());
    }
}
