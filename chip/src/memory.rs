//! The flat ram of the chip.
use crate::{
    definitions::{display::fontset, memory},
    opcode::Opcode,
    MemoryError,
};

/// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
/// - `0x050-0x0A0` - Used for the built in `4x5` pixel font set (`0-F`)
/// - `0x200-0xFFF` - Program ROM and work RAM
///
/// Every access is bounds checked, an invalid address is reported as
/// [`MemoryError::OutOfBounds`] and never wraps.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    data: Box<[u8; memory::SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            data: Box::new([0; memory::SIZE]),
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("len", &self.data.len())
            .finish()
    }
}

impl Memory {
    pub fn new() -> Self {
        Default::default()
    }

    /// Memory with the built in fontset at [`fontset::LOCATION`].
    pub fn with_fontset() -> Self {
        let mut memory = Self::new();
        memory.data[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);
        memory
    }

    /// The amount of addressable bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn check(&self, address: usize, len: usize) -> Result<(), MemoryError> {
        match address.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(MemoryError::OutOfBounds { address, len }),
        }
    }

    pub fn read(&self, address: usize) -> Result<u8, MemoryError> {
        self.check(address, 1)?;
        Ok(self.data[address])
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        self.check(address, 1)?;
        self.data[address] = value;
        Ok(())
    }

    /// Will read the big-endian word at `address` and `address + 1`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::memory::Memory;
    /// let mut memory = Memory::new();
    /// memory.load(0x200, &[0x1E, 0xDA]).unwrap();
    /// assert_eq!(memory.read16(0x200), Ok(0x1EDA));
    /// assert!(memory.read16(0xFFF).is_err());
    /// ```
    pub fn read16(&self, address: usize) -> Result<Opcode, MemoryError> {
        self.check(address, 2)?;
        Ok(Opcode::from_be_bytes([
            self.data[address],
            self.data[address + 1],
        ]))
    }

    /// Will return `len` bytes starting at `address`.
    pub fn read_slice(&self, address: usize, len: usize) -> Result<&[u8], MemoryError> {
        self.check(address, len)?;
        Ok(&self.data[address..(address + len)])
    }

    /// Will write the whole slice starting at `address`, if any part of the
    /// slice would end up outside of the memory nothing is written.
    pub fn write_slice(&mut self, address: usize, values: &[u8]) -> Result<(), MemoryError> {
        self.check(address, values.len())?;
        self.data[address..(address + values.len())].copy_from_slice(values);
        Ok(())
    }

    /// Copies the data verbatim into memory beginning at `offset`.
    pub fn load(&mut self, offset: usize, data: &[u8]) -> Result<(), MemoryError> {
        self.write_slice(offset, data)
    }

    /// The raw memory, used for dumping the state.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut memory = Memory::new();
        for address in (0..memory::SIZE).step_by(7) {
            let value = (address % 251) as u8;
            assert_eq!(Ok(()), memory.write(address, value));
            assert_eq!(Ok(value), memory.read(address));
        }
        let last = memory::SIZE - 1;
        assert_eq!(Ok(()), memory.write(last, 0xAB));
        assert_eq!(Ok(0xAB), memory.read(last));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut memory = Memory::new();
        let err = MemoryError::OutOfBounds {
            address: memory::SIZE,
            len: 1,
        };
        assert_eq!(Err(err), memory.read(memory::SIZE));
        assert_eq!(Err(err), memory.write(memory::SIZE, 1));
        assert!(memory.read(usize::MAX).is_err());
    }

    #[test]
    fn test_read16() {
        let mut memory = Memory::new();
        memory.load(0x300, &[0x00, 0xEE, 0x1E, 0xDA]).unwrap();
        assert_eq!(Ok(0x00EE), memory.read16(0x300));
        assert_eq!(Ok(0xEE1E), memory.read16(0x301));
        assert_eq!(Ok(0x1EDA), memory.read16(0x302));

        assert!(memory.read16(memory::SIZE - 2).is_ok());
        assert_eq!(
            Err(MemoryError::OutOfBounds {
                address: memory::SIZE - 1,
                len: 2
            }),
            memory.read16(memory::SIZE - 1)
        );
    }

    #[test]
    fn test_fontset() {
        let memory = Memory::with_fontset();
        assert_eq!(
            Ok(&fontset::FONTSET[..]),
            memory.read_slice(fontset::LOCATION, fontset::FONTSET.len())
        );
        assert_eq!(Ok(0), memory.read(fontset::LOCATION - 1));
        assert_eq!(Ok(0), memory.read(fontset::LOCATION + fontset::FONTSET.len()));
    }

    #[test]
    fn test_slices() {
        let mut memory = Memory::new();
        assert_eq!(Ok(()), memory.write_slice(0x10, &[1, 2, 3]));
        assert_eq!(Ok(&[1u8, 2, 3][..]), memory.read_slice(0x10, 3));

        // nothing may be written if the slice does not fit
        let before = memory.clone();
        assert!(memory.write_slice(memory::SIZE - 2, &[9, 9, 9]).is_err());
        assert_eq!(before, memory);
        assert!(memory.read_slice(memory::SIZE - 2, 3).is_err());
        assert_eq!(Ok(&[][..]), memory.read_slice(memory::SIZE, 0));
    }
}
