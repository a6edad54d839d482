//! Loading of programs.
use std::{fs, path::Path};

use crate::{
    definitions::{cpu, memory},
    RomError,
};

/// The biggest program that fits into memory.
pub const MAX_SIZE: usize = memory::SIZE - cpu::PROGRAM_COUNTER;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program, copied verbatim into memory
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, fails if the data
    /// does not fit into memory.
    pub fn new(name: &str, data: impl Into<Box<[u8]>>) -> Result<Self, RomError> {
        let data = data.into();
        if data.len() > MAX_SIZE {
            return Err(RomError::TooLarge {
                name: name.to_string(),
                len: data.len(),
                max: MAX_SIZE,
            });
        }
        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will read the rom from the file system, the file name is used as the
    /// rom name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::debug!("reading rom {} from {}", name, path.display());

        let data = fs::read(path).map_err(|source| RomError::Io {
            name: name.clone(),
            source,
        })?;
        Self::new(&name, data)
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_size() {
        assert!(Rom::new("fits", vec![0; MAX_SIZE]).is_ok());
        match Rom::new("big", vec![0; MAX_SIZE + 1]) {
            Err(RomError::TooLarge { len, max, .. }) => {
                assert_eq!(MAX_SIZE + 1, len);
                assert_eq!(MAX_SIZE, max);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("chip8-rom-{}", std::process::id()));
        fs::write(&path, [0x00, 0xE0, 0x12, 0x00]).unwrap();

        let rom = Rom::from_file(&path).unwrap();
        assert_eq!(&[0x00, 0xE0, 0x12, 0x00], rom.get_data());
        assert!(rom.get_name().starts_with("chip8-rom-"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = Rom::from_file("/this/rom/does/not/exist").unwrap_err();
        assert!(matches!(err, RomError::Io { .. }));
        assert!(err.to_string().contains("exist"));
    }
}
