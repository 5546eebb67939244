//! ZX80/ZX81 memory map.
//!
//! One flat 64 KiB array. Addresses above RAM top fold back onto the
//! decoded range (`address & ram_top`), which is how the display file is
//! seen again above 0x8000. With the shadow ROM enabled the ROM also
//! repeats up to 0x3FFF.

use log::warn;
use thiserror::Error;

use crate::config::MachineConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM image too short: loaded {loaded} of {expected} bytes")]
    Incomplete { expected: usize, loaded: usize },
}

/// Top of the area the shadow ROM repeats into.
const SHADOW_END: u16 = 0x3FFF;

pub struct Memory {
    data: Vec<u8>,
    rom_top: u16,
    ram_top: u16,
    protect_rom: bool,
    shadow_rom: bool,
}

impl Memory {
    #[must_use]
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            data: vec![0; 0x1_0000],
            rom_top: config.rom_top,
            ram_top: config.ram_top,
            protect_rom: config.protect_rom,
            shadow_rom: config.shadow_rom,
        }
    }

    /// Physical location of `address`.
    fn decode(&self, address: u16) -> usize {
        let mut address = address;
        if address > self.ram_top {
            address &= self.ram_top;
        }
        if self.shadow_rom && address > self.rom_top && address <= SHADOW_END {
            address &= self.rom_top;
        }
        usize::from(address)
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        self.data[self.decode(address)]
    }

    /// CPU write. Dropped when it lands in protected ROM.
    pub fn write(&mut self, address: u16, value: u8) {
        let location = self.decode(address);
        if self.protect_rom && location <= usize::from(self.rom_top) {
            return;
        }
        self.data[location] = value;
    }

    /// Store bytes with no decoding or protection, wrapping at 64 KiB.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            let location = address.wrapping_add(offset as u16);
            self.data[usize::from(location)] = byte;
        }
    }

    /// Copy a ROM image to address 0.
    ///
    /// A short image is loaded as far as it goes and reported; the rest of
    /// the ROM area keeps its contents. A long one is cut at ROM top.
    ///
    /// # Errors
    ///
    /// [`LoadError::Incomplete`] when the image does not fill the ROM.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), LoadError> {
        let expected = usize::from(self.rom_top) + 1;
        if image.len() > expected {
            warn!(
                "ROM image is {} bytes, using the first {expected}",
                image.len()
            );
        }
        let loaded = image.len().min(expected);
        self.data[..loaded].copy_from_slice(&image[..loaded]);
        if loaded < expected {
            return Err(LoadError::Incomplete { expected, loaded });
        }
        Ok(())
    }

    #[must_use]
    pub fn rom_top(&self) -> u16 {
        self.rom_top
    }

    #[must_use]
    pub fn ram_top(&self) -> u16 {
        self.ram_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zx81_1k() -> Memory {
        Memory::new(&MachineConfig {
            ram_top: 0x43FF,
            ..MachineConfig::zx81()
        })
    }

    #[test]
    fn rom_is_write_protected() {
        let mut memory = Memory::new(&MachineConfig::zx81());
        memory.load(0x0100, &[0xAA]);
        memory.write(0x0100, 0x55);
        assert_eq!(memory.read(0x0100), 0xAA);
    }

    #[test]
    fn unprotected_rom_accepts_writes() {
        let mut memory = Memory::new(&MachineConfig {
            protect_rom: false,
            ..MachineConfig::zx81()
        });
        memory.write(0x0100, 0x55);
        assert_eq!(memory.read(0x0100), 0x55);
    }

    #[test]
    fn shadow_rom_mirror() {
        let mut memory = Memory::new(&MachineConfig::zx81());
        memory.load(0x0123, &[0x42]);
        assert_eq!(memory.read(0x2123), 0x42);
        memory.write(0x2123, 0x00);
        assert_eq!(memory.read(0x0123), 0x42);
    }

    #[test]
    fn no_shadow_rom_leaves_space_free() {
        let mut memory = Memory::new(&MachineConfig {
            shadow_rom: false,
            ..MachineConfig::zx81()
        });
        memory.write(0x2123, 0x99);
        assert_eq!(memory.read(0x2123), 0x99);
        assert_eq!(memory.read(0x0123), 0x00);
    }

    #[test]
    fn ram_mirrors_above_top() {
        let mut memory = zx81_1k();
        memory.write(0x4009, 0x77);
        assert_eq!(memory.read(0x4409), 0x77);
        assert_eq!(memory.read(0xC009), 0x77);
        memory.write(0x4C00, 0x12);
        assert_eq!(memory.read(0x4000), 0x12);
    }

    #[test]
    fn display_file_visible_above_32k() {
        let mut memory = Memory::new(&MachineConfig::zx81());
        memory.write(0x4500, 0x3F);
        assert_eq!(memory.read(0xC500), 0x3F);
    }

    #[test]
    fn short_rom_loads_partially() {
        let mut memory = Memory::new(&MachineConfig::zx81());
        memory.load(0x1000, &[0xEE]);
        let result = memory.load_rom(&[1, 2, 3]);
        assert_eq!(
            result,
            Err(LoadError::Incomplete {
                expected: 0x2000,
                loaded: 3
            })
        );
        assert_eq!(memory.read(0x0002), 3);
        assert_eq!(memory.read(0x1000), 0xEE);
    }

    #[test]
    fn long_rom_is_truncated() {
        let mut memory = Memory::new(&MachineConfig::zx80());
        let image = vec![0x11; 0x2000];
        assert!(memory.load_rom(&image).is_ok());
        assert_eq!(memory.read(0x0FFF), 0x11);
        assert_eq!(memory.read(0x4000), 0x00);
    }
}
