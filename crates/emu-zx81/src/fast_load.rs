//! ROM LOAD fast path.
//!
//! When the CPU reaches the ROM's tape-load entry point and a record is
//! queued, the record is copied straight into memory and the CPU is sent
//! to the ROM's "load finished" code, skipping the bit-by-bit tape read.
//! The opcode at the entry point is checked so a replacement ROM is left
//! alone.

use emu_core::Cpu;
use log::debug;
use zilog_z80::Z80;

use crate::memory::Memory;
use crate::tape::TapeSource;

/// A ROM's LOAD routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadEntry {
    /// Address the trap fires at.
    pub pc: u16,
    /// Opcode expected there.
    pub opcode: u8,
    /// Where the loaded bytes go.
    pub destination: u16,
    /// Where execution resumes.
    pub resume: u16,
}

/// ZX81 ROM: bytes load from the system variables at 0x4009.
pub const ZX81_LOAD: LoadEntry = LoadEntry {
    pc: 0x0356,
    opcode: 0x1F,
    destination: 0x4009,
    resume: 0x0207,
};

/// ZX80 ROM: bytes load from the start of RAM.
pub const ZX80_LOAD: LoadEntry = LoadEntry {
    pc: 0x0222,
    opcode: 0x3E,
    destination: 0x4000,
    resume: 0x0203,
};

/// Bytes of `record` taken up by the program name: everything up to and
/// including the first byte with bit 7 set. A record with no such byte
/// has no name.
#[must_use]
pub fn name_length(record: &[u8]) -> usize {
    record
        .iter()
        .position(|&byte| byte & 0x80 != 0)
        .map_or(0, |index| index + 1)
}

/// Complete a LOAD from `tape` if the CPU is at a LOAD entry point.
///
/// Returns true when a record was loaded. With no record queued the CPU
/// carries on into the real tape routine.
pub fn try_fast_load(cpu: &mut Z80, memory: &mut Memory, tape: &mut dyn TapeSource) -> bool {
    let pc = cpu.pc();
    let Some(entry) = [ZX81_LOAD, ZX80_LOAD]
        .into_iter()
        .find(|entry| entry.pc == pc && memory.read(pc) == entry.opcode)
    else {
        return false;
    };
    let Some(record) = tape.next_entry() else {
        return false;
    };

    let data = &record[name_length(&record)..];
    for (offset, &byte) in data.iter().enumerate() {
        memory.write(entry.destination.wrapping_add(offset as u16), byte);
    }

    // Drop the return address pushed by the call into the LOAD routine.
    cpu.set_sp(cpu.sp().wrapping_add(2));
    cpu.set_pc(entry.resume);
    debug!(
        "Fast load: {} bytes to {:#06X}, resuming at {:#06X}",
        data.len(),
        entry.destination,
        entry.resume
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineConfig;
    use crate::tape::TapeDeck;

    fn setup(entry: LoadEntry) -> (Z80, Memory) {
        let mut memory = Memory::new(&MachineConfig::zx81());
        memory.load(entry.pc, &[entry.opcode]);
        let mut cpu = Z80::new();
        cpu.set_pc(entry.pc);
        cpu.set_sp(0x7FF0);
        (cpu, memory)
    }

    #[test]
    fn name_length_includes_terminator() {
        assert_eq!(name_length(&[0x26, 0xA7, 0x00, 0x01]), 2);
        assert_eq!(name_length(&[0x80, 0xFF]), 1);
        assert_eq!(name_length(&[0x01, 0x02]), 0);
        assert_eq!(name_length(&[]), 0);
    }

    #[test]
    fn zx81_load_copies_image_after_name() {
        let (mut cpu, mut memory) = setup(ZX81_LOAD);
        let mut deck = TapeDeck::new();
        deck.push(vec![0x26, 0xA7, 0x11, 0x22, 0x33]);

        assert!(try_fast_load(&mut cpu, &mut memory, &mut deck));
        assert_eq!(memory.read(0x4009), 0x11);
        assert_eq!(memory.read(0x400A), 0x22);
        assert_eq!(memory.read(0x400B), 0x33);
        assert_eq!(memory.read(0x400C), 0x00);
        assert_eq!(cpu.sp(), 0x7FF2);
        assert_eq!(cpu.pc(), 0x0207);
        assert!(deck.is_empty());
    }

    #[test]
    fn zx80_load_targets_start_of_ram() {
        let (mut cpu, mut memory) = setup(ZX80_LOAD);
        let mut deck = TapeDeck::new();
        deck.push_zx80_program(&[0xFF, 0x80, 0x43]);

        assert!(try_fast_load(&mut cpu, &mut memory, &mut deck));
        assert_eq!(memory.read(0x4000), 0xFF);
        assert_eq!(memory.read(0x4001), 0x80);
        assert_eq!(memory.read(0x4002), 0x43);
        assert_eq!(cpu.pc(), 0x0203);
    }

    #[test]
    fn empty_tape_falls_through() {
        let (mut cpu, mut memory) = setup(ZX81_LOAD);
        let mut deck = TapeDeck::new();
        assert!(!try_fast_load(&mut cpu, &mut memory, &mut deck));
        assert_eq!(cpu.pc(), 0x0356);
        assert_eq!(cpu.sp(), 0x7FF0);
    }

    #[test]
    fn other_rom_is_not_trapped() {
        let (mut cpu, mut memory) = setup(ZX81_LOAD);
        memory.load(0x0356, &[0x00]);
        let mut deck = TapeDeck::new();
        deck.push(vec![0x80, 0x01]);
        assert!(!try_fast_load(&mut cpu, &mut memory, &mut deck));
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn only_at_entry_point() {
        let (mut cpu, mut memory) = setup(ZX81_LOAD);
        cpu.set_pc(0x0357);
        let mut deck = TapeDeck::new();
        deck.push(vec![0x80, 0x01]);
        assert!(!try_fast_load(&mut cpu, &mut memory, &mut deck));
    }
}
