//! Z80 CPU core with instruction-level stepping and per-access timing.
//!
//! `step()` runs exactly one instruction. Every memory, I/O and internal
//! cycle is charged to the bus through `contend_mem`/`contend_io` in the
//! order the hardware performs them, and the sum of the requested T-states
//! plus any wait states the bus adds is returned.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.
#![allow(clippy::cast_possible_wrap)] // Intentional i8 casts for displacements.

mod cb;
mod ed;
mod execute;
mod index;

use emu_core::{Bus, Cpu, Observable, Ticks, Value};

use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use crate::registers::{RegisterPair, Registers};

/// Index register selected by a `DD` or `FD` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexReg {
    Ix,
    Iy,
}

/// Z80 CPU.
///
/// The CPU does not own the bus. It is passed to `step()` for each
/// instruction so the machine can share it with its video logic.
pub struct Z80 {
    pub(crate) regs: Registers,
    /// T-states charged so far in the current instruction or interrupt.
    elapsed: u32,
    /// Set by `EI`: no maskable interrupt before the next instruction.
    ei_delay: bool,
    total_ticks: Ticks,
}

impl Z80 {
    /// Create a new Z80 in its reset state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            elapsed: 0,
            ei_delay: false,
            total_ticks: Ticks::ZERO,
        }
    }

    /// Mutable access to the register file, for loaders and debuggers.
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub fn regs(&self) -> &Registers {
        &self.regs
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
    }

    pub fn set_sp(&mut self, sp: u16) {
        self.regs.sp = sp;
    }

    #[must_use]
    pub fn sp(&self) -> u16 {
        self.regs.sp
    }

    #[must_use]
    pub fn a(&self) -> u8 {
        self.regs.a()
    }

    #[must_use]
    pub fn f(&self) -> u8 {
        self.regs.f()
    }

    #[must_use]
    pub fn bc(&self) -> u16 {
        self.regs.bc.get()
    }

    #[must_use]
    pub fn de(&self) -> u16 {
        self.regs.de.get()
    }

    #[must_use]
    pub fn hl(&self) -> u16 {
        self.regs.hl.get()
    }

    /// The full R register, bit 7 included.
    #[must_use]
    pub fn r(&self) -> u8 {
        self.regs.r_value()
    }

    #[must_use]
    pub fn i(&self) -> u8 {
        self.regs.i
    }

    /// True directly after `EI`, while interrupts are still held off.
    #[must_use]
    pub fn ei_pending(&self) -> bool {
        self.ei_delay
    }

    /// Total T-states executed since creation.
    #[must_use]
    pub fn total_ticks(&self) -> Ticks {
        self.total_ticks
    }

    // =========================================================================
    // Bus cycles
    // =========================================================================

    /// Charge a cycle of `tstates` at `address`, plus any wait states.
    fn charge<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16, tstates: u32) {
        let extra = bus.contend_mem(address, self.elapsed, tstates);
        self.elapsed += tstates + extra;
    }

    /// Internal cycles with `address` on the bus, charged one T-state at a
    /// time.
    fn internal<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16, count: u32) {
        for _ in 0..count {
            self.charge(bus, address, 1);
        }
    }

    /// M1 cycle: 4 T-states, opcode through the fetch hook, R advanced.
    fn fetch_opcode<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc;
        self.charge(bus, pc, 4);
        let opcode = bus.opcode_fetch(pc, self.regs.ir());
        self.regs.pc = pc.wrapping_add(1);
        self.regs.inc_r();
        opcode
    }

    fn read<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.charge(bus, address, 3);
        bus.read_byte(address)
    }

    fn write<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.charge(bus, address, 3);
        bus.write_byte(address, value);
    }

    fn read_word<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16) -> u16 {
        let lo = self.read(bus, address);
        let hi = self.read(bus, address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write_word<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(bus, address, lo);
        self.write(bus, address.wrapping_add(1), hi);
    }

    /// Immediate byte at PC.
    fn fetch_byte<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        self.read(bus, pc)
    }

    /// Immediate little-endian word at PC.
    fn fetch_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write(bus, self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write(bus, self.regs.sp, lo);
    }

    fn pop<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.read(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    fn port_in<B: Bus + ?Sized>(&mut self, bus: &mut B, port: u16) -> u8 {
        let extra = bus.contend_io(port, self.elapsed, 4);
        self.elapsed += 4 + extra;
        bus.read_port(port)
    }

    fn port_out<B: Bus + ?Sized>(&mut self, bus: &mut B, port: u16, value: u8) {
        let extra = bus.contend_io(port, self.elapsed, 4);
        self.elapsed += 4 + extra;
        bus.write_port(port, value);
    }

    // =========================================================================
    // Register decoding
    // =========================================================================

    /// 8-bit register by its 3-bit opcode field. Code 6 is `(HL)` and is
    /// handled by the callers.
    fn reg8(&self, code: u8) -> u8 {
        match code & 0x07 {
            0 => self.regs.bc.hi(),
            1 => self.regs.bc.lo(),
            2 => self.regs.de.hi(),
            3 => self.regs.de.lo(),
            4 => self.regs.hl.hi(),
            5 => self.regs.hl.lo(),
            7 => self.regs.a(),
            _ => unreachable!("(HL) is not a register"),
        }
    }

    fn set_reg8(&mut self, code: u8, value: u8) {
        match code & 0x07 {
            0 => self.regs.bc.set_hi(value),
            1 => self.regs.bc.set_lo(value),
            2 => self.regs.de.set_hi(value),
            3 => self.regs.de.set_lo(value),
            4 => self.regs.hl.set_hi(value),
            5 => self.regs.hl.set_lo(value),
            7 => self.regs.set_a(value),
            _ => unreachable!("(HL) is not a register"),
        }
    }

    /// 16-bit register by its 2-bit opcode field (BC, DE, HL, SP).
    fn reg16(&self, code: u8) -> u16 {
        match code & 0x03 {
            0 => self.regs.bc.get(),
            1 => self.regs.de.get(),
            2 => self.regs.hl.get(),
            _ => self.regs.sp,
        }
    }

    fn set_reg16(&mut self, code: u8, value: u16) {
        match code & 0x03 {
            0 => self.regs.bc.set(value),
            1 => self.regs.de.set(value),
            2 => self.regs.hl.set(value),
            _ => self.regs.sp = value,
        }
    }

    fn index(&self, which: IndexReg) -> RegisterPair {
        match which {
            IndexReg::Ix => self.regs.ix,
            IndexReg::Iy => self.regs.iy,
        }
    }

    fn index_mut(&mut self, which: IndexReg) -> &mut RegisterPair {
        match which {
            IndexReg::Ix => &mut self.regs.ix,
            IndexReg::Iy => &mut self.regs.iy,
        }
    }

    /// Condition by its 3-bit opcode field (NZ Z NC C PO PE P M).
    fn condition(&self, code: u8) -> bool {
        let f = self.regs.f();
        match code & 0x07 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    /// Accumulator ALU operation by its 3-bit opcode field.
    fn alu_a(&mut self, op: u8, value: u8) {
        let a = self.regs.a();
        let f = self.regs.f();
        let result = match op & 0x07 {
            0 => alu::add8(a, value),
            1 => alu::adc8(a, value, f),
            2 => alu::sub8(a, value),
            3 => alu::sbc8(a, value, f),
            4 => alu::and8(a, value),
            5 => alu::xor8(a, value),
            6 => alu::or8(a, value),
            _ => {
                self.regs.set_f(alu::cp8(a, value));
                return;
            }
        };
        self.regs.set_a(result.value);
        self.regs.set_f(result.flags);
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.elapsed = 0;
        self.ei_delay = false;
        let opcode = self.fetch_opcode(bus);
        self.execute_base(bus, opcode);
        self.total_ticks += self.elapsed;
        self.elapsed
    }

    fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        if !self.regs.iff1 || self.ei_delay {
            return 0;
        }
        self.elapsed = 0;
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.inc_r();

        // Acknowledge cycle: M1 plus two automatic wait states
        self.internal(bus, self.regs.ir(), 7);
        let pc = self.regs.pc;
        self.push(bus, pc);

        if self.regs.im == 2 {
            let vector = (u16::from(self.regs.i) << 8) | 0xFF;
            self.regs.pc = self.read_word(bus, vector);
        } else {
            self.regs.pc = 0x0038;
        }

        self.total_ticks += self.elapsed;
        self.elapsed
    }

    fn nmi<B: Bus + ?Sized>(&mut self, bus: &mut B, halt_wait: u32) -> u32 {
        self.elapsed = 0;
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
            self.elapsed += halt_wait;
        }
        self.regs.iff1 = false;
        self.regs.inc_r();

        self.internal(bus, self.regs.ir(), 5);
        let pc = self.regs.pc;
        self.push(bus, pc);
        self.regs.pc = 0x0066;

        self.total_ticks += self.elapsed;
        self.elapsed
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn reset(&mut self) {
        self.regs = Registers::default();
        self.ei_delay = false;
        self.elapsed = 0;
    }
}

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        let f = regs.f();
        match path {
            // Main registers
            "a" => Some(regs.a().into()),
            "f" => Some(f.into()),
            "b" => Some(regs.bc.hi().into()),
            "c" => Some(regs.bc.lo().into()),
            "d" => Some(regs.de.hi().into()),
            "e" => Some(regs.de.lo().into()),
            "h" => Some(regs.hl.hi().into()),
            "l" => Some(regs.hl.lo().into()),

            // Register pairs
            "af" => Some(regs.af.get().into()),
            "bc" => Some(regs.bc.get().into()),
            "de" => Some(regs.de.get().into()),
            "hl" => Some(regs.hl.get().into()),
            "af'" => Some(regs.af_alt.into()),
            "bc'" => Some(regs.bc_alt.into()),
            "de'" => Some(regs.de_alt.into()),
            "hl'" => Some(regs.hl_alt.into()),

            // Index registers
            "ix" => Some(regs.ix.get().into()),
            "iy" => Some(regs.iy.get().into()),
            "ixh" => Some(regs.ix.hi().into()),
            "ixl" => Some(regs.ix.lo().into()),
            "iyh" => Some(regs.iy.hi().into()),
            "iyl" => Some(regs.iy.lo().into()),

            "sp" => Some(regs.sp.into()),
            "pc" => Some(regs.pc.into()),
            "i" => Some(regs.i.into()),
            "r" => Some(regs.r_value().into()),

            // Individual flags
            "flags.s" => Some((f & SF != 0).into()),
            "flags.z" => Some((f & ZF != 0).into()),
            "flags.y" => Some((f & YF != 0).into()),
            "flags.h" => Some((f & HF != 0).into()),
            "flags.x" => Some((f & XF != 0).into()),
            "flags.p" => Some((f & PF != 0).into()),
            "flags.n" => Some((f & NF != 0).into()),
            "flags.c" => Some((f & CF != 0).into()),

            // Interrupt state
            "iff1" => Some(regs.iff1.into()),
            "iff2" => Some(regs.iff2.into()),
            "im" => Some(regs.im.into()),
            "halted" => Some(regs.halted.into()),

            "ticks" => Some(self.total_ticks.get().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "a", "f", "b", "c", "d", "e", "h", "l", "af", "bc", "de", "hl", "af'", "bc'", "de'",
            "hl'", "ix", "iy", "ixh", "ixl", "iyh", "iyl", "sp", "pc", "i", "r", "flags.s",
            "flags.z", "flags.y", "flags.h", "flags.x", "flags.p", "flags.n", "flags.c", "iff1",
            "iff2", "im", "halted", "ticks",
        ]
    }
}
