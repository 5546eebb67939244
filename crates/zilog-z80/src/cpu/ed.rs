//! `ED` page: 16-bit arithmetic, I/R transfers, interrupt modes and the
//! block transfer/compare/I/O instructions.

#![allow(clippy::match_same_arms)]

use emu_core::Bus;

use crate::alu;
use crate::flags::{CF, HALFCARRY_SUB, HF, NF, PARITY, PF, SF, SZ53, SZ53P, XF, YF, ZF};
use crate::registers::{Half, RegisterPair};

use super::Z80;

impl Z80 {
    pub(super) fn execute_ed<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let op = self.fetch_opcode(bus);
        let code = (op >> 3) & 0x07;

        match op {
            // IN r, (C); 0x70 only sets flags
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let value = self.port_in(bus, self.regs.bc.get());
                self.regs.set_f((self.regs.f() & CF) | SZ53P[value as usize]);
                if code != 6 {
                    self.set_reg8(code, value);
                }
            }

            // OUT (C), r; 0x71 outputs zero
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let value = if code == 6 { 0 } else { self.reg8(code) };
                self.port_out(bus, self.regs.bc.get(), value);
            }

            // SBC HL, rr
            0x42 | 0x52 | 0x62 | 0x72 => {
                self.internal(bus, self.regs.ir(), 7);
                let (result, flags) =
                    alu::sbc16(self.regs.hl.get(), self.reg16(op >> 4), self.regs.f());
                self.regs.hl.set(result);
                self.regs.set_f(flags);
            }

            // ADC HL, rr
            0x4A | 0x5A | 0x6A | 0x7A => {
                self.internal(bus, self.regs.ir(), 7);
                let (result, flags) =
                    alu::adc16(self.regs.hl.get(), self.reg16(op >> 4), self.regs.f());
                self.regs.hl.set(result);
                self.regs.set_f(flags);
            }

            // LD (nn), rr
            0x43 | 0x53 | 0x63 | 0x73 => {
                let address = self.fetch_word(bus);
                let value = self.reg16(op >> 4);
                self.write_word(bus, address, value);
            }

            // LD rr, (nn)
            0x4B | 0x5B | 0x6B | 0x7B => {
                let address = self.fetch_word(bus);
                let value = self.read_word(bus, address);
                self.set_reg16(op >> 4, value);
            }

            // NEG
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let result = alu::sub8(0, self.regs.a());
                self.regs.set_a(result.value);
                self.regs.set_f(result.flags);
            }

            // RETN / RETI
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.regs.iff1 = self.regs.iff2;
                self.regs.pc = self.pop(bus);
            }

            // IM 0 / IM 1 / IM 2
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = 0,
            0x56 | 0x76 => self.regs.im = 1,
            0x5E | 0x7E => self.regs.im = 2,

            // LD I, A
            0x47 => {
                self.internal(bus, self.regs.ir(), 1);
                self.regs.i = self.regs.a();
            }

            // LD R, A
            0x4F => {
                self.internal(bus, self.regs.ir(), 1);
                let a = self.regs.a();
                self.regs.set_r(a);
            }

            // LD A, I / LD A, R
            0x57 | 0x5F => {
                self.internal(bus, self.regs.ir(), 1);
                let value = if op == 0x57 {
                    self.regs.i
                } else {
                    self.regs.r_value()
                };
                self.regs.set_a(value);
                let mut flags = (self.regs.f() & CF) | SZ53[value as usize];
                if self.regs.iff2 {
                    flags |= PF;
                }
                self.regs.set_f(flags);
            }

            // RRD / RLD
            0x67 | 0x6F => {
                let hl = self.regs.hl.get();
                let value = self.read(bus, hl);
                self.internal(bus, hl, 4);
                let a = self.regs.a();
                let (memory, acc) = if op == 0x67 {
                    ((a << 4) | (value >> 4), (a & 0xF0) | (value & 0x0F))
                } else {
                    ((value << 4) | (a & 0x0F), (a & 0xF0) | (value >> 4))
                };
                self.write(bus, hl, memory);
                self.regs.set_a(acc);
                self.regs.set_f((self.regs.f() & CF) | SZ53P[acc as usize]);
            }

            // Block instructions
            0xA0 => self.block_load(bus, true, false),
            0xA8 => self.block_load(bus, false, false),
            0xB0 => self.block_load(bus, true, true),
            0xB8 => self.block_load(bus, false, true),

            0xA1 => self.block_compare(bus, true, false),
            0xA9 => self.block_compare(bus, false, false),
            0xB1 => self.block_compare(bus, true, true),
            0xB9 => self.block_compare(bus, false, true),

            0xA2 => self.block_in(bus, true, false),
            0xAA => self.block_in(bus, false, false),
            0xB2 => self.block_in(bus, true, true),
            0xBA => self.block_in(bus, false, true),

            0xA3 => self.block_out(bus, true, false),
            0xAB => self.block_out(bus, false, false),
            0xB3 => self.block_out(bus, true, true),
            0xBB => self.block_out(bus, false, true),

            // Everything else is an 8 T-state no-op
            _ => {}
        }
    }

    /// Step HL (and DE) one element in the block direction.
    fn block_step(pair: &mut RegisterPair, forward: bool) {
        if forward {
            pair.inc();
        } else {
            pair.dec();
        }
    }

    /// Rewind PC over the two opcode bytes so the instruction runs again.
    fn block_repeat<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16) {
        self.internal(bus, address, 5);
        self.regs.pc = self.regs.pc.wrapping_sub(2);
    }

    /// LDI / LDD / LDIR / LDDR
    fn block_load<B: Bus + ?Sized>(&mut self, bus: &mut B, forward: bool, repeat: bool) {
        let hl = self.regs.hl.get();
        let de = self.regs.de.get();
        let value = self.read(bus, hl);
        let bc = self.regs.bc.dec();
        self.write(bus, de, value);
        self.internal(bus, de, 2);
        Self::block_step(&mut self.regs.hl, forward);
        Self::block_step(&mut self.regs.de, forward);

        let n = value.wrapping_add(self.regs.a());
        let mut flags = (self.regs.f() & (CF | ZF | SF)) | (n & XF);
        if n & 0x02 != 0 {
            flags |= YF;
        }
        if bc != 0 {
            flags |= PF;
        }
        self.regs.set_f(flags);

        if repeat && bc != 0 {
            self.block_repeat(bus, de);
        }
    }

    /// CPI / CPD / CPIR / CPDR
    fn block_compare<B: Bus + ?Sized>(&mut self, bus: &mut B, forward: bool, repeat: bool) {
        let hl = self.regs.hl.get();
        let value = self.read(bus, hl);
        let a = self.regs.a();
        let diff = a.wrapping_sub(value);
        let lookup = (((a & 0x08) >> 3) | ((value & 0x08) >> 2) | ((diff & 0x08) >> 1)) as usize;
        self.internal(bus, hl, 5);
        Self::block_step(&mut self.regs.hl, forward);
        let bc = self.regs.bc.dec();

        let mut flags = (self.regs.f() & CF) | NF | HALFCARRY_SUB[lookup] | (diff & SF);
        if bc != 0 {
            flags |= PF;
        }
        if diff == 0 {
            flags |= ZF;
        }
        let n = if flags & HF != 0 {
            diff.wrapping_sub(1)
        } else {
            diff
        };
        flags |= n & XF;
        if n & 0x02 != 0 {
            flags |= YF;
        }
        self.regs.set_f(flags);

        if repeat && bc != 0 && diff != 0 {
            self.block_repeat(bus, hl);
        }
    }

    /// Flags shared by the block I/O instructions.
    fn block_io_flags(&mut self, value: u8, n: u8) {
        let b = self.regs.b();
        let mut flags = SZ53[b as usize] | PARITY[((n & 0x07) ^ b) as usize];
        if value & 0x80 != 0 {
            flags |= NF;
        }
        if n < value {
            flags |= HF | CF;
        }
        self.regs.set_f(flags);
    }

    /// INI / IND / INIR / INDR
    fn block_in<B: Bus + ?Sized>(&mut self, bus: &mut B, forward: bool, repeat: bool) {
        self.internal(bus, self.regs.ir(), 1);
        let hl = self.regs.hl.get();
        let value = self.port_in(bus, self.regs.bc.get());
        self.write(bus, hl, value);
        let b = self.regs.bc.dec_half(Half::High);
        Self::block_step(&mut self.regs.hl, forward);

        let c = self.regs.c();
        let k = if forward {
            c.wrapping_add(1)
        } else {
            c.wrapping_sub(1)
        };
        self.block_io_flags(value, value.wrapping_add(k));

        if repeat && b != 0 {
            self.block_repeat(bus, hl);
        }
    }

    /// OUTI / OUTD / OTIR / OTDR. B is decremented before the port write.
    fn block_out<B: Bus + ?Sized>(&mut self, bus: &mut B, forward: bool, repeat: bool) {
        self.internal(bus, self.regs.ir(), 1);
        let value = self.read(bus, self.regs.hl.get());
        let b = self.regs.bc.dec_half(Half::High);
        self.port_out(bus, self.regs.bc.get(), value);
        Self::block_step(&mut self.regs.hl, forward);

        let n = value.wrapping_add(self.regs.l());
        self.block_io_flags(value, n);

        if repeat && b != 0 {
            self.block_repeat(bus, self.regs.bc.get());
        }
    }
}
