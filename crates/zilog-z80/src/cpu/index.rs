//! `DD`/`FD` page: HL replaced by IX or IY.
//!
//! Opcodes that never touch H, L or (HL) are not part of the page. The
//! prefix then acts as a 4 T-state no-op and the opcode is left for the
//! next `step()` to run from the unprefixed page.

#![allow(clippy::match_same_arms)]

use emu_core::Bus;

use crate::alu;
use crate::registers::Half;

use super::{IndexReg, Z80};

impl Z80 {
    pub(super) fn execute_index<B: Bus + ?Sized>(&mut self, bus: &mut B, which: IndexReg) {
        let op = self.fetch_opcode(bus);

        match op {
            // ADD IX, rr (rr=BC, DE, IX, SP)
            0x09 | 0x19 | 0x29 | 0x39 => {
                self.internal(bus, self.regs.ir(), 7);
                let index = self.index(which).get();
                let value = match (op >> 4) & 0x03 {
                    2 => index,
                    code => self.reg16(code),
                };
                let (result, flags) = alu::add16(index, value, self.regs.f());
                self.index_mut(which).set(result);
                self.regs.set_f(flags);
            }

            // LD IX, nn
            0x21 => {
                let value = self.fetch_word(bus);
                self.index_mut(which).set(value);
            }

            // LD (nn), IX
            0x22 => {
                let address = self.fetch_word(bus);
                let value = self.index(which).get();
                self.write_word(bus, address, value);
            }

            // LD IX, (nn)
            0x2A => {
                let address = self.fetch_word(bus);
                let value = self.read_word(bus, address);
                self.index_mut(which).set(value);
            }

            // INC IX / DEC IX
            0x23 | 0x2B => {
                self.internal(bus, self.regs.ir(), 2);
                let pair = self.index_mut(which);
                if op == 0x23 {
                    pair.inc();
                } else {
                    pair.dec();
                }
            }

            // INC IXh / DEC IXh / INC IXl / DEC IXl
            0x24 | 0x25 | 0x2C | 0x2D => {
                let half = if op & 0x08 == 0 { Half::High } else { Half::Low };
                let value = self.index(which).half(half);
                let f = self.regs.f();
                let result = if op & 0x01 == 0 {
                    alu::inc8(value, f)
                } else {
                    alu::dec8(value, f)
                };
                self.index_mut(which).set_half(half, result.value);
                self.regs.set_f(result.flags);
            }

            // LD IXh, n / LD IXl, n
            0x26 | 0x2E => {
                let value = self.fetch_byte(bus);
                let half = if op == 0x26 { Half::High } else { Half::Low };
                self.index_mut(which).set_half(half, value);
            }

            // INC (IX+d) / DEC (IX+d)
            0x34 | 0x35 => {
                let address = self.index_address(bus, which);
                let value = self.read(bus, address);
                self.internal(bus, address, 1);
                let result = if op == 0x34 {
                    alu::inc8(value, self.regs.f())
                } else {
                    alu::dec8(value, self.regs.f())
                };
                self.write(bus, address, result.value);
                self.regs.set_f(result.flags);
            }

            // LD (IX+d), n
            0x36 => {
                let offset = self.fetch_byte(bus) as i8;
                let operand_pc = self.regs.pc;
                let value = self.fetch_byte(bus);
                self.internal(bus, operand_pc, 2);
                let address = self
                    .index(which)
                    .get()
                    .wrapping_add_signed(i16::from(offset));
                self.write(bus, address, value);
            }

            // LD r, (IX+d): the destination is the plain H or L
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
                let address = self.index_address(bus, which);
                let value = self.read(bus, address);
                self.set_reg8(op >> 3, value);
            }

            // LD (IX+d), r: the source is the plain H or L
            0x70..=0x75 | 0x77 => {
                let address = self.index_address(bus, which);
                let value = self.reg8(op);
                self.write(bus, address, value);
            }

            // LD r, r' with H/L replaced by IXh/IXl
            0x44 | 0x45 | 0x4C | 0x4D | 0x54 | 0x55 | 0x5C | 0x5D | 0x60..=0x65 | 0x67
            | 0x68..=0x6D | 0x6F | 0x7C | 0x7D => {
                let value = self.index_reg8(which, op);
                self.set_index_reg8(which, op >> 3, value);
            }

            // ALU A, IXh / ALU A, IXl
            0x84 | 0x85 | 0x8C | 0x8D | 0x94 | 0x95 | 0x9C | 0x9D | 0xA4 | 0xA5 | 0xAC | 0xAD
            | 0xB4 | 0xB5 | 0xBC | 0xBD => {
                let value = self.index_reg8(which, op);
                self.alu_a(op >> 3, value);
            }

            // ALU A, (IX+d)
            0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                let address = self.index_address(bus, which);
                let value = self.read(bus, address);
                self.alu_a(op >> 3, value);
            }

            // DDCB / FDCB
            0xCB => self.execute_index_cb(bus, which),

            // POP IX
            0xE1 => {
                let value = self.pop(bus);
                self.index_mut(which).set(value);
            }

            // EX (SP), IX
            0xE3 => {
                let value = self.ex_sp(bus, self.index(which).get());
                self.index_mut(which).set(value);
            }

            // PUSH IX
            0xE5 => {
                self.internal(bus, self.regs.ir(), 1);
                let value = self.index(which).get();
                self.push(bus, value);
            }

            // JP (IX)
            0xE9 => self.regs.pc = self.index(which).get(),

            // LD SP, IX
            0xF9 => {
                self.internal(bus, self.regs.ir(), 2);
                self.regs.sp = self.index(which).get();
            }

            // Not an indexed instruction: undo the second fetch so the
            // next step runs it from the unprefixed page
            _ => {
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.regs.dec_r();
            }
        }
    }

    /// Fetch the displacement and form `IX+d`, including the five internal
    /// cycles spent on the addition.
    fn index_address<B: Bus + ?Sized>(&mut self, bus: &mut B, which: IndexReg) -> u16 {
        let operand_pc = self.regs.pc;
        let offset = self.fetch_byte(bus) as i8;
        self.internal(bus, operand_pc, 5);
        self.index(which)
            .get()
            .wrapping_add_signed(i16::from(offset))
    }

    /// 8-bit register with H and L replaced by the index halves.
    fn index_reg8(&self, which: IndexReg, code: u8) -> u8 {
        match code & 0x07 {
            4 => self.index(which).hi(),
            5 => self.index(which).lo(),
            code => self.reg8(code),
        }
    }

    fn set_index_reg8(&mut self, which: IndexReg, code: u8, value: u8) {
        match code & 0x07 {
            4 => self.index_mut(which).set_hi(value),
            5 => self.index_mut(which).set_lo(value),
            code => self.set_reg8(code, value),
        }
    }
}
