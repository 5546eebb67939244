//! Unprefixed instruction page.

#![allow(clippy::too_many_lines)]
#![allow(clippy::match_same_arms)]

use emu_core::Bus;

use crate::alu;
use crate::registers::Half;

use super::{IndexReg, Z80};

impl Z80 {
    /// Execute an unprefixed opcode whose M1 cycle has already been charged.
    pub(super) fn execute_base<B: Bus + ?Sized>(&mut self, bus: &mut B, op: u8) {
        match op {
            // NOP
            0x00 => {}

            // LD rr, nn (01=BC, 11=DE, 21=HL, 31=SP)
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch_word(bus);
                self.set_reg16(op >> 4, value);
            }

            // LD (BC), A / LD (DE), A
            0x02 | 0x12 => {
                let address = self.reg16(op >> 4);
                let a = self.regs.a();
                self.write(bus, address, a);
            }

            // INC rr
            0x03 | 0x13 | 0x23 | 0x33 => {
                self.internal(bus, self.regs.ir(), 2);
                let value = self.reg16(op >> 4).wrapping_add(1);
                self.set_reg16(op >> 4, value);
            }

            // DEC rr
            0x0B | 0x1B | 0x2B | 0x3B => {
                self.internal(bus, self.regs.ir(), 2);
                let value = self.reg16(op >> 4).wrapping_sub(1);
                self.set_reg16(op >> 4, value);
            }

            // INC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => {
                let code = op >> 3;
                let result = alu::inc8(self.reg8(code), self.regs.f());
                self.set_reg8(code, result.value);
                self.regs.set_f(result.flags);
            }

            // DEC r
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => {
                let code = op >> 3;
                let result = alu::dec8(self.reg8(code), self.regs.f());
                self.set_reg8(code, result.value);
                self.regs.set_f(result.flags);
            }

            // INC (HL) / DEC (HL)
            0x34 | 0x35 => {
                let hl = self.regs.hl.get();
                let value = self.read(bus, hl);
                self.internal(bus, hl, 1);
                let result = if op == 0x34 {
                    alu::inc8(value, self.regs.f())
                } else {
                    alu::dec8(value, self.regs.f())
                };
                self.write(bus, hl, result.value);
                self.regs.set_f(result.flags);
            }

            // LD r, n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => {
                let value = self.fetch_byte(bus);
                self.set_reg8(op >> 3, value);
            }

            // LD (HL), n
            0x36 => {
                let value = self.fetch_byte(bus);
                self.write(bus, self.regs.hl.get(), value);
            }

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => {
                let (a, f) = (self.regs.a(), self.regs.f());
                let result = match op {
                    0x07 => alu::rlca(a, f),
                    0x0F => alu::rrca(a, f),
                    0x17 => alu::rla(a, f),
                    _ => alu::rra(a, f),
                };
                self.regs.set_a(result.value);
                self.regs.set_f(result.flags);
            }

            // EX AF, AF'
            0x08 => self.regs.exchange_af(),

            // ADD HL, rr
            0x09 | 0x19 | 0x29 | 0x39 => {
                self.internal(bus, self.regs.ir(), 7);
                let (result, flags) =
                    alu::add16(self.regs.hl.get(), self.reg16(op >> 4), self.regs.f());
                self.regs.hl.set(result);
                self.regs.set_f(flags);
            }

            // LD A, (BC) / LD A, (DE)
            0x0A | 0x1A => {
                let address = self.reg16(op >> 4);
                let value = self.read(bus, address);
                self.regs.set_a(value);
            }

            // DJNZ e
            0x10 => {
                self.internal(bus, self.regs.ir(), 1);
                let operand_pc = self.regs.pc;
                let offset = self.fetch_byte(bus) as i8;
                let b = self.regs.bc.dec_half(Half::High);
                if b != 0 {
                    self.internal(bus, operand_pc, 5);
                    self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
                }
            }

            // JR e
            0x18 => {
                let operand_pc = self.regs.pc;
                let offset = self.fetch_byte(bus) as i8;
                self.internal(bus, operand_pc, 5);
                self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
            }

            // JR cc, e (NZ, Z, NC, C)
            0x20 | 0x28 | 0x30 | 0x38 => {
                let operand_pc = self.regs.pc;
                let offset = self.fetch_byte(bus) as i8;
                if self.condition((op >> 3) & 0x03) {
                    self.internal(bus, operand_pc, 5);
                    self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
                }
            }

            // LD (nn), HL
            0x22 => {
                let address = self.fetch_word(bus);
                self.write_word(bus, address, self.regs.hl.get());
            }

            // LD HL, (nn)
            0x2A => {
                let address = self.fetch_word(bus);
                let value = self.read_word(bus, address);
                self.regs.hl.set(value);
            }

            // DAA
            0x27 => {
                let result = alu::daa(self.regs.a(), self.regs.f());
                self.regs.set_a(result.value);
                self.regs.set_f(result.flags);
            }

            // CPL
            0x2F => {
                let result = alu::cpl(self.regs.a(), self.regs.f());
                self.regs.set_a(result.value);
                self.regs.set_f(result.flags);
            }

            // SCF / CCF
            0x37 => self.regs.set_f(alu::scf(self.regs.a(), self.regs.f())),
            0x3F => self.regs.set_f(alu::ccf(self.regs.a(), self.regs.f())),

            // LD (nn), A
            0x32 => {
                let address = self.fetch_word(bus);
                self.write(bus, address, self.regs.a());
            }

            // LD A, (nn)
            0x3A => {
                let address = self.fetch_word(bus);
                let value = self.read(bus, address);
                self.regs.set_a(value);
            }

            // HALT: stay on the opcode until an interrupt moves PC on
            0x76 => {
                self.regs.halted = true;
                self.regs.pc = self.regs.pc.wrapping_sub(1);
            }

            // LD r, r' / LD r, (HL) / LD (HL), r
            0x40..=0x7F => {
                let dst = (op >> 3) & 0x07;
                let src = op & 0x07;
                if src == 6 {
                    let value = self.read(bus, self.regs.hl.get());
                    self.set_reg8(dst, value);
                } else if dst == 6 {
                    let value = self.reg8(src);
                    self.write(bus, self.regs.hl.get(), value);
                } else {
                    let value = self.reg8(src);
                    self.set_reg8(dst, value);
                }
            }

            // ALU A, r / ALU A, (HL)
            0x80..=0xBF => {
                let src = op & 0x07;
                let value = if src == 6 {
                    self.read(bus, self.regs.hl.get())
                } else {
                    self.reg8(src)
                };
                self.alu_a(op >> 3, value);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                self.internal(bus, self.regs.ir(), 1);
                if self.condition(op >> 3) {
                    self.regs.pc = self.pop(bus);
                }
            }

            // POP rr
            0xC1 | 0xD1 | 0xE1 => {
                let value = self.pop(bus);
                self.set_reg16((op >> 4) & 0x03, value);
            }

            // POP AF
            0xF1 => {
                let value = self.pop(bus);
                self.regs.af.set(value);
            }

            // JP cc, nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let address = self.fetch_word(bus);
                if self.condition(op >> 3) {
                    self.regs.pc = address;
                }
            }

            // JP nn
            0xC3 => self.regs.pc = self.fetch_word(bus),

            // CALL cc, nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let address = self.fetch_word(bus);
                if self.condition(op >> 3) {
                    self.call(bus, address);
                }
            }

            // CALL nn
            0xCD => {
                let address = self.fetch_word(bus);
                self.call(bus, address);
            }

            // PUSH rr
            0xC5 | 0xD5 | 0xE5 => {
                self.internal(bus, self.regs.ir(), 1);
                let value = self.reg16((op >> 4) & 0x03);
                self.push(bus, value);
            }

            // PUSH AF
            0xF5 => {
                self.internal(bus, self.regs.ir(), 1);
                self.push(bus, self.regs.af.get());
            }

            // ALU A, n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let value = self.fetch_byte(bus);
                self.alu_a(op >> 3, value);
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.internal(bus, self.regs.ir(), 1);
                self.push(bus, self.regs.pc);
                self.regs.pc = u16::from(op & 0x38);
            }

            // RET
            0xC9 => self.regs.pc = self.pop(bus),

            // Prefixes
            0xCB => self.execute_cb(bus),
            0xDD => self.execute_index(bus, IndexReg::Ix),
            0xED => self.execute_ed(bus),
            0xFD => self.execute_index(bus, IndexReg::Iy),

            // OUT (n), A
            0xD3 => {
                let n = self.fetch_byte(bus);
                let a = self.regs.a();
                self.port_out(bus, (u16::from(a) << 8) | u16::from(n), a);
            }

            // IN A, (n)
            0xDB => {
                let n = self.fetch_byte(bus);
                let port = (u16::from(self.regs.a()) << 8) | u16::from(n);
                let value = self.port_in(bus, port);
                self.regs.set_a(value);
            }

            // EXX
            0xD9 => self.regs.exchange_main(),

            // EX (SP), HL
            0xE3 => {
                let value = self.ex_sp(bus, self.regs.hl.get());
                self.regs.hl.set(value);
            }

            // JP (HL)
            0xE9 => self.regs.pc = self.regs.hl.get(),

            // EX DE, HL
            0xEB => {
                let de = self.regs.de.get();
                self.regs.de.set(self.regs.hl.get());
                self.regs.hl.set(de);
            }

            // DI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }

            // EI
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.ei_delay = true;
            }

            // LD SP, HL
            0xF9 => {
                self.internal(bus, self.regs.ir(), 2);
                self.regs.sp = self.regs.hl.get();
            }
        }
    }

    /// Push PC and jump, after the extra internal cycle of a taken CALL.
    fn call<B: Bus + ?Sized>(&mut self, bus: &mut B, address: u16) {
        self.internal(bus, self.regs.pc.wrapping_sub(1), 1);
        self.push(bus, self.regs.pc);
        self.regs.pc = address;
    }

    /// `EX (SP),rr`: swap `value` with the word on the stack, returning
    /// the old stack word.
    pub(super) fn ex_sp<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) -> u16 {
        let sp = self.regs.sp;
        let old = self.read_word(bus, sp);
        let [lo, hi] = value.to_le_bytes();
        self.internal(bus, sp.wrapping_add(1), 1);
        self.write(bus, sp.wrapping_add(1), hi);
        self.write(bus, sp, lo);
        self.internal(bus, sp, 2);
        old
    }
}
