//! `CB` page (bit, rotate and shift) and its `DDCB`/`FDCB` indexed forms.

use emu_core::Bus;

use crate::alu;

use super::{IndexReg, Z80};

impl Z80 {
    pub(super) fn execute_cb<B: Bus + ?Sized>(&mut self, bus: &mut B) {
        let op = self.fetch_opcode(bus);
        let code = op & 0x07;
        let bit = (op >> 3) & 0x07;

        if code == 6 {
            // (HL) forms: read, one internal cycle, write back
            let hl = self.regs.hl.get();
            let value = self.read(bus, hl);
            self.internal(bus, hl, 1);
            match op >> 6 {
                0 => {
                    let result = alu::shift_op(op >> 3, value, self.regs.f());
                    self.write(bus, hl, result.value);
                    self.regs.set_f(result.flags);
                }
                1 => self.regs.set_f(alu::bit(self.regs.f(), bit, value, value)),
                2 => self.write(bus, hl, value & !(1 << bit)),
                _ => self.write(bus, hl, value | (1 << bit)),
            }
            return;
        }

        let value = self.reg8(code);
        match op >> 6 {
            0 => {
                let result = alu::shift_op(op >> 3, value, self.regs.f());
                self.set_reg8(code, result.value);
                self.regs.set_f(result.flags);
            }
            1 => self.regs.set_f(alu::bit(self.regs.f(), bit, value, value)),
            2 => self.set_reg8(code, value & !(1 << bit)),
            _ => self.set_reg8(code, value | (1 << bit)),
        }
    }

    /// `DD CB d op` / `FD CB d op`. The final opcode byte is read as data,
    /// not fetched, so R advances only for the two prefix bytes.
    pub(super) fn execute_index_cb<B: Bus + ?Sized>(&mut self, bus: &mut B, which: IndexReg) {
        let offset = self.fetch_byte(bus) as i8;
        let address = self
            .index(which)
            .get()
            .wrapping_add_signed(i16::from(offset));

        let pc = self.regs.pc;
        let op = self.read(bus, pc);
        self.internal(bus, pc, 2);
        self.regs.pc = pc.wrapping_add(1);

        let value = self.read(bus, address);
        self.internal(bus, address, 1);

        let bit = (op >> 3) & 0x07;
        let result = match op >> 6 {
            1 => {
                // BIT takes bits 3 and 5 from the address high byte
                let xy = (address >> 8) as u8;
                self.regs.set_f(alu::bit(self.regs.f(), bit, value, xy));
                return;
            }
            0 => {
                let shifted = alu::shift_op(op >> 3, value, self.regs.f());
                self.regs.set_f(shifted.flags);
                shifted.value
            }
            2 => value & !(1 << bit),
            _ => value | (1 << bit),
        };

        self.write(bus, address, result);

        // Undocumented: the result is also copied into a plain register
        let code = op & 0x07;
        if code != 6 {
            self.set_reg8(code, result);
        }
    }
}
