//! ALU operations for the Z80.
//!
//! Each function takes the operands and the incoming F register and returns
//! the result with the complete new F. Nothing here touches the CPU.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

use crate::flags::{
    CF, HALFCARRY_ADD, HALFCARRY_SUB, HF, NF, OVERFLOW_ADD, OVERFLOW_SUB, PARITY, PF, SF, SZ53,
    SZ53P, XF, YF, ZF,
};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

impl AluResult {
    const fn new(value: u8, flags: u8) -> Self {
        Self { value, flags }
    }
}

/// Pack bit 3 and bit 7 of A, the operand and the result into a lookup
/// index: low three bits select the half-carry entry, bits 4-6 the
/// overflow entry.
const fn lookup8(a: u8, value: u8, result: u8) -> usize {
    (((a & 0x88) >> 3) | ((value & 0x88) >> 2) | ((result & 0x88) >> 1)) as usize
}

fn add_core(a: u8, value: u8, carry: u8) -> AluResult {
    let wide = u16::from(a) + u16::from(value) + u16::from(carry);
    let result = wide as u8;
    let lookup = lookup8(a, value, result);
    let flags = if wide & 0x100 != 0 { CF } else { 0 }
        | HALFCARRY_ADD[lookup & 0x07]
        | OVERFLOW_ADD[lookup >> 4]
        | SZ53[result as usize];
    AluResult::new(result, flags)
}

fn sub_core(a: u8, value: u8, carry: u8) -> AluResult {
    let wide = u16::from(a)
        .wrapping_sub(u16::from(value))
        .wrapping_sub(u16::from(carry));
    let result = wide as u8;
    let lookup = lookup8(a, value, result);
    let flags = if wide & 0x100 != 0 { CF } else { 0 }
        | NF
        | HALFCARRY_SUB[lookup & 0x07]
        | OVERFLOW_SUB[lookup >> 4]
        | SZ53[result as usize];
    AluResult::new(result, flags)
}

/// `ADD A,v`
#[must_use]
pub fn add8(a: u8, value: u8) -> AluResult {
    add_core(a, value, 0)
}

/// `ADC A,v`
#[must_use]
pub fn adc8(a: u8, value: u8, f: u8) -> AluResult {
    add_core(a, value, f & CF)
}

/// `SUB v`
#[must_use]
pub fn sub8(a: u8, value: u8) -> AluResult {
    sub_core(a, value, 0)
}

/// `SBC A,v`
#[must_use]
pub fn sbc8(a: u8, value: u8, f: u8) -> AluResult {
    sub_core(a, value, f & CF)
}

/// `CP v`: flags only. Bits 3 and 5 come from the operand, not the result.
#[must_use]
pub fn cp8(a: u8, value: u8) -> u8 {
    let wide = u16::from(a).wrapping_sub(u16::from(value));
    let result = wide as u8;
    let lookup = lookup8(a, value, result);
    let carry_or_zero = if wide & 0x100 != 0 {
        CF
    } else if result == 0 {
        ZF
    } else {
        0
    };
    carry_or_zero
        | NF
        | HALFCARRY_SUB[lookup & 0x07]
        | OVERFLOW_SUB[lookup >> 4]
        | (value & (XF | YF))
        | (result & SF)
}

#[must_use]
pub fn and8(a: u8, value: u8) -> AluResult {
    let result = a & value;
    AluResult::new(result, HF | SZ53P[result as usize])
}

#[must_use]
pub fn or8(a: u8, value: u8) -> AluResult {
    let result = a | value;
    AluResult::new(result, SZ53P[result as usize])
}

#[must_use]
pub fn xor8(a: u8, value: u8) -> AluResult {
    let result = a ^ value;
    AluResult::new(result, SZ53P[result as usize])
}

/// `INC r`: carry is preserved.
#[must_use]
pub fn inc8(value: u8, f: u8) -> AluResult {
    let result = value.wrapping_add(1);
    let mut flags = (f & CF) | SZ53[result as usize];
    if result == 0x80 {
        flags |= PF;
    }
    if result & 0x0F == 0 {
        flags |= HF;
    }
    AluResult::new(result, flags)
}

/// `DEC r`: carry is preserved.
#[must_use]
pub fn dec8(value: u8, f: u8) -> AluResult {
    let result = value.wrapping_sub(1);
    let mut flags = (f & CF) | NF | SZ53[result as usize];
    if value & 0x0F == 0 {
        flags |= HF;
    }
    if result == 0x7F {
        flags |= PF;
    }
    AluResult::new(result, flags)
}

// =========================================================================
// Accumulator rotates and miscellany (S, Z, P preserved)
// =========================================================================

#[must_use]
pub fn rlca(a: u8, f: u8) -> AluResult {
    let result = a.rotate_left(1);
    AluResult::new(result, (f & (PF | ZF | SF)) | (result & (CF | XF | YF)))
}

#[must_use]
pub fn rrca(a: u8, f: u8) -> AluResult {
    let result = a.rotate_right(1);
    AluResult::new(
        result,
        (f & (PF | ZF | SF)) | (a & CF) | (result & (XF | YF)),
    )
}

#[must_use]
pub fn rla(a: u8, f: u8) -> AluResult {
    let result = (a << 1) | (f & CF);
    AluResult::new(
        result,
        (f & (PF | ZF | SF)) | (result & (XF | YF)) | (a >> 7),
    )
}

#[must_use]
pub fn rra(a: u8, f: u8) -> AluResult {
    let result = (a >> 1) | (f << 7);
    AluResult::new(
        result,
        (f & (PF | ZF | SF)) | (result & (XF | YF)) | (a & CF),
    )
}

#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    let result = !a;
    AluResult::new(
        result,
        (f & (CF | PF | ZF | SF)) | (result & (XF | YF)) | NF | HF,
    )
}

#[must_use]
pub fn scf(a: u8, f: u8) -> u8 {
    (f & (PF | ZF | SF)) | (a & (XF | YF)) | CF
}

#[must_use]
pub fn ccf(a: u8, f: u8) -> u8 {
    let carry = if f & CF != 0 { HF } else { CF };
    (f & (PF | ZF | SF)) | carry | (a & (XF | YF))
}

/// `DAA`, adjusting by the add or subtract recorded in N.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let mut add = 0;
    let mut carry = f & CF;
    if f & HF != 0 || a & 0x0F > 9 {
        add = 0x06;
    }
    if carry != 0 || a > 0x99 {
        add |= 0x60;
    }
    if a > 0x99 {
        carry = CF;
    }
    let adjusted = if f & NF != 0 {
        sub8(a, add)
    } else {
        add8(a, add)
    };
    let flags = (adjusted.flags & !(CF | PF)) | carry | PARITY[adjusted.value as usize];
    AluResult::new(adjusted.value, flags)
}

// =========================================================================
// CB-page shifts and rotates (all flags replaced)
// =========================================================================

#[must_use]
pub fn rlc8(value: u8) -> AluResult {
    let result = value.rotate_left(1);
    AluResult::new(result, (result & CF) | SZ53P[result as usize])
}

#[must_use]
pub fn rrc8(value: u8) -> AluResult {
    let result = value.rotate_right(1);
    AluResult::new(result, (value & CF) | SZ53P[result as usize])
}

#[must_use]
pub fn rl8(value: u8, f: u8) -> AluResult {
    let result = (value << 1) | (f & CF);
    AluResult::new(result, (value >> 7) | SZ53P[result as usize])
}

#[must_use]
pub fn rr8(value: u8, f: u8) -> AluResult {
    let result = (value >> 1) | (f << 7);
    AluResult::new(result, (value & CF) | SZ53P[result as usize])
}

#[must_use]
pub fn sla8(value: u8) -> AluResult {
    let result = value << 1;
    AluResult::new(result, (value >> 7) | SZ53P[result as usize])
}

#[must_use]
pub fn sra8(value: u8) -> AluResult {
    let result = (value & 0x80) | (value >> 1);
    AluResult::new(result, (value & CF) | SZ53P[result as usize])
}

/// Undocumented shift left, bit 0 set.
#[must_use]
pub fn sll8(value: u8) -> AluResult {
    let result = (value << 1) | 0x01;
    AluResult::new(result, (value >> 7) | SZ53P[result as usize])
}

#[must_use]
pub fn srl8(value: u8) -> AluResult {
    let result = value >> 1;
    AluResult::new(result, (value & CF) | SZ53P[result as usize])
}

/// Shift/rotate selected by bits 3-5 of a CB-page opcode.
#[must_use]
pub fn shift_op(op: u8, value: u8, f: u8) -> AluResult {
    match op & 0x07 {
        0 => rlc8(value),
        1 => rrc8(value),
        2 => rl8(value, f),
        3 => rr8(value, f),
        4 => sla8(value),
        5 => sra8(value),
        6 => sll8(value),
        _ => srl8(value),
    }
}

/// `BIT n,v`. `xy_source` supplies bits 3 and 5: the operand for registers
/// and `(HL)`, the high byte of the effective address for `(IX+d)`.
#[must_use]
pub fn bit(f: u8, bit: u8, value: u8, xy_source: u8) -> u8 {
    let mut flags = (f & CF) | HF | (xy_source & (XF | YF));
    let mask = 1u8 << (bit & 0x07);
    if value & mask == 0 {
        flags |= PF | ZF;
    }
    if bit & 0x07 == 7 && value & 0x80 != 0 {
        flags |= SF;
    }
    flags
}

// =========================================================================
// 16-bit arithmetic
// =========================================================================

/// `ADD rr,rr`: S, Z and P are preserved.
#[must_use]
pub fn add16(a: u16, value: u16, f: u8) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(value);
    let result = wide as u16;
    let lookup =
        (((a & 0x0800) >> 11) | ((value & 0x0800) >> 10) | ((result & 0x0800) >> 9)) as usize;
    let flags = (f & (PF | ZF | SF))
        | if wide & 0x1_0000 != 0 { CF } else { 0 }
        | ((result >> 8) as u8 & (XF | YF))
        | HALFCARRY_ADD[lookup];
    (result, flags)
}

const fn lookup16(a: u16, value: u16, result: u16) -> usize {
    (((a & 0x8800) >> 11) | ((value & 0x8800) >> 10) | ((result & 0x8800) >> 9)) as usize
}

/// `ADC HL,rr`
#[must_use]
pub fn adc16(a: u16, value: u16, f: u8) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(value) + u32::from(f & CF);
    let result = wide as u16;
    let lookup = lookup16(a, value, result);
    let mut flags = if wide & 0x1_0000 != 0 { CF } else { 0 }
        | OVERFLOW_ADD[lookup >> 4]
        | ((result >> 8) as u8 & (XF | YF | SF))
        | HALFCARRY_ADD[lookup & 0x07];
    if result == 0 {
        flags |= ZF;
    }
    (result, flags)
}

/// `SBC HL,rr`
#[must_use]
pub fn sbc16(a: u16, value: u16, f: u8) -> (u16, u8) {
    let wide = u32::from(a)
        .wrapping_sub(u32::from(value))
        .wrapping_sub(u32::from(f & CF));
    let result = wide as u16;
    let lookup = lookup16(a, value, result);
    let mut flags = if wide & 0x1_0000 != 0 { CF } else { 0 }
        | NF
        | OVERFLOW_SUB[lookup >> 4]
        | ((result >> 8) as u8 & (XF | YF | SF))
        | HALFCARRY_SUB[lookup & 0x07];
    if result == 0 {
        flags |= ZF;
    }
    (result, flags)
}
