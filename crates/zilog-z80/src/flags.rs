//! Z80 flag register bits and flag lookup tables.
//!
//! Arithmetic flags are computed the table-driven way: sign, zero, the two
//! undocumented bits and parity come from 256-entry tables indexed by the
//! result, and half-carry/overflow come from small tables indexed by bits
//! of the operands and the result.

#![allow(clippy::cast_possible_truncation)] // Table indices always fit a byte.

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - copy of bit 3 of result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// Sign, zero, bit 5 and bit 3 of each byte value.
pub static SZ53: [u8; 256] = build_sz53();

/// `PF` if the byte has even parity, else 0.
pub static PARITY: [u8; 256] = build_parity();

/// `SZ53` with parity merged in.
pub static SZ53P: [u8; 256] = build_sz53p();

/// Half-carry for additions, indexed by bit 3 of (result, operand, A)
/// packed as `r:v:a` in the low three bits.
pub const HALFCARRY_ADD: [u8; 8] = [0, HF, HF, HF, 0, 0, 0, HF];

/// Half-carry for subtractions, same indexing as [`HALFCARRY_ADD`].
pub const HALFCARRY_SUB: [u8; 8] = [0, 0, HF, 0, HF, 0, HF, HF];

/// Overflow for additions, indexed by bit 7 of (result, operand, A).
pub const OVERFLOW_ADD: [u8; 8] = [0, 0, 0, PF, PF, 0, 0, 0];

/// Overflow for subtractions, same indexing as [`OVERFLOW_ADD`].
pub const OVERFLOW_SUB: [u8; 8] = [0, PF, 0, 0, 0, 0, PF, 0];

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

/// Build flags byte for common arithmetic results.
#[must_use]
pub const fn sz53(value: u8) -> u8 {
    let mut f = value & (SF | YF | XF);
    if value == 0 {
        f |= ZF;
    }
    f
}

/// Build flags byte with parity.
#[must_use]
pub const fn sz53p(value: u8) -> u8 {
    let mut f = sz53(value);
    if parity(value) {
        f |= PF;
    }
    f
}

const fn build_sz53() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = sz53(i as u8);
        i += 1;
    }
    table
}

const fn build_parity() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        if parity(i as u8) {
            table[i] = PF;
        }
        i += 1;
    }
    table
}

const fn build_sz53p() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = sz53p(i as u8);
        i += 1;
    }
    table
}
