//! Z80 register set.
//!
//! Each register pair is a single owning 16-bit word. The 8-bit registers
//! (A, F, B, C, ...) are views onto the high or low half of their pair,
//! composed and decomposed on every access, so a write through one view is
//! immediately visible through the pair and through the other view.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

/// Which half of a register pair a byte view refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    High,
    Low,
}

/// A 16-bit register pair with high/low byte views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    #[must_use]
    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    pub fn set_hi(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_lo(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }

    /// Read one byte view.
    #[must_use]
    pub const fn half(self, half: Half) -> u8 {
        match half {
            Half::High => self.hi(),
            Half::Low => self.lo(),
        }
    }

    /// Write one byte view, leaving the other half untouched.
    pub fn set_half(&mut self, half: Half, value: u8) {
        match half {
            Half::High => self.set_hi(value),
            Half::Low => self.set_lo(value),
        }
    }

    /// Increment in place, returning the new value.
    pub fn inc(&mut self) -> u16 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    /// Decrement in place, returning the new value.
    pub fn dec(&mut self) -> u16 {
        self.0 = self.0.wrapping_sub(1);
        self.0
    }

    /// Increment, returning the value before the increment.
    pub fn post_inc(&mut self) -> u16 {
        let old = self.0;
        self.0 = old.wrapping_add(1);
        old
    }

    /// Decrement, returning the value before the decrement.
    pub fn post_dec(&mut self) -> u16 {
        let old = self.0;
        self.0 = old.wrapping_sub(1);
        old
    }

    pub fn and(&mut self, mask: u16) {
        self.0 &= mask;
    }

    pub fn or(&mut self, bits: u16) {
        self.0 |= bits;
    }

    /// Wrapping add, returning the new value.
    pub fn add(&mut self, value: u16) -> u16 {
        self.0 = self.0.wrapping_add(value);
        self.0
    }

    /// Increment one byte view in place (no carry into the other half).
    pub fn inc_half(&mut self, half: Half) -> u8 {
        let value = self.half(half).wrapping_add(1);
        self.set_half(half, value);
        value
    }

    /// Decrement one byte view in place (no borrow from the other half).
    pub fn dec_half(&mut self, half: Half) -> u8 {
        let value = self.half(half).wrapping_sub(1);
        self.set_half(half, value);
        value
    }

    pub fn post_inc_half(&mut self, half: Half) -> u8 {
        let old = self.half(half);
        self.set_half(half, old.wrapping_add(1));
        old
    }

    pub fn post_dec_half(&mut self, half: Half) -> u8 {
        let old = self.half(half);
        self.set_half(half, old.wrapping_sub(1));
        old
    }

    /// AND a mask into one byte view only.
    pub fn and_half(&mut self, half: Half, mask: u8) {
        let value = self.half(half) & mask;
        self.set_half(half, value);
    }

    /// OR bits into one byte view only.
    pub fn or_half(&mut self, half: Half, bits: u8) {
        let value = self.half(half) | bits;
        self.set_half(half, value);
    }

    /// Wrapping add into one byte view, returning the new byte.
    pub fn add_half(&mut self, half: Half, value: u8) -> u8 {
        let result = self.half(half).wrapping_add(value);
        self.set_half(half, result);
        result
    }
}

impl From<u16> for RegisterPair {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Complete Z80 register file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub ix: RegisterPair,
    pub iy: RegisterPair,

    pub sp: u16,
    pub pc: u16,

    // Alternate set, only ever swapped as whole words
    pub af_alt: u16,
    pub bc_alt: u16,
    pub de_alt: u16,
    pub hl_alt: u16,

    pub i: u8,
    /// Refresh counter, low 7 bits only.
    pub r: u8,
    /// Bit 7 of R as last loaded by `LD R,A`.
    pub r7: u8,

    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
}

impl Registers {
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.af.hi()
    }

    #[must_use]
    pub const fn f(&self) -> u8 {
        self.af.lo()
    }

    pub fn set_a(&mut self, value: u8) {
        self.af.set_hi(value);
    }

    pub fn set_f(&mut self, value: u8) {
        self.af.set_lo(value);
    }

    #[must_use]
    pub const fn b(&self) -> u8 {
        self.bc.hi()
    }

    #[must_use]
    pub const fn c(&self) -> u8 {
        self.bc.lo()
    }

    #[must_use]
    pub const fn h(&self) -> u8 {
        self.hl.hi()
    }

    #[must_use]
    pub const fn l(&self) -> u8 {
        self.hl.lo()
    }

    /// The full R register as seen by `LD A,R`.
    #[must_use]
    pub const fn r_value(&self) -> u8 {
        (self.r & 0x7F) | (self.r7 & 0x80)
    }

    /// Load R, latching bit 7 separately.
    pub fn set_r(&mut self, value: u8) {
        self.r = value & 0x7F;
        self.r7 = value & 0x80;
    }

    /// Advance the refresh counter; bit 7 never changes.
    pub fn inc_r(&mut self) {
        self.r = self.r.wrapping_add(1) & 0x7F;
    }

    pub fn dec_r(&mut self) {
        self.r = self.r.wrapping_sub(1) & 0x7F;
    }

    /// The I:R pair put on the address bus during refresh.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        (self.i as u16) << 8 | self.r_value() as u16
    }

    /// `EX AF,AF'`
    pub fn exchange_af(&mut self) {
        let af = self.af.get();
        self.af.set(self.af_alt);
        self.af_alt = af;
    }

    /// `EXX`
    pub fn exchange_main(&mut self) {
        let (bc, de, hl) = (self.bc.get(), self.de.get(), self.hl.get());
        self.bc.set(self.bc_alt);
        self.de.set(self.de_alt);
        self.hl.set(self.hl_alt);
        self.bc_alt = bc;
        self.de_alt = de;
        self.hl_alt = hl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_views_compose_into_pair() {
        for value in 0..=255u8 {
            let mut pair = RegisterPair::new(0x1234);
            pair.set_hi(value);
            assert_eq!(pair.get(), (u16::from(value) << 8) | 0x34);
            assert_eq!(pair.lo(), 0x34);

            let mut pair = RegisterPair::new(0x1234);
            pair.set_lo(value);
            assert_eq!(pair.get(), 0x1200 | u16::from(value));
            assert_eq!(pair.hi(), 0x12);
        }
    }

    #[test]
    fn pair_write_visible_through_views() {
        let mut pair = RegisterPair::default();
        pair.set(0xBEEF);
        assert_eq!(pair.half(Half::High), 0xBE);
        assert_eq!(pair.half(Half::Low), 0xEF);
    }

    #[test]
    fn pair_wraps_at_sixteen_bits() {
        let mut pair = RegisterPair::new(0xFFFF);
        assert_eq!(pair.inc(), 0x0000);
        assert_eq!(pair.dec(), 0xFFFF);

        let mut pair = RegisterPair::new(0x0000);
        assert_eq!(pair.post_dec(), 0x0000);
        assert_eq!(pair.get(), 0xFFFF);
        assert_eq!(pair.post_inc(), 0xFFFF);
        assert_eq!(pair.get(), 0x0000);
    }

    #[test]
    fn half_arithmetic_does_not_carry() {
        let mut pair = RegisterPair::new(0x12FF);
        assert_eq!(pair.inc_half(Half::Low), 0x00);
        assert_eq!(pair.get(), 0x1200);

        assert_eq!(pair.dec_half(Half::Low), 0xFF);
        assert_eq!(pair.get(), 0x12FF);

        assert_eq!(pair.post_inc_half(Half::High), 0x12);
        assert_eq!(pair.get(), 0x13FF);

        assert_eq!(pair.add_half(Half::High, 0xF0), 0x03);
        assert_eq!(pair.get(), 0x03FF);
    }

    #[test]
    fn half_masking_touches_one_byte() {
        let mut pair = RegisterPair::new(0xFFFF);
        pair.and_half(Half::High, 0x0F);
        assert_eq!(pair.get(), 0x0FFF);

        let mut pair = RegisterPair::new(0x0000);
        pair.or_half(Half::Low, 0x81);
        assert_eq!(pair.get(), 0x0081);
    }

    #[test]
    fn pair_and_or_add() {
        let mut pair = RegisterPair::new(0xF0F0);
        pair.and(0x0FF0);
        assert_eq!(pair.get(), 0x00F0);
        pair.or(0x1000);
        assert_eq!(pair.get(), 0x10F0);
        assert_eq!(pair.add(0xF000), 0x00F0);
    }

    #[test]
    fn refresh_counter_keeps_bit7() {
        let mut regs = Registers::default();
        regs.set_r(0xFF);
        regs.inc_r();
        assert_eq!(regs.r, 0x00);
        assert_eq!(regs.r_value(), 0x80);
        regs.dec_r();
        assert_eq!(regs.r_value(), 0xFF);
    }

    #[test]
    fn exchanges_swap_whole_words() {
        let mut regs = Registers::default();
        regs.af.set(0x1122);
        regs.af_alt = 0x3344;
        regs.exchange_af();
        assert_eq!(regs.af.get(), 0x3344);
        assert_eq!(regs.af_alt, 0x1122);

        regs.bc.set(0x0102);
        regs.bc_alt = 0x0A0B;
        regs.exchange_main();
        assert_eq!(regs.b(), 0x0A);
        assert_eq!(regs.c(), 0x0B);
        assert_eq!(regs.bc_alt, 0x0102);
    }
}
