//! Sample colours.
//!
//! The ZX80/ZX81 output is monochrome with a blanking level. Samples in a
//! [`Scanline`](crate::Scanline) are indices into [`PALETTE`].

/// Pixel set in the shift register.
pub const INK: u8 = 0;
/// Pixel clear in the shift register.
pub const PAPER: u8 = 1;
/// HSYNC generator off.
pub const BLANK: u8 = 2;

/// ARGB32 colour for each sample index.
pub const PALETTE: [u32; 3] = [
    0xFF00_0000, // 0: Ink (black)
    0xFFE8_E8E8, // 1: Paper (light grey)
    0xFF20_2020, // 2: Blanking
];
