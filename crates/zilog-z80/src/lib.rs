//! Zilog Z80 CPU emulator.
//!
//! Each call to `step()` executes one complete instruction and returns the
//! T-states it took, with every bus cycle charged to the bus as it happens.

pub mod alu;
mod cpu;
pub mod flags;
mod registers;

pub use cpu::Z80;
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use registers::{Half, RegisterPair, Registers};
