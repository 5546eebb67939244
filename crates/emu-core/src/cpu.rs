//! CPU core trait.

use crate::Bus;

/// A CPU core stepped one instruction at a time.
///
/// The bus is passed in, not owned, so the machine can share it with its
/// video logic between instructions. Every method that touches the bus
/// returns the T-states it consumed.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction and return the T-states consumed, wait
    /// states included.
    fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32;

    /// Deliver a maskable interrupt. Returns 0 if it was not accepted.
    fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32;

    /// Deliver a non-maskable interrupt. `halt_wait` extra T-states are
    /// charged when the CPU is woken from HALT.
    fn nmi<B: Bus + ?Sized>(&mut self, bus: &mut B, halt_wait: u32) -> u32;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Reset the CPU to its initial state. Memory is not touched.
    fn reset(&mut self);
}
