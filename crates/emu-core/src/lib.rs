//! Core traits and types shared by the CPU core and the machines built on it.
//!
//! All timing is counted in CPU T-states. The [`Bus`] trait is the seam
//! between a CPU core and the hardware variant it runs in.

mod bus;
mod clock;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
