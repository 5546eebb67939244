//! ZX80/ZX81 emulator.
//!
//! These machines have no video DMA: the Z80 itself fetches the display
//! file, and the ULA turns the character bitmaps it intercepts into a
//! serial pixel stream. The emulator therefore runs instruction by
//! instruction, converting each instruction's T-states into pixel samples,
//! and reconstructs scanlines and frames from the sync pulses the program
//! produces.

mod bus;
pub mod capture;
mod config;
pub mod fast_load;
pub mod input;
mod keyboard;
mod memory;
pub mod tape;
mod zx81;

pub use bus::Zx81Bus;
pub use config::{CharGenerator, ConfigError, MachineConfig, Model};
pub use fast_load::{LoadEntry, ZX80_LOAD, ZX81_LOAD};
pub use input::{InputEvent, InputQueue, Zx81Key};
pub use keyboard::KeyboardMatrix;
pub use memory::{LoadError, Memory};
pub use tape::{TapeDeck, TapeSource, encode_name};
pub use zx81::{ScanlineReport, Zx81};
