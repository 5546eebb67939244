//! ZX80/ZX81 ULA: software-generated video.
//!
//! Neither machine has a framebuffer. The CPU executes the display file as
//! code; every opcode fetch above the display threshold that would be a
//! printable character is turned into a `NOP` by the bus, and the ULA loads
//! the matching character bitmap row into its video shift register instead.
//! The picture is rebuilt here from those fetches, one CPU instruction at a
//! time.
//!
//! # Timing (ZX81 PAL)
//!
//! - 3.25 MHz CPU clock, pixel clock twice that: 2 samples per T-state
//! - 207 T-states per scanline (414 samples)
//! - 312 scanlines per frame (262 on NTSC machines)
//!
//! # Sync
//!
//! Sync is software-latched. Any `OUT` turns the HSYNC generator on, an
//! `IN` from an even port turns it off (unless the NMI generator is
//! running). While it is off the video output is blanked and the time is
//! counted as sync length. A long enough pulse at the bottom of the picture
//! ends the frame. Between explicit pulses the ULA produces its own short
//! horizontal sync every scanline and advances the character row counter.
//!
//! # Pieces
//!
//! - [`Scanline`]: the samples produced by one call of the machine's
//!   scanline loop, plus the sync pulse that ended it.
//! - [`Ula`]: shift register, sync generators, row counter, line timer.
//! - [`Raster`]: places scanlines into a whole frame and detects frame end.
//! - [`SharedFrame`]: hands finished frames to a renderer on another thread.
//! - [`BorderSize`] / [`Window`]: the visible crop of the raster.

mod border;
mod frame;
mod palette;
mod raster;
mod scanline;
mod ula;

pub use border::{BorderSize, Window};
pub use frame::{Frame, SharedFrame};
pub use palette::{BLANK, INK, PALETTE, PAPER};
pub use raster::Raster;
pub use scanline::{MAX_SAMPLES, SCANLINE_CAPACITY, Scanline, SyncKind};
pub use ula::{PortEvent, Ula};

/// Length given to the horizontal sync the ULA generates on its own, in
/// T-states. Also the shortest pulse the raster accepts as a sync.
pub const HSYNC_MINLEN: u32 = 10;

/// A sync pulse longer than this (T-states) is a vertical sync.
pub const VSYNC_MINLEN: u32 = 350;

/// Samples a line may run past the nominal width before the raster wraps
/// on its own, and how early a sync may arrive and still start a new row.
pub const HSYNC_TOLERANCE: usize = 64;

/// Largest difference in vertical sync length (T-states) between two frames
/// that still counts as the same interlace sequence.
pub const SYNC_TOLERANCE: u32 = 8;
