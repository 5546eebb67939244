//! Video shift register, sync generators and line timer.
//!
//! The machine drives this once per CPU instruction:
//!
//! 1. [`Ula::emit`] the instruction's T-states as samples,
//! 2. [`Ula::apply_port_event`] for any I/O the instruction did,
//! 3. [`Ula::count`] the T-states against the line timer, and when it
//!    expires deliver the NMI (if [`Ula::nmi_generator`] is on) and call
//!    [`Ula::end_line`].

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)] // T-state counts are far below i32::MAX.
#![allow(clippy::cast_sign_loss)] // borrow is never negative.

use crate::HSYNC_MINLEN;
use crate::palette::{BLANK, INK, PAPER};
use crate::scanline::{Scanline, SyncKind};

/// I/O seen by the ULA during the last instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortEvent {
    /// `OUT` to the given port.
    Out(u16),
    /// `IN` from an even port.
    In(u16),
}

/// ZX80/ZX81 video state.
#[derive(Debug, Clone)]
pub struct Ula {
    /// Bitmap bits, shifted out of bit 15.
    shift_register: u16,
    /// Inverse-video mask, shifted in step with `shift_register`.
    shift_reg_inv: u16,
    hsync_generator: bool,
    nmi_generator: bool,
    /// T-states left in the current scanline. Goes negative by the overshoot
    /// of the instruction that ended the line.
    hsync_counter: i32,
    /// Overshoot of the last line, replayed as blanking at the start of the
    /// next one.
    borrow: i32,
    /// Pixel row within the character cell (0-7).
    rowcounter: u8,
    tstates_per_line: i32,
    port_event: Option<PortEvent>,
}

impl Ula {
    #[must_use]
    pub fn new(tstates_per_line: u32) -> Self {
        let tstates_per_line = tstates_per_line as i32;
        Self {
            shift_register: 0,
            shift_reg_inv: 0,
            hsync_generator: false,
            nmi_generator: false,
            hsync_counter: tstates_per_line,
            borrow: 0,
            rowcounter: 0,
            tstates_per_line,
            port_event: None,
        }
    }

    /// Power-on state. The line length is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.tstates_per_line as u32);
    }

    #[must_use]
    pub fn tstates_per_line(&self) -> u32 {
        self.tstates_per_line as u32
    }

    #[must_use]
    pub fn rowcounter(&self) -> u8 {
        self.rowcounter
    }

    #[must_use]
    pub fn hsync_generator(&self) -> bool {
        self.hsync_generator
    }

    #[must_use]
    pub fn nmi_generator(&self) -> bool {
        self.nmi_generator
    }

    #[must_use]
    pub fn hsync_counter(&self) -> i32 {
        self.hsync_counter
    }

    #[must_use]
    pub fn borrow(&self) -> u32 {
        self.borrow.max(0) as u32
    }

    /// Load a character bitmap row fetched in place of a display-file byte.
    pub fn load_shift(&mut self, bitmap: u8, inverse: bool) {
        self.shift_register |= u16::from(bitmap);
        if inverse {
            self.shift_reg_inv |= 0x00FF;
        }
    }

    /// Record an `OUT` by the current instruction.
    pub fn latch_out(&mut self, port: u16) {
        self.port_event = Some(PortEvent::Out(port));
    }

    /// Record an `IN` from an even port by the current instruction.
    pub fn latch_in(&mut self, port: u16) {
        self.port_event = Some(PortEvent::In(port));
    }

    /// Forget any port event; called before each instruction.
    pub fn clear_port_event(&mut self) {
        self.port_event = None;
    }

    #[must_use]
    pub fn port_event(&self) -> Option<PortEvent> {
        self.port_event
    }

    /// Start a scanline: replay last line's overshoot as leading blanking.
    pub fn carry_in(&mut self, line: &mut Scanline) {
        let colour = if self.hsync_generator { PAPER } else { BLANK };
        line.fill(colour, self.borrow() as usize * 2);
        self.borrow = 0;
    }

    /// Shift out two samples per T-state.
    pub fn emit(&mut self, line: &mut Scanline, tstates: u32) {
        for _ in 0..tstates * 2 {
            let colour = if !self.hsync_generator {
                BLANK
            } else if (self.shift_register ^ self.shift_reg_inv) & 0x8000 == 0 {
                PAPER
            } else {
                INK
            };
            line.push(colour);
            self.shift_register <<= 1;
            self.shift_reg_inv <<= 1;
        }
    }

    /// Update the sync generators from the instruction's port access.
    pub fn apply_port_event(&mut self, line: &mut Scanline) {
        match self.port_event.take() {
            Some(PortEvent::Out(port)) => {
                match port & 0x00FF {
                    0xFD => self.nmi_generator = false,
                    0xFE => self.nmi_generator = true,
                    _ => {}
                }
                if !self.hsync_generator {
                    self.rowcounter = 0;
                    if line.sync_len() > 0 {
                        line.set_sync_valid(SyncKind::Vertical);
                    }
                }
                self.hsync_generator = true;
            }
            Some(PortEvent::In(_)) => {
                if !self.nmi_generator {
                    self.hsync_generator = false;
                }
            }
            None => {}
        }
    }

    /// Count `tstates` against the line timer. Time spent with the generator
    /// off adds to the sync length. Returns true when the line has expired.
    pub fn count(&mut self, line: &mut Scanline, tstates: u32) -> bool {
        if !self.hsync_generator {
            line.add_sync_len(tstates);
        }
        self.hsync_counter -= tstates as i32;
        self.hsync_counter <= 0
    }

    /// Charge T-states spent outside an instruction (the NMI response) to
    /// the expired line.
    pub fn charge(&mut self, tstates: u32) {
        self.hsync_counter -= tstates as i32;
    }

    /// Wait states for an NMI that wakes the CPU from `HALT`, so the
    /// response lands on the next 4 T-state boundary of the line.
    #[must_use]
    pub fn halt_wait(&self, line: &Scanline) -> u32 {
        let tpos = (line.len() / 2) as u32 % self.tstates_per_line();
        (4 - tpos % 4) % 4
    }

    /// Close an expired line. Generates the ULA's own horizontal sync when
    /// the program did not provide one, and reloads the line timer.
    pub fn end_line(&mut self, line: &mut Scanline) {
        self.borrow = -self.hsync_counter;
        if self.hsync_generator && line.sync_len() == 0 {
            line.set_sync_len(HSYNC_MINLEN);
            line.set_sync_valid(SyncKind::Horizontal);
            line.truncate(self.tstates_per_line as usize * 2);
            self.rowcounter = (self.rowcounter + 1) & 0x07;
        }
        self.hsync_counter += self.tstates_per_line;
    }

    /// Restart the line timer after a vertical sync.
    pub fn restart_line(&mut self) {
        self.hsync_counter = self.tstates_per_line;
        self.borrow = 0;
    }
}
