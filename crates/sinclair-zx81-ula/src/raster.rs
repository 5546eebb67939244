//! Raster assembly: scanlines in, frames out.
//!
//! Samples are laid down left to right. A line wraps on its own when it
//! runs [`HSYNC_TOLERANCE`] samples past the nominal width; a valid sync
//! near the end of a line starts the next row early. A long sync once the
//! beam is low enough, or running off the bottom, completes the frame.

use crate::frame::{Frame, SharedFrame};
use crate::palette::BLANK;
use crate::scanline::Scanline;
use crate::{HSYNC_MINLEN, HSYNC_TOLERANCE, SYNC_TOLERANCE, VSYNC_MINLEN};

/// Rows kept beyond the nominal frame height for programs that run long.
const EXTRA_ROWS: usize = 18;
/// Rows short of a full frame at which a vertical sync is accepted.
const VSYNC_EARLY_ROWS: usize = 29;

/// Frame assembler for one machine.
#[derive(Debug)]
pub struct Raster {
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    /// A vertical sync ends the frame once `y` is past this row.
    vsync_tolerance_min: usize,
    frame: Frame,
    shared: SharedFrame,
    frames: u64,
    interlaced: bool,
    odd_field: bool,
    last_vsync_len: u32,
}

impl Raster {
    /// Raster for scanlines of `tstates_per_line` and frames of
    /// `lines_per_frame`.
    #[must_use]
    pub fn new(tstates_per_line: u32, lines_per_frame: u32, shared: SharedFrame) -> Self {
        let width = tstates_per_line as usize * 2;
        let lines = lines_per_frame as usize;
        let height = lines + EXTRA_ROWS;
        Self {
            width,
            height,
            x: 0,
            y: 0,
            vsync_tolerance_min: lines.saturating_sub(VSYNC_EARLY_ROWS),
            frame: Frame {
                width,
                height,
                pixels: vec![BLANK; width * height],
                number: 0,
                odd_field: false,
            },
            shared,
            frames: 0,
            interlaced: false,
            odd_field: false,
            last_vsync_len: 0,
        }
    }

    pub fn set_interlaced(&mut self, interlaced: bool) {
        self.interlaced = interlaced;
        if !interlaced {
            self.odd_field = false;
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current beam position (sample, row).
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn odd_field(&self) -> bool {
        self.odd_field
    }

    /// The frame being drawn.
    #[must_use]
    pub fn current(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub fn shared(&self) -> &SharedFrame {
        &self.shared
    }

    /// Add a scanline. Returns true if it completed a frame.
    pub fn draw(&mut self, line: &Scanline) -> bool {
        let mut forced = false;
        for &sample in line.samples() {
            if self.x < self.width && self.y < self.height {
                self.frame.pixels[self.y * self.width + self.x] = sample;
            }
            self.x += 1;
            if self.x >= self.width + HSYNC_TOLERANCE {
                self.x = 0;
                self.y += 1;
                if self.y >= self.height {
                    forced = true;
                    break;
                }
            }
        }

        let sync_valid = line.has_sync() && line.sync_len() >= HSYNC_MINLEN;
        if sync_valid && self.x >= self.width.saturating_sub(HSYNC_TOLERANCE) {
            self.blank_rest_of_row();
            self.x = 0;
            self.y += 1;
        }

        let vsync = sync_valid
            && line.sync_len() > VSYNC_MINLEN
            && self.y > self.vsync_tolerance_min;
        if forced || self.y >= self.height || vsync {
            self.complete_frame(line.sync_len());
            return true;
        }
        false
    }

    fn blank_rest_of_row(&mut self) {
        if self.y < self.height && self.x < self.width {
            let start = self.y * self.width + self.x;
            let end = (self.y + 1) * self.width;
            self.frame.pixels[start..end].fill(BLANK);
        }
    }

    fn complete_frame(&mut self, sync_len: u32) {
        let start = (self.y * self.width + self.x).min(self.frame.pixels.len());
        self.frame.pixels[start..].fill(BLANK);

        self.frame.number = self.frames;
        self.frame.odd_field = self.odd_field;
        self.shared.publish(&mut self.frame);
        if self.frame.pixels.len() != self.width * self.height {
            self.frame.pixels = vec![BLANK; self.width * self.height];
        }
        self.frame.width = self.width;
        self.frame.height = self.height;

        self.frames += 1;
        self.x = 0;
        self.y = 0;

        if self.interlaced {
            if sync_len.abs_diff(self.last_vsync_len) > SYNC_TOLERANCE {
                self.odd_field = false;
            } else {
                self.odd_field = !self.odd_field;
            }
        }
        self.last_vsync_len = sync_len;
    }
}
