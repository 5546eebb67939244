//! ZX80/ZX81 keyboard matrix.
//!
//! 40 keys in 8 half-rows of 5, read through any even port. The high byte
//! of the port address selects half-rows: each clear bit (A8-A15) scans
//! one. A pressed key reads as 0.
//!
//! | Addr bit | Row | Keys (bit 0-4)          |
//! |----------|-----|-------------------------|
//! | A8       | 0   | Shift, Z, X, C, V       |
//! | A9       | 1   | A, S, D, F, G           |
//! | A10      | 2   | Q, W, E, R, T           |
//! | A11      | 3   | 1, 2, 3, 4, 5           |
//! | A12      | 4   | 0, 9, 8, 7, 6           |
//! | A13      | 5   | P, O, I, U, Y           |
//! | A14      | 6   | Newline, L, K, J, H     |
//! | A15      | 7   | Space, ., M, N, B       |
//!
//! The matrix is shared between the emulation thread and whatever feeds it
//! key presses. Each half-row is its own atomic byte.

use std::sync::atomic::{AtomicU8, Ordering};

/// Keyboard state: 8 half-rows, bits 0-4 set while a key is held.
#[derive(Debug, Default)]
pub struct KeyboardMatrix {
    rows: [AtomicU8; 8],
}

impl KeyboardMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear a key. `row` is 0-7, `bit` is 0-4.
    pub fn set_key(&self, row: usize, bit: u8, pressed: bool) {
        if row >= 8 || bit >= 5 {
            return;
        }
        if pressed {
            self.rows[row].fetch_or(1 << bit, Ordering::Relaxed);
        } else {
            self.rows[row].fetch_and(!(1 << bit), Ordering::Relaxed);
        }
    }

    /// Keys for the half-rows selected by `addr_high`, active low in bits
    /// 0-4. Bits 5-7 are 0; the bus fills them in.
    #[must_use]
    pub fn read(&self, addr_high: u8) -> u8 {
        let pressed = self
            .rows
            .iter()
            .enumerate()
            .filter(|&(row, _)| addr_high & (1 << row) == 0)
            .fold(0, |keys, (_, state)| keys | state.load(Ordering::Relaxed));
        !pressed & 0x1F
    }

    pub fn release_all(&self) {
        for row in &self.rows {
            row.store(0, Ordering::Relaxed);
        }
    }
}
