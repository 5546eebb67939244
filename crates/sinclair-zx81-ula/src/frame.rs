//! Completed frames and their hand-off to a renderer.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::palette::PALETTE;

/// One completed raster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// Palette indices, row-major.
    pub pixels: Vec<u8>,
    /// Frames completed before this one.
    pub number: u64,
    /// Interlace field: false for the primary field.
    pub odd_field: bool,
}

impl Frame {
    /// Palette index at (x, y), or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// The frame as ARGB32.
    #[must_use]
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels
            .iter()
            .map(|&index| PALETTE.get(usize::from(index)).copied().unwrap_or(0))
            .collect()
    }
}

/// Latest completed frame, shared between the emulation thread and a
/// renderer.
///
/// Publishing swaps the whole frame under the lock; readers take a copy.
#[derive(Debug, Clone, Default)]
pub struct SharedFrame {
    inner: Arc<Mutex<Frame>>,
}

impl SharedFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Frame> {
        // A panicking renderer must not stop emulation.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Replace the published frame. `frame` receives the previous one so
    /// its buffer can be reused.
    pub fn publish(&self, frame: &mut Frame) {
        std::mem::swap(&mut *self.lock(), frame);
    }

    /// Copy of the most recently published frame.
    #[must_use]
    pub fn latest(&self) -> Frame {
        self.lock().clone()
    }

    /// Number of the most recently published frame.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.lock().number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_swaps_buffers() {
        let shared = SharedFrame::new();
        let mut frame = Frame {
            width: 2,
            height: 1,
            pixels: vec![0, 1],
            number: 7,
            odd_field: false,
        };
        shared.publish(&mut frame);
        assert!(frame.pixels.is_empty());
        assert_eq!(shared.number(), 7);
        assert_eq!(shared.latest().pixel(1, 0), Some(1));
    }

    #[test]
    fn visible_across_threads() {
        let shared = SharedFrame::new();
        let reader = shared.clone();
        let handle = std::thread::spawn(move || {
            let mut frame = Frame {
                width: 1,
                height: 1,
                pixels: vec![2],
                number: 1,
                odd_field: true,
            };
            shared.publish(&mut frame);
        });
        handle.join().expect("publisher thread");
        let frame = reader.latest();
        assert!(frame.odd_field);
        assert_eq!(frame.to_argb(), vec![PALETTE[2]]);
    }

    #[test]
    fn pixel_out_of_range() {
        let frame = Frame {
            width: 1,
            height: 1,
            pixels: vec![0],
            ..Frame::default()
        };
        assert_eq!(frame.pixel(1, 0), None);
        assert_eq!(frame.pixel(0, 1), None);
    }
}
