//! Visible window within the raster.
//!
//! The raster covers the whole scanned area including blanking. Renderers
//! crop it to a window around the 256x192 picture; the border size picks how
//! much of the surrounding paper is kept.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Left edge of the 256-pixel picture in raster samples.
const PICTURE_LEFT: usize = 74;
/// Top edge of the 192-line picture in raster rows (PAL).
const PICTURE_TOP: usize = 56;
const PICTURE_WIDTH: usize = 256;
const PICTURE_HEIGHT: usize = 192;
/// NTSC frames start their picture this many rows earlier.
const NTSC_SHIFT: usize = 24;

/// Named border sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BorderSize {
    None,
    Small,
    #[default]
    Normal,
    Large,
    /// The whole raster.
    Full,
}

impl BorderSize {
    /// Border width on each side, or `None` for the whole raster.
    const fn margin(self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::Small => Some(8),
            Self::Normal => Some(32),
            Self::Large => Some(48),
            Self::Full => None,
        }
    }
}

/// Crop rectangle in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// Window for a border size on a raster of the given dimensions.
    #[must_use]
    pub fn new(border: BorderSize, ntsc: bool, raster_width: usize, raster_height: usize) -> Self {
        let Some(margin) = border.margin() else {
            return Self {
                x: 0,
                y: 0,
                width: raster_width,
                height: raster_height,
            };
        };

        let top = if ntsc {
            PICTURE_TOP - NTSC_SHIFT
        } else {
            PICTURE_TOP
        };
        let x = PICTURE_LEFT.saturating_sub(margin);
        let y = top.saturating_sub(margin);
        Self {
            x,
            y,
            width: (PICTURE_WIDTH + 2 * margin).min(raster_width.saturating_sub(x)),
            height: (PICTURE_HEIGHT + 2 * margin).min(raster_height.saturating_sub(y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_border_is_the_picture() {
        let window = Window::new(BorderSize::None, false, 414, 330);
        assert_eq!(
            window,
            Window {
                x: 74,
                y: 56,
                width: 256,
                height: 192
            }
        );
    }

    #[test]
    fn normal_border() {
        let window = Window::new(BorderSize::Normal, false, 414, 330);
        assert_eq!((window.x, window.y), (42, 24));
        assert_eq!((window.width, window.height), (320, 256));
    }

    #[test]
    fn ntsc_moves_window_up() {
        let pal = Window::new(BorderSize::Small, false, 414, 280);
        let ntsc = Window::new(BorderSize::Small, true, 414, 280);
        assert_eq!(pal.y - ntsc.y, NTSC_SHIFT);
        assert_eq!(pal.x, ntsc.x);
    }

    #[test]
    fn large_border_clamped_to_raster() {
        let window = Window::new(BorderSize::Large, true, 414, 280);
        assert_eq!(window.y, 0);
        assert!(window.y + window.height <= 280);
        assert!(window.x + window.width <= 414);
    }

    #[test]
    fn full_is_whole_raster() {
        let window = Window::new(BorderSize::Full, false, 414, 330);
        assert_eq!(
            window,
            Window {
                x: 0,
                y: 0,
                width: 414,
                height: 330
            }
        );
    }
}
