//! Headless capture: PNG screenshots of a published frame.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use sinclair_zx81_ula::{Frame, Window};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot write screenshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("empty capture window")]
    EmptyWindow,
}

/// RGBA bytes for the part of `frame` inside `window`. Pixels outside the
/// frame come out black.
#[must_use]
pub fn window_rgba(frame: &Frame, window: Window) -> Vec<u8> {
    let argb = frame.to_argb();
    let mut rgba = Vec::with_capacity(window.width * window.height * 4);
    for y in window.y..window.y + window.height {
        for x in window.x..window.x + window.width {
            let pixel = if x < frame.width && y < frame.height {
                argb.get(y * frame.width + x).copied().unwrap_or(0)
            } else {
                0
            };
            rgba.push(((pixel >> 16) & 0xFF) as u8);
            rgba.push(((pixel >> 8) & 0xFF) as u8);
            rgba.push((pixel & 0xFF) as u8);
            rgba.push(0xFF);
        }
    }
    rgba
}

/// Save the `window` crop of `frame` as a PNG file.
pub fn save_screenshot(frame: &Frame, window: Window, path: &Path) -> Result<(), CaptureError> {
    if window.width == 0 || window.height == 0 {
        return Err(CaptureError::EmptyWindow);
    }
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        window.width as u32,
        window.height as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&window_rgba(frame, window))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sinclair_zx81_ula::{INK, PALETTE, PAPER};

    use super::*;

    fn frame() -> Frame {
        let mut pixels = vec![PAPER; 16 * 8];
        pixels[3 * 16 + 5] = INK;
        Frame {
            width: 16,
            height: 8,
            pixels,
            number: 0,
            odd_field: false,
        }
    }

    fn rgba(colour: u32) -> [u8; 4] {
        [(colour >> 16) as u8, (colour >> 8) as u8, colour as u8, 0xFF]
    }

    #[test]
    fn crop_follows_the_window() {
        let window = Window {
            x: 4,
            y: 2,
            width: 4,
            height: 3,
        };
        let bytes = window_rgba(&frame(), window);
        assert_eq!(bytes.len(), 4 * 3 * 4);
        // (5, 3) lands at column 1 of row 1 in the crop.
        let ink_at = (4 + 1) * 4;
        assert_eq!(bytes[ink_at..ink_at + 4], rgba(PALETTE[usize::from(INK)]));
        assert_eq!(bytes[0..4], rgba(PALETTE[usize::from(PAPER)]));
    }

    #[test]
    fn outside_the_frame_is_black() {
        let window = Window {
            x: 15,
            y: 0,
            width: 2,
            height: 1,
        };
        let bytes = window_rgba(&frame(), window);
        assert_eq!(bytes[4..8], [0, 0, 0, 0xFF]);
    }

    #[test]
    fn screenshot_decodes_to_window_size() {
        let path = std::env::temp_dir()
            .join(format!("emu-zx81-capture-{}.png", std::process::id()));
        let window = Window {
            x: 0,
            y: 0,
            width: 16,
            height: 8,
        };
        save_screenshot(&frame(), window, &path).expect("PNG written");

        let decoder = png::Decoder::new(fs::File::open(&path).expect("PNG exists"));
        let mut reader = decoder.read_info().expect("PNG header");
        let mut buffer = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buffer).expect("PNG data");
        let _ = fs::remove_file(&path);

        assert_eq!((info.width, info.height), (16, 8));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        let ink_at = (3 * 16 + 5) * 4;
        assert_eq!(buffer[ink_at..ink_at + 4], rgba(PALETTE[usize::from(INK)]));
    }

    #[test]
    fn empty_window_is_rejected() {
        let window = Window {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
        let path = std::env::temp_dir().join("emu-zx81-empty.png");
        assert!(matches!(
            save_screenshot(&frame(), window, &path),
            Err(CaptureError::EmptyWindow)
        ));
    }
}
