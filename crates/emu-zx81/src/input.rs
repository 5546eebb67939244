//! Input handling for the ZX80/ZX81.
//!
//! Three layers:
//! 1. `Zx81Key`: logical key names mapped to the 8x5 keyboard matrix.
//! 2. Immediate `press_key`/`release_key` methods on `Zx81`.
//! 3. `InputQueue`: timed key events for scripted sequences such as
//!    typing `LOAD ""` after power-on.

use std::collections::VecDeque;

use crate::config::Model;
use crate::keyboard::KeyboardMatrix;

/// Logical key on the ZX80/ZX81 keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zx81Key {
    // Row 0 (addr bit A8)
    Shift,
    Z,
    X,
    C,
    V,
    // Row 1 (addr bit A9)
    A,
    S,
    D,
    F,
    G,
    // Row 2 (addr bit A10)
    Q,
    W,
    E,
    R,
    T,
    // Row 3 (addr bit A11)
    N1,
    N2,
    N3,
    N4,
    N5,
    // Row 4 (addr bit A12)
    N0,
    N9,
    N8,
    N7,
    N6,
    // Row 5 (addr bit A13)
    P,
    O,
    I,
    U,
    Y,
    // Row 6 (addr bit A14)
    NewLine,
    L,
    K,
    J,
    H,
    // Row 7 (addr bit A15)
    Space,
    Period,
    M,
    N,
    B,
}

impl Zx81Key {
    /// Return the (row, bit) pair for this key in the keyboard matrix.
    #[must_use]
    pub const fn matrix(self) -> (usize, u8) {
        match self {
            Self::Shift => (0, 0),
            Self::Z => (0, 1),
            Self::X => (0, 2),
            Self::C => (0, 3),
            Self::V => (0, 4),

            Self::A => (1, 0),
            Self::S => (1, 1),
            Self::D => (1, 2),
            Self::F => (1, 3),
            Self::G => (1, 4),

            Self::Q => (2, 0),
            Self::W => (2, 1),
            Self::E => (2, 2),
            Self::R => (2, 3),
            Self::T => (2, 4),

            Self::N1 => (3, 0),
            Self::N2 => (3, 1),
            Self::N3 => (3, 2),
            Self::N4 => (3, 3),
            Self::N5 => (3, 4),

            Self::N0 => (4, 0),
            Self::N9 => (4, 1),
            Self::N8 => (4, 2),
            Self::N7 => (4, 3),
            Self::N6 => (4, 4),

            Self::P => (5, 0),
            Self::O => (5, 1),
            Self::I => (5, 2),
            Self::U => (5, 3),
            Self::Y => (5, 4),

            Self::NewLine => (6, 0),
            Self::L => (6, 1),
            Self::K => (6, 2),
            Self::J => (6, 3),
            Self::H => (6, 4),

            Self::Space => (7, 0),
            Self::Period => (7, 1),
            Self::M => (7, 2),
            Self::N => (7, 3),
            Self::B => (7, 4),
        }
    }
}

/// A timed keyboard event.
#[derive(Debug, Clone)]
pub struct InputEvent {
    /// Frame number at which this event fires.
    pub frame: u64,
    pub key: Zx81Key,
    /// True = press, false = release.
    pub pressed: bool,
}

/// Timed input queue for scripted key sequences.
///
/// Events are sorted by frame number and processed at the start of each frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a raw input event.
    pub fn push(&mut self, event: InputEvent) {
        let pos = self
            .events
            .iter()
            .position(|e| e.frame > event.frame)
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
    }

    /// Press `keys` together at `at_frame` and release them `hold_frames`
    /// later.
    pub fn enqueue_keys(&mut self, keys: &[Zx81Key], at_frame: u64, hold_frames: u64) {
        for &key in keys {
            self.push(InputEvent {
                frame: at_frame,
                key,
                pressed: true,
            });
            self.push(InputEvent {
                frame: at_frame + hold_frames,
                key,
                pressed: false,
            });
        }
    }

    /// Enqueue typing a string. Keywords are not expanded: each character
    /// is one key (or Shift plus a key).
    ///
    /// Each character is held for 3 frames with a 3-frame gap. Returns the
    /// next free frame.
    pub fn enqueue_text(&mut self, text: &str, start_frame: u64) -> u64 {
        let mut frame = start_frame;
        for ch in text.chars() {
            let keys = char_to_keys(ch);
            if keys.is_empty() {
                continue;
            }
            self.enqueue_keys(&keys, frame, KEY_HOLD_FRAMES);
            frame += KEY_HOLD_FRAMES + KEY_GAP_FRAMES;
        }
        frame
    }

    /// Type the model's LOAD command so the ROM starts reading tape.
    ///
    /// The ZX81 takes `J` (LOAD in keyword mode) and an empty name; the
    /// ZX80 takes `W` and nothing else. Returns the next free frame.
    pub fn enqueue_autoload(&mut self, model: Model, start_frame: u64) -> u64 {
        let sequence: &[&[Zx81Key]] = match model {
            Model::Zx81 => &[
                &[Zx81Key::J],
                &[Zx81Key::Shift, Zx81Key::P],
                &[Zx81Key::Shift, Zx81Key::P],
                &[Zx81Key::NewLine],
            ],
            Model::Zx80 => &[&[Zx81Key::W], &[Zx81Key::NewLine]],
        };
        let mut frame = start_frame;
        for keys in sequence {
            self.enqueue_keys(keys, frame, KEY_HOLD_FRAMES);
            frame += KEY_HOLD_FRAMES + KEY_GAP_FRAMES;
        }
        frame
    }

    /// Apply all events due by `frame` to the keyboard.
    pub fn process(&mut self, frame: u64, keyboard: &KeyboardMatrix) {
        while self.events.front().is_some_and(|event| event.frame <= frame) {
            if let Some(event) = self.events.pop_front() {
                let (row, bit) = event.key.matrix();
                keyboard.set_key(row, bit, event.pressed);
            }
        }
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

const KEY_HOLD_FRAMES: u64 = 3;
const KEY_GAP_FRAMES: u64 = 3;

/// Map a character to the keys needed to type it.
fn char_to_keys(ch: char) -> Vec<Zx81Key> {
    use Zx81Key as K;
    let key = match ch.to_ascii_uppercase() {
        'A' => K::A,
        'B' => K::B,
        'C' => K::C,
        'D' => K::D,
        'E' => K::E,
        'F' => K::F,
        'G' => K::G,
        'H' => K::H,
        'I' => K::I,
        'J' => K::J,
        'K' => K::K,
        'L' => K::L,
        'M' => K::M,
        'N' => K::N,
        'O' => K::O,
        'P' => K::P,
        'Q' => K::Q,
        'R' => K::R,
        'S' => K::S,
        'T' => K::T,
        'U' => K::U,
        'V' => K::V,
        'W' => K::W,
        'X' => K::X,
        'Y' => K::Y,
        'Z' => K::Z,
        '0' => K::N0,
        '1' => K::N1,
        '2' => K::N2,
        '3' => K::N3,
        '4' => K::N4,
        '5' => K::N5,
        '6' => K::N6,
        '7' => K::N7,
        '8' => K::N8,
        '9' => K::N9,
        ' ' => K::Space,
        '.' => K::Period,
        '\n' => K::NewLine,
        shifted => {
            return match shifted {
                '"' => vec![K::Shift, K::P],
                ')' => vec![K::Shift, K::O],
                '(' => vec![K::Shift, K::I],
                '$' => vec![K::Shift, K::U],
                ':' => vec![K::Shift, K::Z],
                ';' => vec![K::Shift, K::X],
                '?' => vec![K::Shift, K::C],
                '/' => vec![K::Shift, K::V],
                '-' => vec![K::Shift, K::J],
                '+' => vec![K::Shift, K::K],
                '=' => vec![K::Shift, K::L],
                '>' => vec![K::Shift, K::M],
                '<' => vec![K::Shift, K::N],
                '*' => vec![K::Shift, K::B],
                ',' => vec![K::Shift, K::Period],
                _ => Vec::new(),
            };
        }
    };
    vec![key]
}
