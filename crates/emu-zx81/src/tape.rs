//! Tape records for the LOAD fast path.
//!
//! A record is the byte stream the ROM would read from tape: the program
//! name (ZX81 character codes, last character with bit 7 set) followed by
//! the saved memory image. `.P` files hold only the memory image, so the
//! deck prepends a name when one is inserted.

use std::collections::VecDeque;

use log::info;

/// Supplier of tape records, consumed one per LOAD.
pub trait TapeSource {
    /// Next record, or `None` when the tape is exhausted.
    fn next_entry(&mut self) -> Option<Vec<u8>>;
}

/// Virtual tape deck: a queue of records.
#[derive(Debug, Default)]
pub struct TapeDeck {
    records: VecDeque<Vec<u8>>,
}

impl TapeDeck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a complete record, name included.
    pub fn push(&mut self, record: Vec<u8>) {
        self.records.push_back(record);
    }

    /// Queue the contents of a ZX81 `.P` file under `name`.
    pub fn push_program(&mut self, name: &str, image: &[u8]) {
        let mut record = encode_name(name);
        record.extend_from_slice(image);
        info!("Tape: {name} ({} bytes)", image.len());
        self.push(record);
    }

    /// Queue the contents of a ZX80 `.O` file.
    ///
    /// ZX80 programs have no name. An empty name (a lone terminator) keeps
    /// the image's first byte, which has bit 7 set, from being taken as
    /// the end of a name.
    pub fn push_zx80_program(&mut self, image: &[u8]) {
        let mut record = vec![NAME_TERMINATOR];
        record.extend_from_slice(image);
        info!("Tape: ZX80 program ({} bytes)", image.len());
        self.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn eject(&mut self) {
        self.records.clear();
    }
}

impl TapeSource for TapeDeck {
    fn next_entry(&mut self) -> Option<Vec<u8>> {
        self.records.pop_front()
    }
}

/// Bit 7 marks the last character of a name.
const NAME_TERMINATOR: u8 = 0x80;

/// Encode a program name in the ZX81 character set.
///
/// Characters with no ZX81 equivalent become `?`. An empty name encodes as
/// a single inverse space.
#[must_use]
pub fn encode_name(name: &str) -> Vec<u8> {
    let mut encoded: Vec<u8> = name.chars().map(zx81_char).collect();
    match encoded.last_mut() {
        Some(last) => *last |= NAME_TERMINATOR,
        None => encoded.push(NAME_TERMINATOR),
    }
    encoded
}

/// ZX81 character code for an ASCII character.
fn zx81_char(ch: char) -> u8 {
    match ch.to_ascii_uppercase() {
        ' ' => 0x00,
        '"' => 0x0B,
        '$' => 0x0D,
        ':' => 0x0E,
        '(' => 0x10,
        ')' => 0x11,
        '>' => 0x12,
        '<' => 0x13,
        '=' => 0x14,
        '+' => 0x15,
        '-' => 0x16,
        '*' => 0x17,
        '/' => 0x18,
        ';' => 0x19,
        ',' => 0x1A,
        '.' => 0x1B,
        digit @ '0'..='9' => 0x1C + (digit as u8 - b'0'),
        letter @ 'A'..='Z' => 0x26 + (letter as u8 - b'A'),
        _ => 0x0F,
    }
}
