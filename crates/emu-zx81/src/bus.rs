//! ZX80/ZX81 bus: memory, display-file fetches and I/O.
//!
//! # Display-file fetches
//!
//! An opcode fetch at or above the display threshold (`m1not`) reads the
//! byte at `address & 0x7FFF`. Bytes with bit 6 set are real instructions
//! (`HALT`, `NEWLINE`) and are returned as-is. Anything else is a character:
//! the CPU sees a `NOP` while the ULA loads that character's bitmap row into
//! its shift register. Bit 7 of the character selects inverse video.
//!
//! The bitmap row comes from, in order of precedence:
//!
//! - the QS character board's RAM, when fitted and switched on,
//! - the character set at `(I & 0xFE) * 256` while `I < 0x40`,
//! - the CHR$128 board's 128-character set when `I >= 0x40`,
//! - otherwise the byte at the refresh address `I * 256 + R` (pseudo hi-res).
//!
//! # Ports
//!
//! Every `OUT` is seen by the ULA's sync logic. `IN` from an even port reads
//! the keyboard and, as a side effect, switches the HSYNC generator off.

use std::sync::Arc;

use emu_core::Bus;
use sinclair_zx81_ula::Ula;

use crate::config::{CharGenerator, MachineConfig};
use crate::keyboard::KeyboardMatrix;
use crate::memory::Memory;

/// Writes anywhere in this window switch the QS character set on or off.
const QS_CONTROL: std::ops::Range<u16> = 0x8000..0x8400;
/// QS character RAM: 64 characters of 8 rows.
const QS_FONT_BASE: u16 = 0x8400;
const QS_FONT_LEN: usize = 0x200;

/// Port read bit 6: set on 50 Hz machines.
const PORT_50HZ: u8 = 0x40;
/// Port read bit 5 is not connected and reads high.
const PORT_UNUSED: u8 = 0x20;

pub struct Zx81Bus {
    pub memory: Memory,
    pub ula: Ula,
    keyboard: Arc<KeyboardMatrix>,
    m1not: u16,
    char_generator: CharGenerator,
    qs_enabled: bool,
    qs_font: Vec<u8>,
    ntsc: bool,
}

impl Zx81Bus {
    #[must_use]
    pub fn new(config: &MachineConfig, keyboard: Arc<KeyboardMatrix>) -> Self {
        Self {
            memory: Memory::new(config),
            ula: Ula::new(config.tstates_per_line),
            keyboard,
            m1not: config.m1not,
            char_generator: config.char_generator,
            qs_enabled: false,
            qs_font: vec![0; QS_FONT_LEN],
            ntsc: config.ntsc,
        }
    }

    /// Whether the QS character set is currently replacing the ROM's.
    #[must_use]
    pub fn qs_enabled(&self) -> bool {
        self.qs_enabled
    }

    #[must_use]
    pub fn keyboard(&self) -> &Arc<KeyboardMatrix> {
        &self.keyboard
    }

    fn qs_fitted(&self) -> bool {
        self.char_generator == CharGenerator::Qs
    }

    /// Opcode fetch from the display file.
    fn display_fetch(&mut self, address: u16, refresh: u16) -> u8 {
        let data = self.memory.read(address & 0x7FFF);
        if data & 0x40 != 0 {
            return data;
        }

        let row = u16::from(self.ula.rowcounter());
        let code = u16::from(data);
        let i = refresh >> 8;
        let mut inverse = data & 0x80 != 0;

        let bitmap = if self.qs_fitted() && self.qs_enabled {
            self.qs_font[usize::from(((code & 0x3F) << 3) | row)]
        } else if i < 0x40 {
            self.memory
                .read(((i & 0xFE) << 8) | ((code & 0x3F) << 3) | row)
        } else if self.char_generator == CharGenerator::Chr128 {
            // Bit 7 picks the second half of the set instead of inverting.
            inverse = false;
            self.memory
                .read(((i & 0xFE) << 8) | ((code & 0x80) << 2) | ((code & 0x3F) << 3) | row)
        } else {
            self.memory.read(refresh)
        };

        self.ula.load_shift(bitmap, inverse);
        0x00
    }
}

impl Bus for Zx81Bus {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.memory.read(address)
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        if self.qs_fitted() {
            if QS_CONTROL.contains(&address) {
                self.qs_enabled = !self.qs_enabled;
            }
            let offset = usize::from(address.wrapping_sub(QS_FONT_BASE));
            if address >= QS_FONT_BASE && offset < QS_FONT_LEN {
                self.qs_font[offset] = value;
                return;
            }
        }
        self.memory.write(address, value);
    }

    fn opcode_fetch(&mut self, address: u16, refresh: u16) -> u8 {
        if address >= self.m1not {
            self.display_fetch(address, refresh)
        } else {
            self.memory.read(address)
        }
    }

    fn read_port(&mut self, port: u16) -> u8 {
        if port & 0x0001 != 0 {
            return 0xFF;
        }
        self.ula.latch_in(port);
        let keys = self.keyboard.read((port >> 8) as u8);
        let refresh = if self.ntsc { 0 } else { PORT_50HZ };
        keys | PORT_UNUSED | refresh
    }

    fn write_port(&mut self, port: u16, _value: u8) {
        self.ula.latch_out(port);
    }
}
