//! Machine configuration.
//!
//! Read once when the machine is built. The presets match stock 16K
//! machines; a JSON file may override any field.

use serde::{Deserialize, Serialize};
use sinclair_zx81_ula::BorderSize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be non-zero")]
    ZeroTiming(&'static str),
    #[error("ROM top {rom_top:#06X} is not below RAM top {ram_top:#06X}")]
    RomOverlapsRam { rom_top: u16, ram_top: u16 },
    #[error("display threshold {0:#06X} lies inside ROM")]
    ThresholdInRom(u16),
    #[error("frame-INT position {position} is past the end of the frame ({frame} T-states)")]
    InterruptOutsideFrame { position: u32, frame: u32 },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Supported machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Zx80,
    #[default]
    Zx81,
}

/// Where display-file characters get their bitmaps from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharGenerator {
    /// Built-in character set at `I * 256`.
    #[default]
    Rom,
    /// Quicksilva programmable character board.
    Qs,
    /// dk'tronics CHR$128: 128 characters when `I` points above the ROM.
    Chr128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub model: Model,
    /// CPU clock in Hz.
    pub clock_hz: u64,
    pub tstates_per_line: u32,
    pub lines_per_frame: u32,
    /// T-state within the frame at which a frame interrupt is raised, for
    /// add-ons that drive INT directly. The ULA itself only uses A6.
    pub interrupt_tstate: Option<u32>,
    pub rom_top: u16,
    pub ram_top: u16,
    pub protect_rom: bool,
    /// Mirror the ROM into 0x2000-0x3FFF.
    pub shadow_rom: bool,
    /// Opcode fetches at or above this address are display-file fetches.
    pub m1not: u16,
    pub char_generator: CharGenerator,
    pub border: BorderSize,
    pub ntsc: bool,
    pub interlaced: bool,
    /// Stop the scanline loop after every instruction.
    pub single_step: bool,
}

impl MachineConfig {
    /// 16K ZX81, PAL.
    #[must_use]
    pub fn zx81() -> Self {
        Self {
            model: Model::Zx81,
            clock_hz: 3_250_000,
            tstates_per_line: 207,
            lines_per_frame: 312,
            interrupt_tstate: None,
            rom_top: 0x1FFF,
            ram_top: 0x7FFF,
            protect_rom: true,
            shadow_rom: true,
            m1not: 0x8000,
            char_generator: CharGenerator::Rom,
            border: BorderSize::Normal,
            ntsc: false,
            interlaced: false,
            single_step: false,
        }
    }

    /// 16K ZX80, PAL.
    #[must_use]
    pub fn zx80() -> Self {
        Self {
            model: Model::Zx80,
            rom_top: 0x0FFF,
            ..Self::zx81()
        }
    }

    /// Preset for a model.
    #[must_use]
    pub fn for_model(model: Model) -> Self {
        match model {
            Model::Zx80 => Self::zx80(),
            Model::Zx81 => Self::zx81(),
        }
    }

    /// Switch to 60 Hz timing.
    #[must_use]
    pub fn with_ntsc(mut self) -> Self {
        self.ntsc = true;
        self.lines_per_frame = 262;
        self
    }

    /// Parse a JSON configuration. Missing fields take ZX81 defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any
    /// [`validate`](Self::validate) error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn tstates_per_frame(&self) -> u32 {
        self.tstates_per_line * self.lines_per_frame
    }

    /// Check the configuration is one the machine can run.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock_hz == 0 {
            return Err(ConfigError::ZeroTiming("clock_hz"));
        }
        if self.tstates_per_line == 0 {
            return Err(ConfigError::ZeroTiming("tstates_per_line"));
        }
        if self.lines_per_frame == 0 {
            return Err(ConfigError::ZeroTiming("lines_per_frame"));
        }
        if self.rom_top >= self.ram_top {
            return Err(ConfigError::RomOverlapsRam {
                rom_top: self.rom_top,
                ram_top: self.ram_top,
            });
        }
        if self.m1not <= self.rom_top {
            return Err(ConfigError::ThresholdInRom(self.m1not));
        }
        if let Some(position) = self.interrupt_tstate
            && position >= self.tstates_per_frame()
        {
            return Err(ConfigError::InterruptOutsideFrame {
                position,
                frame: self.tstates_per_frame(),
            });
        }
        Ok(())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::zx81()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(MachineConfig::zx81().validate().is_ok());
        assert!(MachineConfig::zx80().validate().is_ok());
        assert!(MachineConfig::zx81().with_ntsc().validate().is_ok());
    }

    #[test]
    fn zx81_frame_length() {
        assert_eq!(MachineConfig::zx81().tstates_per_frame(), 207 * 312);
        assert_eq!(MachineConfig::zx81().with_ntsc().tstates_per_frame(), 207 * 262);
    }

    #[test]
    fn rejects_zero_line_length() {
        let config = MachineConfig {
            tstates_per_line: 0,
            ..MachineConfig::zx81()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTiming("tstates_per_line"))
        ));
    }

    #[test]
    fn rejects_rom_above_ram() {
        let config = MachineConfig {
            rom_top: 0x7FFF,
            ram_top: 0x43FF,
            ..MachineConfig::zx81()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RomOverlapsRam { .. })
        ));
    }

    #[test]
    fn rejects_interrupt_past_frame() {
        let config = MachineConfig {
            interrupt_tstate: Some(207 * 312),
            ..MachineConfig::zx81()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InterruptOutsideFrame { .. })
        ));
    }

    #[test]
    fn json_overrides_defaults() {
        let config = MachineConfig::from_json(
            r#"{"model": "zx80", "ram_top": 17407, "border": "large", "char_generator": "qs"}"#,
        )
        .expect("valid config");
        assert_eq!(config.model, Model::Zx80);
        assert_eq!(config.ram_top, 0x43FF);
        assert_eq!(config.border, BorderSize::Large);
        assert_eq!(config.char_generator, CharGenerator::Qs);
        assert_eq!(config.tstates_per_line, 207);
    }

    #[test]
    fn json_errors_are_reported() {
        assert!(matches!(
            MachineConfig::from_json("{\"tstates_per_line\": \"x\"}"),
            Err(ConfigError::Parse(_))
        ));
    }
}
