//! Master clock configuration.

use crate::Ticks;

/// Master clock configuration for a system.
///
/// On the ZX80/ZX81 the CPU clock is the only clock the core cares about:
/// the video is generated by the CPU itself, so everything is counted in
/// CPU T-states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `3_250_000` for the ZX81).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// Frame rate for a frame of `ticks_per_frame` ticks.
    #[must_use]
    pub fn frames_per_second(&self, ticks_per_frame: Ticks) -> f64 {
        if ticks_per_frame.get() == 0 {
            return 0.0;
        }
        self.frequency_hz as f64 / ticks_per_frame.get() as f64
    }

    /// Wall-clock duration of `ticks` at this frequency.
    #[must_use]
    pub fn duration_of(&self, ticks: Ticks) -> std::time::Duration {
        if self.frequency_hz == 0 {
            return std::time::Duration::ZERO;
        }
        let nanos = u128::from(ticks.get()) * 1_000_000_000 / u128::from(self.frequency_hz);
        std::time::Duration::from_nanos(nanos as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zx81_pal_frame_rate() {
        let clock = MasterClock::new(3_250_000);
        // 310 lines of 207 T-states
        let fps = clock.frames_per_second(Ticks::new(310 * 207));
        assert!((fps - 50.65).abs() < 0.01, "got {fps}");
    }

    #[test]
    fn duration_of_one_second() {
        let clock = MasterClock::new(3_250_000);
        assert_eq!(
            clock.duration_of(Ticks::new(3_250_000)),
            std::time::Duration::from_secs(1)
        );
    }
}
