//! Board-specific timing and capability constants.
//!
//! Settle times, current capability and polling granularity are properties
//! of the attached board, so they live here as configuration rather than
//! as hard-coded magic numbers. Defaults match
//! the rev-B board; a different board stuffing supplies its own values.

/// Configuration for one ED channel.
#[derive(Debug, Clone)]
pub struct EdConfig {
    // --- Capability ---
    /// Maximum pulse current the output stage can regulate (mA).
    pub max_current_ma: u16,
    /// Maximum single-pulse duration the output stage tolerates (µs).
    pub max_pulse_us: u16,

    // --- Settle timing ---
    /// Deadline for a polarity (energize) transition to settle (µs).
    pub energize_settle_timeout_us: u32,
    /// Deadline for a current transition to settle (µs).
    pub current_settle_timeout_us: u32,
    /// Poll interval while waiting for a settle (µs).
    pub settle_poll_us: u32,

    // --- Pulse timing ---
    /// Poll interval for the detect signal during a firing window (µs).
    /// Also the resolution of the reported ignition delay.
    pub detect_poll_us: u16,
}

impl Default for EdConfig {
    fn default() -> Self {
        Self {
            // Capability (rev-B output stage)
            max_current_ma: 3000,
            max_pulse_us: 10_000,

            // Settle timing: polarity relays are the slow axis
            energize_settle_timeout_us: 200_000, // 200 ms
            current_settle_timeout_us: 50_000,   // 50 ms
            settle_poll_us: 500,

            // Pulse timing
            detect_poll_us: 50,
        }
    }
}

impl EdConfig {
    /// Reject degenerate values instead of silently clamping them.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_current_ma == 0 {
            return Err("max_current_ma must be nonzero");
        }
        if self.max_pulse_us == 0 {
            return Err("max_pulse_us must be nonzero");
        }
        if self.settle_poll_us == 0 {
            return Err("settle_poll_us must be nonzero");
        }
        if self.detect_poll_us == 0 {
            return Err("detect_poll_us must be nonzero");
        }
        if self.energize_settle_timeout_us < self.settle_poll_us {
            return Err("energize settle timeout shorter than one poll");
        }
        if self.current_settle_timeout_us < self.settle_poll_us {
            return Err("current settle timeout shorter than one poll");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = EdConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.max_current_ma > 0);
        assert!(u32::from(c.detect_poll_us) < c.energize_settle_timeout_us);
    }

    #[test]
    fn zero_poll_step_rejected() {
        let c = EdConfig {
            detect_poll_us: 0,
            ..EdConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn timeout_shorter_than_poll_rejected() {
        let c = EdConfig {
            settle_poll_us: 1000,
            current_settle_timeout_us: 500,
            ..EdConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
