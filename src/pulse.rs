//! Pulse firing engine: the gate-and-detect handshake.
//!
//! One firing attempt is: open the gate, watch the detect signal for up to
//! the caller's window, and either hold the discharge for the requested
//! duration (measured from the *ignition* point, not from gate-on) or
//! abort. Non-ignition is an expected, frequent outcome in ED machining;
//! it is a value, not an error.

use embedded_hal::delay::DelayNs;
use log::{trace, warn};

use crate::bus::RegisterBus;
use crate::controller::EdController;
use crate::registers::{NO_IGNITION, control, reg, status};

/// Outcome of one firing attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseResult {
    /// The discharge ignited `delay_us` microseconds after gate-on.
    /// Always strictly less than the [`NO_IGNITION`] sentinel.
    Ignition { delay_us: u16 },
    /// The detect window elapsed without a discharge.
    NoIgnition,
}

impl PulseResult {
    /// Wire encoding used by the host protocol: the ignition delay, or
    /// `u16::MAX` for no ignition.
    pub fn as_wire(self) -> u16 {
        match self {
            Self::Ignition { delay_us } => delay_us,
            Self::NoIgnition => NO_IGNITION,
        }
    }

    pub fn ignited(self) -> bool {
        matches!(self, Self::Ignition { .. })
    }
}

impl<B: RegisterBus, D: DelayNs> EdController<B, D> {
    /// Fire a single discharge pulse.
    ///
    /// `pulse_us` is the discharge duration held after ignition is
    /// detected; `max_wait_us` bounds how long the gate stays open waiting
    /// for ignition. A window of `0` resolves to no-ignition without
    /// asserting the gate at all, as does an unavailable board. `pulse_us`
    /// beyond the configured `max_pulse_us` is refused outright: the host
    /// owns that contract and a silent clamp would falsify its energy
    /// accounting.
    pub fn fire_pulse(&mut self, pulse_us: u16, max_wait_us: u16) -> PulseResult {
        if !self.is_available() {
            return PulseResult::NoIgnition;
        }
        if max_wait_us == 0 {
            return PulseResult::NoIgnition;
        }
        if pulse_us > self.config.max_pulse_us {
            warn!(
                "ed: pulse of {pulse_us} µs refused, board limit is {} µs",
                self.config.max_pulse_us
            );
            return PulseResult::NoIgnition;
        }

        // Cap the window one tick under the sentinel so a measured delay
        // can never alias NO_IGNITION.
        let window = max_wait_us.min(u16::MAX - 1);

        self.channel.update_bit(reg::CONTROL, control::GATE, true);

        let mut elapsed: u16 = 0;
        let result = loop {
            if self.channel.read(reg::STATUS) & status::DETECT != 0 {
                break PulseResult::Ignition { delay_us: elapsed };
            }
            if elapsed >= window {
                break PulseResult::NoIgnition;
            }
            let step = self.config.detect_poll_us.min(window - elapsed);
            self.delay.delay_us(u32::from(step));
            elapsed += step;
        };

        match result {
            PulseResult::Ignition { delay_us } => {
                // Discharge duration counts from the ignition point.
                self.delay.delay_us(u32::from(pulse_us));
                self.channel.update_bit(reg::CONTROL, control::GATE, false);
                self.pulses_fired = self.pulses_fired.saturating_add(1);
                trace!("ed: pulse ignited after {delay_us} µs");
            }
            PulseResult::NoIgnition => {
                self.channel.update_bit(reg::CONTROL, control::GATE, false);
                self.misfires = self.misfires.saturating_add(1);
                trace!("ed: no ignition within {window} µs");
            }
        }

        self.last_pulse = Some(result);
        result
    }
}
