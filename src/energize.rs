//! Energize/current controller: the two slow axes.
//!
//! Both setters block the (single) calling thread until the board confirms
//! the transition, bounded by the configured settle deadline. That contract
//! is what lets the firing engine assume its electrical precondition is
//! satisfied at entry instead of racing a half-applied current change.
//!
//! A settle timeout is logged and swallowed, not escalated: the mirrored
//! state simply keeps its last confirmed value and the caller re-probes on
//! its own schedule.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::bus::RegisterBus;
use crate::channel::RegisterChannel;
use crate::controller::EdController;
use crate::registers::{control, reg, status};

impl<B: RegisterBus, D: DelayNs> EdController<B, D> {
    /// Switch base polarity on or off and wait for the transition to
    /// complete. Safe no-op when the board is unavailable or already in
    /// the requested state.
    pub fn set_energize(&mut self, on: bool) {
        if !self.is_available() {
            debug!("ed: set_energize({on}) ignored, board unavailable");
            return;
        }
        if on == self.energized {
            return;
        }

        self.channel.update_bit(reg::CONTROL, control::ENERGIZE, on);

        let timeout = self.config.energize_settle_timeout_us;
        let settled = self.wait_settle(timeout, |ch| {
            let st = ch.read(reg::STATUS);
            st & status::ENERGIZE_BUSY == 0 && (st & status::ENERGIZED != 0) == on
        });

        if settled {
            self.energized = on;
            info!("ed: energize {}", if on { "ON" } else { "OFF" });
        } else {
            warn!("ed: energize transition did not settle within {timeout} µs");
        }
    }

    /// Request a pulse current and wait until the regulator readback
    /// matches. Requests above the board's capability are clamped to
    /// `max_current_ma` (with a warning); callable in either energize
    /// state. Re-requesting an already-settled value returns after a
    /// verification read, without re-running the transition.
    pub fn set_current(&mut self, milliamps: u16) {
        if !self.is_available() {
            debug!("ed: set_current({milliamps}) ignored, board unavailable");
            return;
        }

        let ma = if milliamps > self.config.max_current_ma {
            warn!(
                "ed: current request {milliamps} mA above capability, clamped to {} mA",
                self.config.max_current_ma
            );
            self.config.max_current_ma
        } else {
            milliamps
        };

        if ma == self.current_ma && self.read_current_readback() == ma {
            debug!("ed: current already settled at {ma} mA");
            return;
        }

        let [lo, hi] = ma.to_le_bytes();
        self.channel.write(reg::CURRENT_LO, lo);
        // Writing the high byte latches the pair and starts the transition.
        self.channel.write(reg::CURRENT_HI, hi);

        let timeout = self.config.current_settle_timeout_us;
        let settled = self.wait_settle(timeout, |ch| {
            let st = ch.read(reg::STATUS);
            if st & status::CURRENT_BUSY != 0 {
                return false;
            }
            let rb = u16::from_le_bytes([ch.read(reg::CURRENT_RB_LO), ch.read(reg::CURRENT_RB_HI)]);
            rb == ma
        });

        if settled {
            self.current_ma = ma;
            info!("ed: current settled at {ma} mA");
        } else {
            warn!("ed: current transition to {ma} mA did not settle within {timeout} µs");
        }
    }

    fn read_current_readback(&mut self) -> u16 {
        u16::from_le_bytes([
            self.channel.read(reg::CURRENT_RB_LO),
            self.channel.read(reg::CURRENT_RB_HI),
        ])
    }

    /// Poll `done` every `settle_poll_us` until it reports true or
    /// `timeout_us` has been slept away. Checks once before sleeping so an
    /// already-settled condition costs no delay at all.
    pub(crate) fn wait_settle<F>(&mut self, timeout_us: u32, mut done: F) -> bool
    where
        F: FnMut(&mut RegisterChannel<B>) -> bool,
    {
        let mut waited: u32 = 0;
        loop {
            if done(&mut self.channel) {
                return true;
            }
            if waited >= timeout_us {
                return false;
            }
            let step = self.config.settle_poll_us.min(timeout_us - waited);
            self.delay.delay_us(step);
            waited += step;
        }
    }
}
