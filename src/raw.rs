//! Raw gate/detect access for calibration rigs.
//!
//! Everything here bypasses the availability probe, the energize/current
//! sequencing, and the firing engine's gate bookkeeping. The `_unsafe`
//! suffix is the contract: production paths must never reach for this
//! surface, and it is deliberately a separate type so it cannot be called
//! through the safe API by accident.

use crate::bus::RegisterBus;
use crate::channel::RegisterChannel;
use crate::controller::EdController;
use crate::registers::{control, reg, status};

/// Non-interlocked access to the gate and detect signals.
///
/// Borrows the controller's channel exclusively, so safe and raw traffic
/// cannot interleave within one borrow.
pub struct RawAccess<'a, B> {
    channel: &'a mut RegisterChannel<B>,
}

impl<B: RegisterBus, D> EdController<B, D> {
    /// Drop down to the raw gate/detect signals. Calibration tooling only.
    pub fn raw(&mut self) -> RawAccess<'_, B> {
        RawAccess {
            channel: &mut self.channel,
        }
    }
}

impl<B: RegisterBus> RawAccess<'_, B> {
    /// Drive the gate signal directly. No availability check, no timing,
    /// no mirrored state: the controller will not know the gate moved.
    pub fn set_gate_unsafe(&mut self, on: bool) {
        self.channel.update_bit(reg::CONTROL, control::GATE, on);
    }

    /// Sample the detect signal directly.
    pub fn get_detect_unsafe(&mut self) -> bool {
        self.channel.read(reg::STATUS) & status::DETECT != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdConfig;
    use crate::sim::SimHandle;

    #[test]
    fn raw_gate_drives_control_register() {
        let sim = SimHandle::new();
        let mut ed = EdController::initialize(sim.bus(), sim.clock(), EdConfig::default()).unwrap();

        ed.raw().set_gate_unsafe(true);
        assert_eq!(sim.peek(reg::CONTROL) & control::GATE, control::GATE);
        ed.raw().set_gate_unsafe(false);
        assert_eq!(sim.peek(reg::CONTROL) & control::GATE, 0);
    }

    #[test]
    fn raw_detect_reads_status_bit() {
        let sim = SimHandle::new();
        let mut ed = EdController::initialize(sim.bus(), sim.clock(), EdConfig::default()).unwrap();
        sim.set_ignition_after(0);

        assert!(!ed.raw().get_detect_unsafe());
        ed.raw().set_gate_unsafe(true);
        assert!(ed.raw().get_detect_unsafe());
    }

    #[test]
    fn raw_access_skips_availability_interlock() {
        let sim = SimHandle::new();
        let mut ed = EdController::initialize(sim.bus(), sim.clock(), EdConfig::default()).unwrap();
        sim.unplug();

        let writes = sim.write_attempts();
        ed.raw().set_gate_unsafe(true);
        // The raw layer issues traffic even though the safe path refuses to.
        assert!(sim.write_attempts() > writes);
    }
}
