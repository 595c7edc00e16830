//! Property tests for the sentinel and buffer-safety contracts.
//!
//! Runs on the host only; every case drives the real controller against
//! the simulated board with arbitrary inputs.

use edpulse::bus::RegisterBus;
use edpulse::registers::TEMP_UNKNOWN;
use edpulse::sim::SimHandle;
use edpulse::{EdConfig, EdController, PulseResult};
use proptest::prelude::*;

fn bring_up(sim: &SimHandle) -> EdController<SimHandle, SimHandle> {
    EdController::initialize(sim.bus(), sim.clock(), EdConfig::default()).unwrap()
}

proptest! {
    /// dump_state writes at most `capacity` bytes, never a newline, and
    /// stays valid UTF-8 at every truncation point, for any board state.
    #[test]
    fn dump_never_overruns_any_capacity(
        capacity in 0usize..=200,
        current in 0u16..=3000,
        temp in 0u8..=255,
        plugged in any::<bool>(),
    ) {
        let sim = SimHandle::new();
        let mut ed = bring_up(&sim);
        sim.set_temp(temp);
        ed.set_current(current);
        if !plugged {
            sim.unplug();
        }

        let mut buf = vec![0xA5u8; capacity];
        let n = ed.dump_state(&mut buf);
        prop_assert!(n <= capacity);
        let text = core::str::from_utf8(&buf[..n]).unwrap();
        prop_assert!(!text.contains('\n'));
    }

    /// Any register written over the bus reads back over the bus
    /// (against the simulated register file).
    #[test]
    fn register_round_trip(addr in 0u8..=255, value in 0u8..=255) {
        let sim = SimHandle::new();
        let mut bus = sim.bus();

        bus.write(addr, value).unwrap();
        prop_assert_eq!(bus.read(addr).unwrap(), value);
    }

    /// A measured ignition delay is always strictly below the sentinel
    /// and never under-reports: the detect poll quantizes upward by at
    /// most one poll step.
    #[test]
    fn ignition_delay_never_aliases_sentinel(
        ignition_after in 0u32..=60_000,
        window in 1u16..=u16::MAX,
    ) {
        let sim = SimHandle::new();
        let mut ed = bring_up(&sim);
        sim.set_ignition_after(ignition_after);

        let step = u32::from(EdConfig::default().detect_poll_us);
        match ed.fire_pulse(10, window) {
            PulseResult::Ignition { delay_us } => {
                prop_assert!(delay_us != u16::MAX);
                let measured = u32::from(delay_us);
                prop_assert!(measured >= ignition_after.min(u32::from(window)));
                prop_assert!(measured < ignition_after + step);
                prop_assert_eq!(ed.last_pulse(), Some(PulseResult::Ignition { delay_us }));
            }
            PulseResult::NoIgnition => {
                // Only legitimate when ignition falls outside the window
                // (the window itself is capped one tick under the sentinel).
                prop_assert!(ignition_after > u32::from(window.min(u16::MAX - 1)));
            }
        }
    }

    /// Temperature is exactly 255 when faulted or absent, otherwise it is
    /// whatever the board reports (255 from the board also means unknown).
    #[test]
    fn temperature_sentinel_contract(
        temp in 0u8..=255,
        fault in any::<bool>(),
        plugged in any::<bool>(),
    ) {
        let sim = SimHandle::new();
        let mut ed = bring_up(&sim);
        sim.set_temp(temp);
        if fault {
            sim.fault_temp_sensor();
        }
        if !plugged {
            sim.unplug();
        }

        let reading = ed.read_temperature();
        if !plugged || fault {
            prop_assert_eq!(reading, TEMP_UNKNOWN);
        } else {
            prop_assert_eq!(reading, temp);
        }
    }
}
