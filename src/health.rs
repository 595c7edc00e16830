//! Board health: temperature and the state dump.

use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterBus;
use crate::controller::EdController;
use crate::pulse::PulseResult;
use crate::registers::{TEMP_UNKNOWN, reg, status};

/// Worst-case rendered dump length; longer internal state is truncated
/// before it ever reaches the caller's buffer.
const DUMP_CAPACITY: usize = 160;

impl<B: RegisterBus, D: DelayNs> EdController<B, D> {
    /// Board temperature in whole degrees Celsius, `0..=254`.
    ///
    /// Returns `255` when the reading is not possible: board absent,
    /// sensor path faulted, or the register itself carrying the board's
    /// own fault encoding. Callers must treat `255` as "unknown", never
    /// as a reading.
    pub fn read_temperature(&mut self) -> u8 {
        if !self.is_available() {
            return TEMP_UNKNOWN;
        }
        if self.channel.read(reg::STATUS) & status::TEMP_FAULT != 0 {
            return TEMP_UNKNOWN;
        }
        self.channel.read(reg::TEMP)
    }

    /// Render a compact single-line snapshot of the channel state into
    /// `out`, truncating to its length. Returns the number of bytes
    /// written. The output never contains a newline.
    pub fn dump_state(&mut self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            return 0;
        }

        let avail = self.is_available();
        let temp = self.read_temperature();

        let mut line: heapless::String<DUMP_CAPACITY> = heapless::String::new();
        // A full line that overflows DUMP_CAPACITY is itself truncated by
        // heapless; either way the caller's buffer bounds the result.
        let _ = write!(
            line,
            "ed avail={} energize={} current={}mA temp=",
            u8::from(avail),
            if self.energized { "on" } else { "off" },
            self.current_ma,
        );
        if temp == TEMP_UNKNOWN {
            let _ = write!(line, "?");
        } else {
            let _ = write!(line, "{temp}C");
        }
        match self.last_pulse {
            None => {
                let _ = write!(line, " last=none");
            }
            Some(PulseResult::Ignition { delay_us }) => {
                let _ = write!(line, " last=ign({delay_us}us)");
            }
            Some(PulseResult::NoIgnition) => {
                let _ = write!(line, " last=noign");
            }
        }
        let _ = write!(
            line,
            " pulses={} misfires={} busfaults={}",
            self.pulses_fired,
            self.misfires,
            self.channel.fault_count(),
        );

        let n = line.len().min(out.len());
        out[..n].copy_from_slice(&line.as_bytes()[..n]);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdConfig;
    use crate::sim::SimHandle;

    fn controller(sim: &SimHandle) -> EdController<SimHandle, SimHandle> {
        EdController::initialize(sim.bus(), sim.clock(), EdConfig::default()).unwrap()
    }

    #[test]
    fn temperature_reads_through() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);
        sim.set_temp(42);
        assert_eq!(ed.read_temperature(), 42);
    }

    #[test]
    fn temperature_sentinel_on_sensor_fault() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);
        sim.set_temp(42);
        sim.fault_temp_sensor();
        assert_eq!(ed.read_temperature(), TEMP_UNKNOWN);
    }

    #[test]
    fn temperature_sentinel_when_unplugged() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);
        sim.unplug();
        assert_eq!(ed.read_temperature(), TEMP_UNKNOWN);
    }

    #[test]
    fn dump_fits_and_has_no_newline() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);
        sim.set_temp(37);
        ed.set_current(1500);

        let mut buf = [0u8; 160];
        let n = ed.dump_state(&mut buf);
        assert!(n > 0 && n <= buf.len());
        let text = core::str::from_utf8(&buf[..n]).unwrap();
        assert!(!text.contains('\n'));
        assert!(text.contains("current=1500mA"));
        assert!(text.contains("temp=37C"));
    }

    #[test]
    fn dump_truncates_to_tiny_buffer() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);

        let mut buf = [0xAAu8; 8];
        let n = ed.dump_state(&mut buf);
        assert_eq!(n, 8);
        assert_eq!(&buf[..n], b"ed avail");
    }

    #[test]
    fn dump_into_empty_buffer_writes_nothing() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);
        assert_eq!(ed.dump_state(&mut []), 0);
    }

    #[test]
    fn dump_reports_unknown_temp() {
        let sim = SimHandle::new();
        let mut ed = controller(&sim);
        sim.fault_temp_sensor();

        let mut buf = [0u8; 160];
        let n = ed.dump_state(&mut buf);
        let text = core::str::from_utf8(&buf[..n]).unwrap();
        assert!(text.contains("temp=?"));
    }
}
