//! Simulated ED companion board for host-side tests and bring-up rigs.
//!
//! One behavioral model stands in for both halves of the hardware seam: it
//! implements [`RegisterBus`] (the register file plus the board's reaction
//! to control writes) and [`DelayNs`] (a virtual microsecond clock, so a
//! "blocking" settle completes instantly in wall time while the modeled
//! timeline stays exact). Tests script it: plug state, ignition delay,
//! sensor faults, and it records bus traffic so interlock tests can assert
//! that a refused operation really issued nothing.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::bus::RegisterBus;
use crate::error::{BusError, BusResult};
use crate::registers::{BOARD_SIGNATURE, control, reg, status};

/// Board-side state and timeline.
struct SimBoard {
    regs: [u8; 256],
    clock_ns: u64,
    plugged: bool,
    /// When set, pending transitions never resolve (settle-timeout tests).
    frozen: bool,

    /// Scheduled ignition delay after gate-on; `None` = never ignites.
    ignition_after_us: Option<u32>,
    gate_on_at_ns: Option<u64>,
    energize_pending: Option<(bool, u64)>,
    current_pending: Option<(u16, u64)>,

    reads: u32,
    non_probe_reads: u32,
    writes: u32,
}

impl SimBoard {
    fn new() -> Self {
        let mut regs = [0u8; 256];
        regs[reg::ID as usize] = BOARD_SIGNATURE;
        regs[reg::FW_VERSION as usize] = 2;
        Self {
            regs,
            clock_ns: 0,
            plugged: true,
            frozen: false,
            ignition_after_us: None,
            gate_on_at_ns: None,
            energize_pending: None,
            current_pending: None,
            reads: 0,
            non_probe_reads: 0,
            writes: 0,
        }
    }

    fn bus_read(&mut self, addr: u8) -> BusResult<u8> {
        self.reads += 1;
        if addr != reg::ID {
            self.non_probe_reads += 1;
        }
        if !self.plugged {
            return Err(BusError::Timeout);
        }
        self.step_events();
        Ok(self.regs[addr as usize])
    }

    fn bus_write(&mut self, addr: u8, value: u8) -> BusResult<()> {
        self.writes += 1;
        if !self.plugged {
            return Err(BusError::Timeout);
        }
        match addr {
            reg::CONTROL => {
                let prev = self.regs[reg::CONTROL as usize];
                self.regs[reg::CONTROL as usize] = value;

                let gate_was = prev & control::GATE != 0;
                let gate_now = value & control::GATE != 0;
                if gate_now && !gate_was {
                    self.gate_on_at_ns = Some(self.clock_ns);
                } else if gate_was && !gate_now {
                    self.gate_on_at_ns = None;
                    self.regs[reg::STATUS as usize] &= !status::DETECT;
                }

                let en_was = prev & control::ENERGIZE != 0;
                let en_now = value & control::ENERGIZE != 0;
                if en_now != en_was {
                    self.regs[reg::STATUS as usize] |= status::ENERGIZE_BUSY;
                    self.energize_pending =
                        Some((en_now, self.clock_ns + SimHandle::ENERGIZE_SETTLE_US * 1000));
                }
            }
            reg::CURRENT_HI => {
                // The high byte latches the pair and starts the regulator.
                self.regs[reg::CURRENT_HI as usize] = value;
                let ma =
                    u16::from_le_bytes([self.regs[reg::CURRENT_LO as usize], value]);
                self.regs[reg::STATUS as usize] |= status::CURRENT_BUSY;
                self.current_pending =
                    Some((ma, self.clock_ns + SimHandle::CURRENT_SETTLE_US * 1000));
            }
            _ => self.regs[addr as usize] = value,
        }
        self.step_events();
        Ok(())
    }

    fn advance_ns(&mut self, ns: u32) {
        self.clock_ns += u64::from(ns);
        self.step_events();
    }

    /// Resolve any timeline event whose deadline has passed.
    fn step_events(&mut self) {
        if self.frozen {
            return;
        }
        if let Some((on, at)) = self.energize_pending {
            if self.clock_ns >= at {
                if on {
                    self.regs[reg::STATUS as usize] |= status::ENERGIZED;
                } else {
                    self.regs[reg::STATUS as usize] &= !status::ENERGIZED;
                }
                self.regs[reg::STATUS as usize] &= !status::ENERGIZE_BUSY;
                self.energize_pending = None;
            }
        }
        if let Some((ma, at)) = self.current_pending {
            if self.clock_ns >= at {
                let [lo, hi] = ma.to_le_bytes();
                self.regs[reg::CURRENT_RB_LO as usize] = lo;
                self.regs[reg::CURRENT_RB_HI as usize] = hi;
                self.regs[reg::STATUS as usize] &= !status::CURRENT_BUSY;
                self.current_pending = None;
            }
        }
        if let (Some(gate_at), Some(delay_us)) = (self.gate_on_at_ns, self.ignition_after_us) {
            if self.clock_ns >= gate_at + u64::from(delay_us) * 1000 {
                self.regs[reg::STATUS as usize] |= status::DETECT;
            }
        }
    }
}

/// Shared handle to one [`SimBoard`]; clones observe the same board, so
/// the same model serves as the controller's bus and its delay provider.
#[derive(Clone)]
pub struct SimHandle(Rc<RefCell<SimBoard>>);

impl SimHandle {
    /// Relay settle time modeled for a polarity transition (µs).
    pub const ENERGIZE_SETTLE_US: u64 = 20_000;
    /// Regulator settle time modeled for a current transition (µs).
    pub const CURRENT_SETTLE_US: u64 = 5_000;

    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SimBoard::new())))
    }

    /// The handle to pass as the controller's register bus.
    pub fn bus(&self) -> Self {
        self.clone()
    }

    /// The handle to pass as the controller's delay provider.
    pub fn clock(&self) -> Self {
        self.clone()
    }

    // --- Scripting -------------------------------------------------------

    /// Detach the board: every bus exchange fails until [`replug`](Self::replug).
    pub fn unplug(&self) {
        self.0.borrow_mut().plugged = false;
    }

    pub fn replug(&self) {
        self.0.borrow_mut().plugged = true;
    }

    /// Ignite `us` microseconds after the next gate-on.
    pub fn set_ignition_after(&self, us: u32) {
        self.0.borrow_mut().ignition_after_us = Some(us);
    }

    /// Never ignite (open gap / flushing failure).
    pub fn set_ignition_after_never(&self) {
        self.0.borrow_mut().ignition_after_us = None;
    }

    pub fn set_temp(&self, celsius: u8) {
        self.0.borrow_mut().regs[reg::TEMP as usize] = celsius;
    }

    /// Fault the board's temperature sensor path.
    pub fn fault_temp_sensor(&self) {
        self.0.borrow_mut().regs[reg::STATUS as usize] |= status::TEMP_FAULT;
    }

    /// Stop all pending transitions from ever settling.
    pub fn freeze_settling(&self) {
        self.0.borrow_mut().frozen = true;
    }

    // --- Observation -----------------------------------------------------

    /// Virtual time slept away by the controller, in µs.
    pub fn now_us(&self) -> u64 {
        self.0.borrow().clock_ns / 1000
    }

    /// Direct register file access, bypassing the bus (no traffic counted,
    /// works while unplugged).
    pub fn peek(&self, addr: u8) -> u8 {
        self.0.borrow().regs[addr as usize]
    }

    pub fn poke(&self, addr: u8, value: u8) {
        self.0.borrow_mut().regs[addr as usize] = value;
    }

    /// Bus write exchanges attempted (including ones that failed unplugged).
    pub fn write_attempts(&self) -> u32 {
        self.0.borrow().writes
    }

    /// Bus read exchanges attempted.
    pub fn read_attempts(&self) -> u32 {
        self.0.borrow().reads
    }

    /// Read exchanges of anything other than the ID probe register.
    pub fn non_probe_reads(&self) -> u32 {
        self.0.borrow().non_probe_reads
    }
}

impl Default for SimHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimHandle {
    fn read(&mut self, addr: u8) -> BusResult<u8> {
        self.0.borrow_mut().bus_read(addr)
    }

    fn write(&mut self, addr: u8, value: u8) -> BusResult<()> {
        self.0.borrow_mut().bus_write(addr, value)
    }
}

impl DelayNs for SimHandle {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().advance_ns(ns);
    }
}
