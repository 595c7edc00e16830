//! The ED board owner object.
//!
//! One `EdController` is the process-wide handle to the one attached board:
//! construction *is* initialization, there is no implicit pre-init state,
//! and the type is non-`Copy`/non-`Clone` so a second handle cannot exist
//! by accident. The controller mirrors the slow state it has confirmed
//! (energize, settled current) so the firing engine can assume its
//! electrical precondition without re-deriving it from the wire.
//!
//! Availability is re-probed on every call that needs it; the board may be
//! unplugged between any two calls, and every mutating operation degrades
//! to a safe no-op when the probe fails.
//!
//! Single-threaded by contract: callers in a multi-threaded environment
//! must serialize all entry points behind one external lock.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::bus::RegisterBus;
use crate::channel::RegisterChannel;
use crate::config::EdConfig;
use crate::pulse::PulseResult;
use crate::registers::{BOARD_SIGNATURE, reg};

pub struct EdController<B, D> {
    pub(crate) channel: RegisterChannel<B>,
    pub(crate) delay: D,
    pub(crate) config: EdConfig,

    /// Confirmed energize state. Updated only on a settled transition.
    pub(crate) energized: bool,
    /// Last current request confirmed settled (mA).
    pub(crate) current_ma: u16,

    pub(crate) last_pulse: Option<PulseResult>,
    pub(crate) pulses_fired: u32,
    pub(crate) misfires: u32,
}

impl<B: RegisterBus, D: DelayNs> EdController<B, D> {
    /// Take ownership of the register link and bring the channel up.
    ///
    /// Performs the one-time board handshake: clears `CONTROL` (gate shut,
    /// de-energized) and probes the ID register. An absent board is not an
    /// error; the controller stays live and every operation no-ops until
    /// the board answers a later probe. Only an invalid configuration is
    /// rejected, before any bus traffic happens.
    pub fn initialize(bus: B, delay: D, config: EdConfig) -> Result<Self, &'static str> {
        config.validate()?;

        let mut controller = Self {
            channel: RegisterChannel::new(bus),
            delay,
            config,
            energized: false,
            current_ma: 0,
            last_pulse: None,
            pulses_fired: 0,
            misfires: 0,
        };

        controller.channel.write(reg::CONTROL, 0);
        if controller.is_available() {
            let fw = controller.channel.read(reg::FW_VERSION);
            info!("ed: board present, fw v{fw}");
        } else {
            warn!("ed: no board detected at init; operations will no-op");
        }
        Ok(controller)
    }

    /// Re-probe the board. `true` only when the identity register answers
    /// with the board signature; a bus fault reads as `0` and therefore
    /// reports unavailable.
    pub fn is_available(&mut self) -> bool {
        self.channel.read(reg::ID) == BOARD_SIGNATURE
    }

    /// Confirmed energize state (mirrored, not re-read from the wire).
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// Last current request confirmed settled, in mA.
    pub fn current_ma(&self) -> u16 {
        self.current_ma
    }

    /// Pulses that ignited since initialization.
    pub fn pulses_fired(&self) -> u32 {
        self.pulses_fired
    }

    /// Firing attempts that exhausted their detect window.
    pub fn misfires(&self) -> u32 {
        self.misfires
    }

    /// Result of the most recent firing attempt, if any.
    pub fn last_pulse(&self) -> Option<PulseResult> {
        self.last_pulse
    }

    /// Read one board register directly. A failed read returns `0`, which
    /// is also a legitimate register value; corroborate with
    /// [`is_available`](Self::is_available) before trusting a zero.
    pub fn read_register(&mut self, addr: u8) -> u8 {
        self.channel.read(addr)
    }

    /// Write one board register directly. Fire-and-forget; the transport
    /// has acknowledged (or the drop has been absorbed and counted) by
    /// the time this returns.
    pub fn write_register(&mut self, addr: u8, value: u8) {
        self.channel.write(addr, value);
    }
}
