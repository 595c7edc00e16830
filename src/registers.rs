//! ED board register map.
//!
//! The companion board exposes a byte-addressed, byte-valued register file
//! over the serial link. The address assignments and bit layouts below are
//! the board firmware's wire contract and must be preserved bit-exactly;
//! nothing in this module is tunable.
//!
//! Sentinel encodings baked into the wire format:
//! - a failed register read is reported as `0` by the channel layer, so `0`
//!   alone is never proof of anything, corroborate with the ID probe;
//! - `TEMP` reads `255` when the board's own sensor path is faulted.

/// Register addresses.
pub mod reg {
    /// Identity register; a live board reads [`BOARD_SIGNATURE`](super::BOARD_SIGNATURE).
    pub const ID: u8 = 0x00;
    /// Live status bits, see [`status`](super::status).
    pub const STATUS: u8 = 0x01;
    /// Host-written control bits, see [`control`](super::control).
    pub const CONTROL: u8 = 0x02;
    /// Requested pulse current, mA, low byte.
    pub const CURRENT_LO: u8 = 0x03;
    /// Requested pulse current, mA, high byte. Writing this byte latches
    /// the pair and starts the regulator transition.
    pub const CURRENT_HI: u8 = 0x04;
    /// Settled current readback, mA, low byte.
    pub const CURRENT_RB_LO: u8 = 0x05;
    /// Settled current readback, mA, high byte.
    pub const CURRENT_RB_HI: u8 = 0x06;
    /// Board temperature, whole degrees Celsius; `255` = sensor fault.
    pub const TEMP: u8 = 0x07;
    /// Board firmware version.
    pub const FW_VERSION: u8 = 0x08;
}

/// `STATUS` register bits.
pub mod status {
    /// Output stage is energized (polarity applied).
    pub const ENERGIZED: u8 = 0x01;
    /// Polarity transition in progress.
    pub const ENERGIZE_BUSY: u8 = 0x02;
    /// Current regulator transition in progress.
    pub const CURRENT_BUSY: u8 = 0x04;
    /// Discharge detected on the gap.
    pub const DETECT: u8 = 0x08;
    /// Temperature sensor path faulted; `TEMP` is not valid.
    pub const TEMP_FAULT: u8 = 0x10;
}

/// `CONTROL` register bits.
pub mod control {
    /// Request energize (base polarity) on/off.
    pub const ENERGIZE: u8 = 0x01;
    /// Open the discharge gate.
    pub const GATE: u8 = 0x02;
}

/// Value read from [`reg::ID`] on a live, responsive board.
pub const BOARD_SIGNATURE: u8 = 0xED;

/// `TEMP` register value meaning "reading not possible".
pub const TEMP_UNKNOWN: u8 = 255;

/// Wire sentinel for a pulse that never ignited.
pub const NO_IGNITION: u16 = u16::MAX;
