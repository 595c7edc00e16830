//! Transport-level error types.
//!
//! Errors exist only below the register channel. The channel absorbs every
//! `BusError` into the board's historical wire contract (failed reads read
//! as `0`); layers above it communicate through sentinel values and safe
//! no-ops, never through error returns. All variants are `Copy` so they can
//! be passed through retry paths without allocation.

use core::fmt;

/// A failed exchange on the physical register link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The board did not respond within the transport deadline.
    Timeout,
    /// The board answered with an explicit negative acknowledge.
    Nak,
    /// Frame checksum mismatch in either direction.
    CrcMismatch,
    /// The underlying link peripheral reported an I/O fault.
    Io,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "bus timeout"),
            Self::Nak => write!(f, "negative acknowledge"),
            Self::CrcMismatch => write!(f, "CRC mismatch"),
            Self::Io => write!(f, "link I/O fault"),
        }
    }
}

/// Transport-layer `Result` alias.
pub type BusResult<T> = core::result::Result<T, BusError>;
