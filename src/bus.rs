//! Register link port and the SPI transport adapter.
//!
//! [`RegisterBus`] is the hexagonal boundary between this core and the
//! physical link to the ED board: the core is written purely against the
//! trait and never touches a peripheral directly. Production firmware
//! plugs in [`SpiRegisterBus`]; tests plug in the simulated board.
//!
//! # Frame format
//!
//! Each access is one framed request/reply exchange:
//!
//! ```text
//!   request:  [addr | W, value, crc8]   (value = 0 for reads)
//!   reply:    [ack, data, crc8]         (data = 0 for writes)
//! ```
//!
//! CRC8 poly 0x07 over the two preceding bytes. The board answers `ACK`
//! (0x06) or `NAK` (0x15); anything else is treated as a framing fault.
//! The explicit ack is what makes writes fire-and-forget for callers while
//! still ruling out silent drops at the transport layer.

use embedded_hal::spi::{Operation, SpiDevice};
use log::debug;

use crate::error::{BusError, BusResult};

/// Byte-addressed, byte-valued access to the ED board's register file.
///
/// Implementations must not block longer than their own transport deadline;
/// all longer waits belong to the layers above.
pub trait RegisterBus {
    /// Read one register.
    fn read(&mut self, addr: u8) -> BusResult<u8>;

    /// Write one register. Must not return before the board has
    /// acknowledged the frame.
    fn write(&mut self, addr: u8, value: u8) -> BusResult<()>;
}

/// High bit of the address byte marks a write frame.
const WRITE_FLAG: u8 = 0x80;
const ACK: u8 = 0x06;
const NAK: u8 = 0x15;

/// CRC8, polynomial 0x07, init 0.
pub(crate) fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// SPI transport adapter for [`RegisterBus`].
///
/// One failed exchange is retried once before the error is surfaced; a
/// fault on the retry is the caller's (i.e. the channel layer's) problem.
pub struct SpiRegisterBus<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> SpiRegisterBus<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    fn exchange(&mut self, addr_byte: u8, value: u8) -> BusResult<u8> {
        let request = [addr_byte, value, crc8(&[addr_byte, value])];
        let mut reply = [0u8; 3];

        self.spi
            .transaction(&mut [Operation::Write(&request), Operation::Read(&mut reply)])
            .map_err(|_| BusError::Io)?;

        if crc8(&reply[..2]) != reply[2] {
            return Err(BusError::CrcMismatch);
        }
        match reply[0] {
            ACK => Ok(reply[1]),
            NAK => Err(BusError::Nak),
            _ => Err(BusError::CrcMismatch),
        }
    }

    fn exchange_with_retry(&mut self, addr_byte: u8, value: u8) -> BusResult<u8> {
        match self.exchange(addr_byte, value) {
            Ok(data) => Ok(data),
            Err(first) => {
                debug!("spi bus: retrying after {first}");
                self.exchange(addr_byte, value)
            }
        }
    }
}

impl<SPI: SpiDevice> RegisterBus for SpiRegisterBus<SPI> {
    fn read(&mut self, addr: u8) -> BusResult<u8> {
        self.exchange_with_retry(addr & !WRITE_FLAG, 0)
    }

    fn write(&mut self, addr: u8, value: u8) -> BusResult<()> {
        self.exchange_with_retry(addr | WRITE_FLAG, value).map(|_| ())
    }
}
