//! Firing and safety-interlock core for an electrical-discharge (ED)
//! companion board.
//!
//! The board is reached exclusively through the [`bus::RegisterBus`] port;
//! everything above that seam is pure logic and runs on the host, which is
//! how the test suite exercises microsecond-scale pulse timing against the
//! simulated board in [`sim`].
//!
//! Layering, leaves first: register channel (absorbs transport faults into
//! the board's sentinel wire contract) -> presence/health probes -> blocking
//! energize/current controller -> pulse firing engine. The raw calibration
//! bypass in [`raw`] deliberately sidesteps all of it.

#![deny(unused_must_use)]

pub mod bus;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod pulse;
pub mod raw;
pub mod registers;
pub mod sim;

mod energize;
mod health;

pub use config::EdConfig;
pub use controller::EdController;
pub use pulse::PulseResult;
