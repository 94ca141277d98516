//! Firmware core for the bio-mini biosignal acquisition front-end.
//!
//! The [`Board`] type owns the ADS1299 on its SPI bus, the per-channel
//! configuration state, and the host-facing command protocol. It is generic
//! over its collaborators — the SPI device, the acquisition START pin, the
//! host byte sink and the delay source — so the same core runs on any MCU
//! and under host-side tests.
//!
//! The integration layer provides a falling-edge interrupt on the ADS
//! data-ready line whose handler does nothing but set the shared
//! [`AtomicBool`](portable_atomic::AtomicBool) flag, and a main loop of the
//! shape:
//!
//! ```ignore
//! loop {
//!     board.check_multi_char_timeout(now_ms());
//!     while let Some(byte) = host_rx.read() {
//!         board.process_char(byte, now_ms())?;
//!     }
//!     board.service_data_ready()?;
//! }
//! ```
//!
//! All register/bus traffic happens on that single control path; the
//! interrupt handler never touches the bus.

#![no_std]

mod acquire;
mod board;
mod channels;
mod leadoff;
mod mmg;
mod parser;
mod report;

pub use board::Board;
pub use mmg::AuxSensors;

pub use ads1299::{Error, RegisterError};
pub use bio_mini_icd as icd;
