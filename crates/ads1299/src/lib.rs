//! Platform-agnostic ADS1299 driver built on the blocking [`embedded_hal`]
//! SPI traits.
//!
//! The driver covers the command/register plane of the device: chip commands
//! with their datasheet settle times, single and sequential register access,
//! and raw sample-frame reads while the device is in continuous-read mode.
//! Register access is undefined while the device streams, so every register
//! transaction leads with SDATAC inside its chip-select frame.
//!
//! Interpretation of channel configuration, lead-off sensing and sample data
//! belongs to the board layer; this crate only knows the chip.

#![no_std]

use embedded_hal::spi::{Operation, SpiDevice};

pub use crate::errors::{Error, RegisterError};
pub use crate::registers::*;

pub mod errors;
pub mod registers;

pub struct Ads1299<SPI> {
    spi: SPI,
}

impl<SPI, E> Ads1299<SPI>
where
    SPI: SpiDevice<Error = E>,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    /// Issue a chip command. Commands with a mandated execution/decode time
    /// hold chip select through the settle window so the next transaction
    /// cannot arrive early.
    pub fn cmd(&mut self, command: Command) -> Result<(), Error<E>> {
        let opcode = [command.opcode()];
        match command.settle_ns() {
            0 => self.spi.write(&opcode),
            ns => self.spi.transaction(&mut [
                Operation::Write(&opcode),
                Operation::DelayNs(ns),
            ]),
        }
        .map_err(Error::Spi)
    }

    /// Read `buf.len()` registers starting at `reg`.
    pub fn read_registers(
        &mut self,
        reg: Register,
        buf: &mut [u8],
    ) -> Result<(), Error<E>> {
        let opcode = [RREG | reg.addr(), (buf.len() - 1) as u8];
        self.spi
            .transaction(&mut [
                Operation::Write(&[Command::Sdatac.opcode()]),
                Operation::Write(&opcode),
                Operation::TransferInPlace(buf),
            ])
            .map_err(Error::Spi)
    }

    /// Write `values.len()` registers starting at `reg`.
    pub fn write_registers(
        &mut self,
        reg: Register,
        values: &[u8],
    ) -> Result<(), Error<E>> {
        let opcode = [WREG | reg.addr(), (values.len() - 1) as u8];
        self.spi
            .transaction(&mut [
                Operation::Write(&[Command::Sdatac.opcode()]),
                Operation::Write(&opcode),
                Operation::Write(values),
            ])
            .map_err(Error::Spi)
    }

    pub fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let mut buf = [0];
        self.read_registers(reg, &mut buf)?;
        Ok(buf[0])
    }

    pub fn write_register(
        &mut self,
        reg: Register,
        value: u8,
    ) -> Result<(), Error<E>> {
        self.write_registers(reg, &[value])
    }

    pub fn modify_register<F>(
        &mut self,
        reg: Register,
        f: F,
    ) -> Result<(), Error<E>>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read_register(reg)?;
        self.write_register(reg, f(value))
    }

    /// Dump the full register map, for the host-facing register report.
    pub fn read_all_registers(
        &mut self,
        buf: &mut [u8; NUM_REGISTERS],
    ) -> Result<(), Error<E>> {
        self.read_registers(Register::ID, buf)
    }

    pub fn device_id(&mut self) -> Result<Id, Error<E>> {
        let bits = self.read_register(Register::ID)?;
        Ok(Id::from_bits_retain(bits))
    }

    /// Check that something answering like an ADS1299 is on the bus.
    pub fn probe(&mut self) -> Result<(), Error<E>> {
        self.cmd(Command::Sdatac)?;
        self.device_id()?.verify().map_err(Error::from)
    }

    /// Read one raw sample frame while the device is in continuous-read
    /// mode. The caller sizes `frame` to its board's status + channel byte
    /// count; chip select stays asserted for the whole exchange.
    pub fn read_frame(&mut self, frame: &mut [u8]) -> Result<(), Error<E>> {
        self.spi.read(frame).map_err(Error::Spi)
    }
}
