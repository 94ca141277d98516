//! Minimal ADS1115 driver: single-shot, single-ended conversions over the
//! blocking [`embedded_hal`] I2C trait.
//!
//! The device is a 16-bit, 4-channel delta-sigma ADC with an I2C register
//! interface. This driver covers exactly what a low-rate sensor sidecar
//! needs: program gain and data rate, trigger a conversion on one input,
//! poll the ready bit, read the result. No comparator, no continuous mode.

#![no_std]

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Slave addresses by ADDR-pin strapping.
pub const ADDR_GND: u8 = 0x48;
pub const ADDR_VDD: u8 = 0x49;
pub const ADDR_SDA: u8 = 0x4A;
pub const ADDR_SCL: u8 = 0x4B;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// OS bit: written 1 to start a conversion, reads 1 once the device idles.
const CONFIG_OS: u16 = 0x8000;
const CONFIG_MODE_SINGLE: u16 = 0x0100;
/// Comparator disabled.
const CONFIG_COMP_QUE_OFF: u16 = 0x0003;

/// Programmable full-scale range (CONFIG bits 11:9).
#[repr(u16)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FullScale {
    Fsr6V144 = 0,
    Fsr4V096 = 1,
    #[default]
    Fsr2V048 = 2,
    Fsr1V024 = 3,
    Fsr0V512 = 4,
    Fsr0V256 = 5,
}

impl FullScale {
    const fn bits(self) -> u16 {
        (self as u16) << 9
    }
}

/// Output data rate (CONFIG bits 7:5).
#[repr(u16)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    Sps8 = 0,
    Sps16 = 1,
    Sps32 = 2,
    Sps64 = 3,
    #[default]
    Sps128 = 4,
    Sps250 = 5,
    Sps475 = 6,
    Sps860 = 7,
}

impl DataRate {
    const fn bits(self) -> u16 {
        (self as u16) << 5
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cE> {
    I2c(I2cE),
}

impl<E: core::fmt::Display> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(err) => write!(f, "I2C communication error: {}", err),
        }
    }
}

pub struct Ads1115<I2C> {
    i2c: I2C,
    address: u8,
    full_scale: FullScale,
    data_rate: DataRate,
}

impl<I2C, E> Ads1115<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            full_scale: FullScale::default(),
            data_rate: DataRate::default(),
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn set_full_scale(&mut self, full_scale: FullScale) {
        self.full_scale = full_scale;
    }

    pub fn set_data_rate(&mut self, data_rate: DataRate) {
        self.data_rate = data_rate;
    }

    /// Convert one single-ended input (0..3 against GND): write the config
    /// word with OS set, poll the ready bit, read the conversion register.
    pub fn read_single_ended(
        &mut self,
        channel: u8,
        delay: &mut impl DelayNs,
    ) -> Result<i16, Error<E>> {
        // MUX 1xx selects AINx vs GND.
        let mux = (0b100 | (channel & 0b11) as u16) << 12;
        let config = CONFIG_OS
            | mux
            | self.full_scale.bits()
            | CONFIG_MODE_SINGLE
            | self.data_rate.bits()
            | CONFIG_COMP_QUE_OFF;
        let bytes = config.to_be_bytes();
        self.i2c
            .write(self.address, &[REG_CONFIG, bytes[0], bytes[1]])
            .map_err(Error::I2c)?;

        while !self.conversion_ready()? {
            delay.delay_us(100);
        }

        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONVERSION], &mut buf)
            .map_err(Error::I2c)?;
        Ok(i16::from_be_bytes(buf))
    }

    fn conversion_ready(&mut self) -> Result<bool, Error<E>> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_CONFIG], &mut buf)
            .map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(buf) & CONFIG_OS != 0)
    }
}
