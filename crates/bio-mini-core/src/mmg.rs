//! Auxiliary low-rate sensor channel.
//!
//! A sidecar ADS1115 samples four single-ended mechanosensor inputs
//! independently of the acquisition front-end. It has no interrupt
//! integration: the main loop refreshes it at its own pace and forwards
//! the values on the host link in the active transmit format.

use core::fmt::Write as FmtWrite;

use ads1115::{Ads1115, DataRate, Error, FullScale};
use bio_mini_icd::{TxMode, AUX_CHANNELS};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_io::Write;
use heapless::String;

pub struct AuxSensors<I2C> {
    adc: Ads1115<I2C>,
    pub data: [i16; AUX_CHANNELS],
    tx_mode: TxMode,
}

impl<I2C, E> AuxSensors<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            adc: Ads1115::new(i2c, address),
            data: [0; AUX_CHANNELS],
            tx_mode: TxMode::default(),
        }
    }

    /// Program gain and data rate for the sensor bank.
    pub fn begin(&mut self, full_scale: FullScale, data_rate: DataRate) {
        self.adc.set_full_scale(full_scale);
        self.adc.set_data_rate(data_rate);
    }

    /// Refresh all channel values with one conversion each.
    pub fn update(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<E>> {
        for ch in 0..AUX_CHANNELS {
            self.data[ch] = self.adc.read_single_ended(ch as u8, delay)?;
        }
        Ok(())
    }

    pub fn set_tx_mode(&mut self, tx_mode: TxMode) {
        self.tx_mode = tx_mode;
    }

    /// Forward the current values on the host link: big-endian byte pairs
    /// in raw mode, space-separated decimal in ascii mode.
    pub fn send<W: Write>(&self, host: &mut W, serial_stream: bool) {
        if !serial_stream {
            return;
        }
        match self.tx_mode {
            TxMode::Raw => {
                for value in self.data {
                    let _ = host.write_all(&value.to_be_bytes());
                }
            }
            TxMode::Ascii => {
                let mut line: String<48> = String::new();
                for value in self.data {
                    let _ = write!(line, "{} ", value);
                }
                let _ = host.write_all(line.as_bytes());
            }
        }
    }
}
