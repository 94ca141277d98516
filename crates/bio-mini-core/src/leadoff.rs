//! Lead-off (impedance) detection engine.
//!
//! Per-channel enables for the P and N sensing sides map to one bit each in
//! the shared LOFF_SENSP/LOFF_SENSN registers. These paths run only on
//! configuration changes, never per sample, so the all-channel rewrite
//! below favours simplicity over batching.

use ads1299::{Command, Error, FLeadOff, ILeadOff, Loff, LoffSensN, LoffSensP, Register};
use bio_mini_icd::NUM_CHANNELS;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use embedded_io::Write;

use crate::board::Board;

impl<'a, SPI, START, HOST, D, E> Board<'a, SPI, START, HOST, D>
where
    SPI: SpiDevice<Error = E>,
    START: OutputPin,
    HOST: Write,
    D: DelayNs,
{
    /// Program the excitation amplitude and frequency into LOFF, leaving
    /// the comparator-threshold bits untouched.
    pub(crate) fn configure_lead_off_detection(
        &mut self,
        amplitude: ILeadOff,
        frequency: FLeadOff,
    ) -> Result<(), Error<E>> {
        let setting =
            Loff::from_bits_retain(self.ads.read_register(Register::LOFF)?)
                .with_ilead_off(amplitude)
                .with_flead_off(frequency);
        self.ads.write_register(Register::LOFF, setting.bits())?;
        self.delay.delay_ms(1);
        Ok(())
    }

    /// Rebuild both side registers from every channel's flags, re-writing
    /// them as each channel is folded in.
    pub(crate) fn write_lead_off_all(&mut self) -> Result<(), Error<E>> {
        self.ads.cmd(Command::Sdatac)?;
        self.delay.delay_ms(1);

        let mut p = LoffSensP::from_bits_retain(
            self.ads.read_register(Register::LOFF_SENSP)?,
        );
        let mut n = LoffSensN::from_bits_retain(
            self.ads.read_register(Register::LOFF_SENSN)?,
        );

        for ch in 0..NUM_CHANNELS {
            p = if self.lead_off[ch].p_side {
                p.union(LoffSensP::channel(ch))
            } else {
                p.difference(LoffSensP::channel(ch))
            };
            n = if self.lead_off[ch].n_side {
                n.union(LoffSensN::channel(ch))
            } else {
                n.difference(LoffSensN::channel(ch))
            };
            self.ads.write_register(Register::LOFF_SENSP, p.bits())?;
            self.ads.write_register(Register::LOFF_SENSN, n.bits())?;
        }
        Ok(())
    }

    /// Update both side registers for a single 1-based channel.
    pub(crate) fn write_lead_off(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        let ch = Self::clamp_channel(channel);
        self.ads.cmd(Command::Sdatac)?;
        self.delay.delay_ms(1);

        let p = LoffSensP::from_bits_retain(
            self.ads.read_register(Register::LOFF_SENSP)?,
        );
        let n = LoffSensN::from_bits_retain(
            self.ads.read_register(Register::LOFF_SENSN)?,
        );

        let p = if self.lead_off[ch].p_side {
            p.union(LoffSensP::channel(ch))
        } else {
            p.difference(LoffSensP::channel(ch))
        };
        let n = if self.lead_off[ch].n_side {
            n.union(LoffSensN::channel(ch))
        } else {
            n.difference(LoffSensN::channel(ch))
        };
        self.ads.write_register(Register::LOFF_SENSP, p.bits())?;
        self.ads.write_register(Register::LOFF_SENSN, n.bits())?;
        Ok(())
    }
}
