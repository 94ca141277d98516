//! Channel configuration engine.
//!
//! Translates the stored per-channel settings into CHnSET, BIAS_SENSP/N and
//! MISC1 register writes. The bias-sense registers and the SRB1 switch are
//! shared across channels, so every path through here re-derives them from
//! the full settings array rather than trusting the last write.

use ads1299::{
    BiasSensN, BiasSensP, ChSet, Command, Error, Misc1, Mux, Register,
};
use bio_mini_icd::{ChannelConfig, NUM_CHANNELS};
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
    /// Control byte for one channel, derived from its stored settings.
    fn channel_control_byte(config: &ChannelConfig) -> ChSet {
        ChSet::from_bits_retain(0x00)
            .with_pd(config.power_down)
            .with_gain(config.gain)
            .with_mux(config.mux)
            .with_srb2(config.srb2)
    }

    /// Set or clear channel `ch`'s bit in both bias-sense registers.
    fn write_bias_membership(
        &mut self,
        ch: usize,
        include: bool,
    ) -> Result<(), Error<E>> {
        let p = BiasSensP::from_bits_retain(
            self.ads.read_register(Register::BIAS_SENSP)?,
        );
        let p = if include {
            p.union(BiasSensP::channel(ch))
        } else {
            p.difference(BiasSensP::channel(ch))
        };
        self.ads.write_register(Register::BIAS_SENSP, p.bits())?;
        self.delay.delay_ms(1);

        let n = BiasSensN::from_bits_retain(
            self.ads.read_register(Register::BIAS_SENSN)?,
        );
        let n = if include {
            n.union(BiasSensN::channel(ch))
        } else {
            n.difference(BiasSensN::channel(ch))
        };
        self.ads.write_register(Register::BIAS_SENSN, n.bits())?;
        self.delay.delay_ms(1);
        Ok(())
    }

    /// Power a channel back up with its stored gain/input/SRB2 settings and
    /// restore its bias-generation membership.
    pub(crate) fn activate_channel(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        let ch = Self::clamp_channel(channel);

        self.ads.cmd(Command::Sdatac)?;
        let setting = ChSet::from_bits_retain(0x00)
            .with_gain(self.channels[ch].gain)
            .with_mux(self.channels[ch].mux)
            .with_srb2(self.channels[ch].srb2);
        self.ads
            .write_register(Register::from_channel_index(ch), setting.bits())?;

        // Bias membership was remembered across the power-down.
        self.channels[ch].bias_include = self.use_in_bias[ch];
        let include = self.channels[ch].bias_include;
        self.write_bias_membership(ch, include)?;
        self.use_in_bias[ch] = include;

        // SRB1 is one switch for the whole board.
        let misc1 = Misc1::default().with_srb1(self.use_srb1);
        self.ads.write_register(Register::MISC1, misc1.bits())?;
        Ok(())
    }

    /// Power a channel down: set the power-down bit, detach it from SRB2,
    /// park the mux on the shorted input, and drop it from bias generation
    /// and lead-off sensing. The stored bias membership is deliberately
    /// left alone so a later activate can restore it.
    pub(crate) fn deactivate_channel(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        self.ads.cmd(Command::Sdatac)?;
        self.delay.delay_ms(1);
        let ch = Self::clamp_channel(channel);

        let setting = ChSet::from_bits_retain(
            self.ads.read_register(Register::from_channel_index(ch))?,
        );
        self.delay.delay_ms(1);
        let setting =
            setting.with_pd(true).with_srb2(false).with_mux(Mux::Shorted);
        self.ads
            .write_register(Register::from_channel_index(ch), setting.bits())?;
        self.delay.delay_ms(1);

        self.write_bias_membership(ch, false)?;

        self.lead_off[ch] = Default::default();
        self.write_lead_off(ch + 1)?;
        Ok(())
    }

    /// Write every channel's control byte and bias membership, in channel
    /// order, then resolve the shared SRB1 switch: if any channel asked for
    /// the common reference it is closed for all of them, otherwise opened
    /// for all.
    pub(crate) fn write_all_channel_settings(&mut self) -> Result<(), Error<E>> {
        self.ads.cmd(Command::Sdatac)?;
        self.delay.delay_ms(1);

        let mut any_srb1 = false;
        for ch in 0..NUM_CHANNELS {
            let setting = Self::channel_control_byte(&self.channels[ch]);
            self.ads.write_register(
                Register::from_channel_index(ch),
                setting.bits(),
            )?;

            let include = self.channels[ch].bias_include;
            self.write_bias_membership(ch, include)?;
            self.use_in_bias[ch] = include;

            if self.channels[ch].srb1 {
                any_srb1 = true;
            }
        }

        // Referential montage: SRB1 is all-or-nothing in hardware.
        for ch in 0..NUM_CHANNELS {
            self.channels[ch].srb1 = any_srb1;
        }
        self.ads.write_register(
            Register::MISC1,
            Misc1::default().with_srb1(any_srb1).bits(),
        )?;
        self.use_srb1 = any_srb1;
        Ok(())
    }

    /// Single-channel variant of the bulk write. Does not touch the shared
    /// SRB1 aggregation; the caller owns that reconciliation if the
    /// channel's SRB1 request changed.
    pub(crate) fn write_channel_settings(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        let ch = Self::clamp_channel(channel);
        self.ads.cmd(Command::Sdatac)?;
        self.delay.delay_ms(1);

        let setting = Self::channel_control_byte(&self.channels[ch]);
        self.ads
            .write_register(Register::from_channel_index(ch), setting.bits())?;

        let include = self.channels[ch].bias_include;
        self.write_bias_membership(ch, include)?;
        self.use_in_bias[ch] = include;
        Ok(())
    }

    /// Reset every channel to the board defaults and push the full
    /// configuration, clearing lead-off sensing.
    pub(crate) fn set_channels_to_default(&mut self) -> Result<(), Error<E>> {
        self.channels = [ChannelConfig::default(); NUM_CHANNELS];
        self.use_in_bias = [true; NUM_CHANNELS];
        self.use_srb1 = true;
        self.write_all_channel_settings()?;

        self.lead_off = [Default::default(); NUM_CHANNELS];
        self.write_lead_off_all()?;

        self.ads.write_register(
            Register::MISC1,
            Misc1::default().with_srb1(true).bits(),
        )?;
        Ok(())
    }

    /// Switch every channel's input mux, then push the full configuration.
    pub(crate) fn change_input_type(
        &mut self,
        input: Mux,
    ) -> Result<(), Error<E>> {
        for ch in 0..NUM_CHANNELS {
            self.channels[ch].mux = input;
        }
        self.write_all_channel_settings()
    }
}
