//! Acquisition engine: one frame per data-ready event.
//!
//! `capture_frame` runs once per interrupt flag and has to finish well
//! inside one sample period (62.5 us at the fastest rate), so it does no
//! allocation and no formatting — just the bus exchange, sign extension and
//! the optional 2-sample mean.

use ads1299::Error;
use bio_mini_icd::{TxMode, BOARD_CHANNELS, BYTES_PER_CHANNEL, FRAME_BYTES};
use byteorder::{BigEndian, ByteOrder};
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
    /// Poll entry point for the main loop: if the interrupt handler flagged
    /// a frame, capture and transmit it. Returns whether a frame was
    /// serviced.
    pub fn service_data_ready(&mut self) -> Result<bool, Error<E>> {
        if !self.data_ready() {
            return Ok(false);
        }
        self.capture_frame(true)?;
        self.send_channel_data();
        Ok(true)
    }

    /// Read one frame (status word + channel data) in a single chip-select
    /// exchange and sign-extend the 24-bit conversions to i32. When
    /// `downsample` is set and this is not the first frame since start, the
    /// transmitted values are the truncating mean of this frame and the
    /// previous one.
    pub fn capture_frame(&mut self, downsample: bool) -> Result<(), Error<E>> {
        // Reset the flag first or it would re-trigger us immediately.
        self.clear_data_ready();

        let average = !self.first_frame && downsample;
        if average {
            self.last_values = self.values;
        }

        let mut frame = [0u8; FRAME_BYTES];
        self.ads.read_frame(&mut frame)?;

        // 1100 + LOFF_STATP + LOFF_STATN + GPIO[7:4].
        self.status_word = ((frame[0] as u32) << 16)
            | ((frame[1] as u32) << 8)
            | frame[2] as u32;

        self.raw_sample.copy_from_slice(&frame[3..]);
        for ch in 0..BOARD_CHANNELS {
            let bytes = &frame[3 + ch * BYTES_PER_CHANNEL..];
            self.values[ch] = BigEndian::read_i24(&bytes[..BYTES_PER_CHANNEL]);
        }

        if average {
            for ch in 0..BOARD_CHANNELS {
                self.mean_values[ch] =
                    (self.last_values[ch] + self.values[ch]) / 2;
                BigEndian::write_i24(
                    &mut self.mean_sample
                        [ch * BYTES_PER_CHANNEL..(ch + 1) * BYTES_PER_CHANNEL],
                    self.mean_values[ch],
                );
            }
        }
        self.mean_valid = average;

        if self.first_frame {
            self.first_frame = false;
        }
        Ok(())
    }

    /// Transmit the captured frame on the host link, in the selected
    /// format, while the serial stream is enabled. The sample counter runs
    /// regardless so dropped transports stay detectable.
    pub fn send_channel_data(&mut self) {
        if self.serial_stream {
            match self.tx_mode {
                TxMode::Raw => self.send_sample_raw(),
                TxMode::Ascii => self.send_sample_ascii(),
            }
        }
        self.sample_counter = self.sample_counter.wrapping_add(1);
    }
}
