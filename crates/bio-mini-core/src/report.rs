//! Host-facing reports and acknowledgements.
//!
//! Everything textual the board says ends with the `$$$` end-of-transmission
//! marker so hosts can frame replies. Transmission is fire-and-forget: the
//! host link has no back-channel and a full sink must never stall the
//! control loop, so write results are discarded here.

use core::fmt::Write as FmtWrite;

use ads1299::{Error, Register, NUM_REGISTERS};
use bio_mini_icd::{
    ChannelConfig, BOARD_CHANNELS, BOARD_NAME, EOT, FW_VERSION,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use embedded_io::Write;
use heapless::String;

use crate::board::Board;

const SEPARATOR: &str = "----------------------------------------------";

impl<'a, SPI, START, HOST, D, E> Board<'a, SPI, START, HOST, D>
where
    SPI: SpiDevice<Error = E>,
    START: OutputPin,
    HOST: Write,
    D: DelayNs,
{
    pub(crate) fn send_bytes(&mut self, bytes: &[u8]) {
        let _ = self.host.write_all(bytes);
    }

    pub(crate) fn send_str(&mut self, s: &str) {
        let _ = self.host.write_all(s.as_bytes());
    }

    pub(crate) fn send_line(&mut self, s: &str) {
        self.send_str(s);
        self.send_str("\r\n");
    }

    pub(crate) fn send_eot(&mut self) {
        self.send_str(EOT);
    }

    /// "Failure: <reason>$$$", suppressed while streaming so the data
    /// channel stays clean.
    pub(crate) fn report_failure(&mut self, reason: &str) {
        if self.streaming {
            return;
        }
        self.send_str("Failure: ");
        self.send_str(reason);
        self.send_eot();
    }

    /// "Success: <message>$$$", suppressed while streaming.
    pub(crate) fn report_success(&mut self, message: &str) {
        if self.streaming {
            return;
        }
        self.send_str("Success: ");
        self.send_str(message);
        self.send_eot();
    }

    /// Multi-byte command timeout notice. Not suppressed: an abandoned
    /// command is worth hearing about even mid-stream.
    pub(crate) fn report_timeout(&mut self) {
        self.send_str("Timeout processing multi byte");
        self.send_str(" Please send all the message");
        self.send_eot();
    }

    pub(crate) fn report_unrecognized(&mut self, byte: u8) {
        let mut line: String<48> = String::new();
        let _ = write!(line, "unrecognized command '{}'", byte as char);
        self.report_failure(&line);
    }

    pub(crate) fn report_channel_state(
        &mut self,
        channel: usize,
        state: &str,
    ) {
        let mut line: String<40> = String::new();
        let _ = write!(line, "Channel: {} {}.", channel, state);
        self.send_line(&line);
    }

    /// Identification banner sent after every (re)initialization.
    pub(crate) fn report_banner(&mut self) -> Result<(), Error<E>> {
        let id = self.ads.device_id()?;
        let mut line: String<48> = String::new();
        let _ = write!(
            line,
            "On Board ADS1299 Device ID: 0x{:02X}",
            id.bits()
        );

        self.send_line(BOARD_NAME);
        self.send_line(&line);

        let mut line: String<32> = String::new();
        let _ = write!(line, "Firmware: {}", FW_VERSION);
        self.send_line(&line);
        self.send_eot();
        Ok(())
    }

    pub(crate) fn report_version(&mut self) {
        let mut line: String<32> = String::new();
        let _ = write!(line, "{} {}", BOARD_NAME, FW_VERSION);
        self.send_str(&line);
        self.send_eot();
    }

    pub(crate) fn report_channel_count(&mut self) {
        let mut line: String<8> = String::new();
        let _ = write!(line, "{}", BOARD_CHANNELS);
        self.send_str(&line);
        self.send_eot();
    }

    /// The six default channel settings as ASCII digits, in protocol order.
    pub(crate) fn report_default_channel_settings(&mut self) {
        let digits = ChannelConfig::default().as_digits();
        self.send_bytes(&digits);
        self.send_eot();
    }

    pub(crate) fn report_sample_rate(&mut self) {
        let mut line: String<40> = String::new();
        let _ = write!(
            line,
            "Sample rate is {}Hz",
            self.sample_rate.label()
        );
        self.send_str("Success: ");
        self.send_str(&line);
        self.send_eot();
    }

    /// Dump the full register map with datasheet names, one register per
    /// line as hex and individual bits.
    pub(crate) fn dump_registers(&mut self) -> Result<(), Error<E>> {
        let mut map = [0u8; NUM_REGISTERS];
        self.ads.read_all_registers(&mut map)?;

        self.send_line(SEPARATOR);
        self.send_line("-----------------Registers--------------------");
        self.send_line(SEPARATOR);
        for (addr, value) in map.iter().enumerate() {
            // Addresses 0..NUM_REGISTERS are all mapped.
            let reg = Register::from_addr(addr as u8).unwrap();
            let mut line: String<96> = String::new();
            let _ =
                write!(line, "{}: 0x{:02X}, 0x{:02X}", reg.name(), addr, value);
            for bit in (0..8).rev() {
                let _ = write!(line, ", {}", (value >> bit) & 1);
            }
            self.send_line(&line);
        }
        self.send_line(SEPARATOR);
        self.send_eot();
        Ok(())
    }

    pub(crate) fn send_sample_raw(&mut self) {
        let payload = if self.mean_valid {
            &self.mean_sample
        } else {
            &self.raw_sample
        };
        let _ = self.host.write_all(payload);
    }

    pub(crate) fn send_sample_ascii(&mut self) {
        let values = if self.mean_valid {
            self.mean_values
        } else {
            self.values
        };
        let mut line: String<64> = String::new();
        for value in values {
            let _ = write!(line, "{} ", value);
        }
        self.send_str(&line);
    }
}
