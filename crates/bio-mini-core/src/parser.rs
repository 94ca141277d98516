//! Byte-driven command protocol parser.
//!
//! Single bytes map straight to actions; three trigger bytes open a
//! multi-byte sequence tracked in [`Parser`] under an absolute deadline. At
//! most one multi-byte command is ever pending. A command that violates its
//! framing (wrong latch byte, premature latch, overflow) or outruns its
//! deadline is discarded whole — the host resends from scratch, nothing is
//! replayed.

use core::fmt::Write as FmtWrite;

use ads1299::{CalFreq, Error, Gain, Mux, SampleRate};
use bio_mini_icd::{
    commands, TxMode, CHANNEL_SETTINGS_BYTES, LEAD_OFF_SETTINGS_BYTES,
    MULTI_CHAR_CMD_TIMEOUT_MS,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use embedded_io::Write;
use heapless::String;

use crate::board::Board;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum MultiCharCmd {
    #[default]
    None,
    ChannelSettings,
    LeadOff,
    SampleRate,
}

/// State of the pending multi-byte command, if any.
#[derive(Debug, Default)]
pub(crate) struct Parser {
    pub(crate) pending: MultiCharCmd,
    pub(crate) deadline_ms: u64,
    /// Bytes consumed so far, the trigger byte included.
    pub(crate) processed: u8,
    pub(crate) target_channel: usize,
    pub(crate) scratch: [u8; 7],
}

impl Parser {
    fn start(&mut self, cmd: MultiCharCmd, now_ms: u64) {
        self.pending = cmd;
        self.deadline_ms = now_ms + MULTI_CHAR_CMD_TIMEOUT_MS;
        self.processed = 1;
        self.target_channel = 0;
        self.scratch = [0; 7];
    }

    fn end(&mut self) {
        self.pending = MultiCharCmd::None;
        self.processed = 0;
    }
}

/// Channel selector characters '1'..'8' map to indices 0..7; anything else
/// falls back to channel 0.
fn channel_for_ascii(character: u8) -> usize {
    match character {
        b'1'..=b'8' => (character - b'1') as usize,
        _ => 0,
    }
}

/// Decimal digit value; non-digits fall back to 0.
fn digit_for_ascii(character: u8) -> u8 {
    match character {
        b'0'..=b'9' => character - b'0',
        _ => 0,
    }
}

/// Gain digit, clamped into the defined 0..6 range (falls back to 24x).
fn gain_code_for_ascii(character: u8) -> u8 {
    match character {
        b'0'..=b'6' => character - b'0',
        _ => 6,
    }
}

impl<'a, SPI, START, HOST, D, E> Board<'a, SPI, START, HOST, D>
where
    SPI: SpiDevice<Error = E>,
    START: OutputPin,
    HOST: Write,
    D: DelayNs,
{
    /// Multi-byte command housekeeping, also called once per main-loop
    /// iteration. Returns whether a multi-byte command is pending and still
    /// inside its window; on expiry the command is abandoned and reported.
    pub fn check_multi_char_timeout(&mut self, now_ms: u64) -> bool {
        if self.parser.pending == MultiCharCmd::None {
            return false;
        }
        if now_ms < self.parser.deadline_ms {
            return true;
        }
        self.parser.end();
        self.report_timeout();
        false
    }

    /// Process one byte from the host. Returns whether the byte was
    /// recognized.
    pub fn process_char(
        &mut self,
        character: u8,
        now_ms: u64,
    ) -> Result<bool, Error<E>> {
        if self.parser.pending != MultiCharCmd::None {
            if !self.check_multi_char_timeout(now_ms) {
                // The command just timed out. Its late byte is dropped, not
                // replayed as a fresh single-byte command.
                return Ok(true);
            }
            match self.parser.pending {
                MultiCharCmd::ChannelSettings => {
                    self.process_incoming_channel_settings(character)?
                }
                MultiCharCmd::LeadOff => {
                    self.process_incoming_lead_off_settings(character)?
                }
                MultiCharCmd::SampleRate => {
                    self.process_incoming_sample_rate(character)?
                }
                MultiCharCmd::None => {}
            }
            return Ok(true);
        }

        let recognized = match character {
            c if commands::CHANNEL_OFF.contains(&c) => {
                self.stream_safe_channel_deactivate((c - b'0') as usize)?;
                true
            }
            c if commands::CHANNEL_ON.contains(&c) => {
                let channel = commands::CHANNEL_ON
                    .iter()
                    .position(|&b| b == c)
                    .unwrap_or(0)
                    + 1;
                self.stream_safe_channel_activate(channel)?;
                true
            }

            commands::TEST_GND => {
                self.apply_test_mode(Mux::Shorted, None, None)?;
                true
            }
            commands::TEST_PULSE_1X_SLOW => {
                self.apply_test_mode(
                    Mux::TestSignal,
                    Some(false),
                    Some(CalFreq::PulseSlow),
                )?;
                true
            }
            commands::TEST_PULSE_1X_FAST => {
                self.apply_test_mode(
                    Mux::TestSignal,
                    Some(false),
                    Some(CalFreq::PulseFast),
                )?;
                true
            }
            commands::TEST_PULSE_2X_SLOW => {
                self.apply_test_mode(
                    Mux::TestSignal,
                    Some(true),
                    Some(CalFreq::PulseSlow),
                )?;
                true
            }
            commands::TEST_PULSE_2X_FAST => {
                self.apply_test_mode(
                    Mux::TestSignal,
                    Some(true),
                    Some(CalFreq::PulseFast),
                )?;
                true
            }
            commands::TEST_DC => {
                self.apply_test_mode(
                    Mux::TestSignal,
                    Some(true),
                    Some(CalFreq::Dc),
                )?;
                true
            }
            commands::NORMAL_INPUT => {
                self.apply_test_mode(Mux::Normal, None, None)?;
                true
            }

            commands::CHANNEL_SETTINGS_SET => {
                self.parser.start(MultiCharCmd::ChannelSettings, now_ms);
                true
            }
            commands::LEAD_OFF_SET => {
                self.parser.start(MultiCharCmd::LeadOff, now_ms);
                true
            }
            commands::SAMPLE_RATE_SET => {
                self.parser.start(MultiCharCmd::SampleRate, now_ms);
                true
            }

            commands::SET_CHANNEL_DEFAULTS => {
                if !self.streaming {
                    self.send_str("updating channel settings to default");
                    self.send_eot();
                }
                self.stream_safe_set_defaults()?;
                true
            }
            commands::REPORT_CHANNEL_DEFAULTS => {
                self.report_default_channel_settings();
                true
            }

            commands::STREAM_START => {
                self.stream_start()?;
                true
            }
            commands::STREAM_STOP => {
                self.stream_stop()?;
                true
            }

            commands::SOFT_RESET => {
                self.board_reset()?;
                true
            }
            commands::QUERY_REGISTERS => {
                if !self.streaming {
                    self.dump_registers()?;
                }
                true
            }

            commands::LED_ON => {
                self.led_on()?;
                true
            }
            commands::LED_OFF => {
                self.led_off()?;
                true
            }

            commands::GET_VERSION => {
                self.report_version();
                true
            }
            commands::QUERY_CHANNEL_COUNT => {
                self.report_channel_count();
                true
            }

            commands::SERIAL_STREAM_ON => {
                self.serial_stream = true;
                self.send_str("Stream via serial port activated");
                self.send_eot();
                true
            }
            commands::SERIAL_STREAM_OFF => {
                self.serial_stream = false;
                self.send_str("Stream via serial port deactivated");
                self.send_eot();
                true
            }

            commands::TX_RAW => {
                self.stream_safe_set_tx_mode(TxMode::Raw)?;
                true
            }
            commands::TX_ASCII => {
                self.stream_safe_set_tx_mode(TxMode::Ascii)?;
                true
            }

            other => {
                self.report_unrecognized(other);
                false
            }
        };
        Ok(recognized)
    }

    /// Channel-settings sub-parser: selector, six setting digits, latch.
    fn process_incoming_channel_settings(
        &mut self,
        character: u8,
    ) -> Result<(), Error<E>> {
        if character == commands::CHANNEL_SETTINGS_LATCH
            && self.parser.processed < CHANNEL_SETTINGS_BYTES - 1
        {
            self.parser.end();
            self.report_failure("too few chars");
            return Ok(());
        }

        match self.parser.processed {
            1 => self.parser.target_channel = channel_for_ascii(character),
            2 => self.parser.scratch[0] = digit_for_ascii(character),
            3 => self.parser.scratch[1] = gain_code_for_ascii(character),
            4 => self.parser.scratch[2] = digit_for_ascii(character),
            5 => self.parser.scratch[3] = digit_for_ascii(character),
            6 => self.parser.scratch[4] = digit_for_ascii(character),
            7 => self.parser.scratch[5] = digit_for_ascii(character),
            8 => {
                if character != commands::CHANNEL_SETTINGS_LATCH {
                    self.parser.end();
                    self.report_failure("9th char not X");
                    return Ok(());
                }
            }
            _ => {
                self.parser.end();
                self.report_failure("too many chars");
                return Ok(());
            }
        }

        self.parser.processed += 1;
        if self.parser.processed == CHANNEL_SETTINGS_BYTES {
            let ch = self.parser.target_channel;

            let mut message: String<32> = String::new();
            let _ = write!(message, "Channel set for {}", ch + 1);
            self.report_success(&message);

            // Commit all six fields at once, then push them to the device.
            let config = &mut self.channels[ch];
            config.power_down = self.parser.scratch[0] != 0;
            config.gain =
                Gain::from_code(self.parser.scratch[1]).unwrap_or(Gain::X24);
            config.mux =
                Mux::from_code(self.parser.scratch[2]).unwrap_or(Mux::Normal);
            config.bias_include = self.parser.scratch[3] != 0;
            config.srb2 = self.parser.scratch[4] != 0;
            config.srb1 = self.parser.scratch[5] != 0;

            self.stream_safe_channel_settings(ch + 1)?;
            self.parser.end();
        }
        Ok(())
    }

    /// Lead-off sub-parser: selector, P-side digit, N-side digit, latch.
    fn process_incoming_lead_off_settings(
        &mut self,
        character: u8,
    ) -> Result<(), Error<E>> {
        if character == commands::LEAD_OFF_LATCH
            && self.parser.processed < LEAD_OFF_SETTINGS_BYTES - 1
        {
            self.parser.end();
            self.report_failure("too few chars");
            return Ok(());
        }

        match self.parser.processed {
            1 => self.parser.target_channel = channel_for_ascii(character),
            2 => self.parser.scratch[0] = digit_for_ascii(character),
            3 => self.parser.scratch[1] = digit_for_ascii(character),
            4 => {
                if character != commands::LEAD_OFF_LATCH {
                    self.parser.end();
                    self.report_failure("5th char not Z");
                    return Ok(());
                }
            }
            _ => {
                self.parser.end();
                self.report_failure("too many chars");
                return Ok(());
            }
        }

        self.parser.processed += 1;
        if self.parser.processed == LEAD_OFF_SETTINGS_BYTES {
            let ch = self.parser.target_channel;

            let mut message: String<32> = String::new();
            let _ = write!(message, "Lead off set for {}", ch + 1);
            self.report_success(&message);

            self.lead_off[ch].p_side = self.parser.scratch[0] != 0;
            self.lead_off[ch].n_side = self.parser.scratch[1] != 0;

            self.stream_safe_lead_off(ch + 1)?;
            self.parser.end();
        }
        Ok(())
    }

    /// Sample-rate sub-parser: exactly one byte. The trigger repeated is a
    /// query; a digit selects the rate (0 fastest .. 6 slowest); anything
    /// else is invalid.
    fn process_incoming_sample_rate(
        &mut self,
        character: u8,
    ) -> Result<(), Error<E>> {
        if character == commands::SAMPLE_RATE_SET {
            self.report_sample_rate();
        } else if character.is_ascii_digit() {
            match SampleRate::from_code(character - b'0') {
                Ok(rate) => {
                    self.stream_safe_set_sample_rate(rate)?;
                    if !self.streaming {
                        self.report_sample_rate();
                    }
                }
                Err(_) => self.report_failure("sample value out of bounds"),
            }
        } else {
            self.report_failure("invalid sample value");
        }
        self.parser.end();
        Ok(())
    }
}
