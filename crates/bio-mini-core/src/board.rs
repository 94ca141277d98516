use ads1299::{
    Ads1299, CalFreq, Command, Config1, Config2, Config3, Error, Mux,
    Register, SampleRate,
};
use bio_mini_icd::{
    ChannelConfig, LeadOffConfig, TxMode, BOARD_CHANNELS, NUM_CHANNELS,
    SAMPLE_BYTES,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use embedded_io::Write;
use portable_atomic::{AtomicBool, Ordering};

use crate::parser::Parser;

/// The acquisition front-end: device state, configuration engines and the
/// command protocol, bound to the injected bus/pin/host collaborators.
///
/// All mutable device state lives in this one aggregate; there are no
/// hidden statics. The only shared state is the borrowed data-ready flag,
/// written by the interrupt handler and read here.
pub struct Board<'a, SPI, START, HOST, D> {
    pub(crate) ads: Ads1299<SPI>,
    pub(crate) start_pin: START,
    pub(crate) host: HOST,
    pub(crate) delay: D,
    pub(crate) drdy: &'a AtomicBool,

    // Per-channel configuration.
    pub(crate) channels: [ChannelConfig; NUM_CHANNELS],
    pub(crate) lead_off: [LeadOffConfig; NUM_CHANNELS],
    /// Bias-generation membership, remembered across channel power-down.
    pub(crate) use_in_bias: [bool; NUM_CHANNELS],
    /// Board-wide SRB1 switch state; the OR of every channel's request.
    pub(crate) use_srb1: bool,

    // Streaming state.
    pub(crate) sample_rate: SampleRate,
    pub(crate) tx_mode: TxMode,
    pub(crate) serial_stream: bool,
    pub(crate) streaming: bool,
    pub(crate) running: bool,

    // Acquisition buffers. Overwritten in place once per data-ready event;
    // the previous values survive only long enough for the 2-sample mean.
    pub(crate) first_frame: bool,
    pub(crate) sample_counter: u8,
    pub(crate) status_word: u32,
    pub(crate) raw_sample: [u8; SAMPLE_BYTES],
    pub(crate) mean_sample: [u8; SAMPLE_BYTES],
    pub(crate) values: [i32; BOARD_CHANNELS],
    pub(crate) last_values: [i32; BOARD_CHANNELS],
    pub(crate) mean_values: [i32; BOARD_CHANNELS],
    pub(crate) mean_valid: bool,

    pub(crate) parser: Parser,
}

impl<'a, SPI, START, HOST, D, E> Board<'a, SPI, START, HOST, D>
where
    SPI: SpiDevice<Error = E>,
    START: OutputPin,
    HOST: Write,
    D: DelayNs,
{
    pub fn new(
        spi: SPI,
        start_pin: START,
        host: HOST,
        delay: D,
        drdy: &'a AtomicBool,
    ) -> Self {
        Self {
            ads: Ads1299::new(spi),
            start_pin,
            host,
            delay,
            drdy,
            channels: [ChannelConfig::default(); NUM_CHANNELS],
            lead_off: [LeadOffConfig::default(); NUM_CHANNELS],
            use_in_bias: [true; NUM_CHANNELS],
            use_srb1: true,
            sample_rate: SampleRate::default(),
            tx_mode: TxMode::default(),
            serial_stream: true,
            streaming: false,
            running: false,
            first_frame: true,
            sample_counter: 0,
            status_word: 0,
            raw_sample: [0; SAMPLE_BYTES],
            mean_sample: [0; SAMPLE_BYTES],
            values: [0; BOARD_CHANNELS],
            last_values: [0; BOARD_CHANNELS],
            mean_values: [0; BOARD_CHANNELS],
            mean_valid: false,
            parser: Parser::default(),
        }
    }

    /// Bring the board up: full device initialization, lead-off defaults
    /// and the identification banner. Also the handler for the soft-reset
    /// command.
    pub fn board_reset(&mut self) -> Result<(), Error<E>> {
        self.initialize_ads()?;
        self.delay.delay_ms(500);
        self.configure_lead_off_detection(
            ads1299::ILeadOff::_6nA,
            ads1299::FLeadOff::Ac31_2,
        )?;
        self.report_banner()?;
        self.delay.delay_ms(5);
        Ok(())
    }

    /// Power-up/default-settings sequence: reset the device, program the
    /// data rate, push the default channel map and reference/bias
    /// configuration. Re-run in full on every sample-rate change.
    pub(crate) fn initialize_ads(&mut self) -> Result<(), Error<E>> {
        // Recommended power-up wait, > tPOR.
        self.delay.delay_ms(50);
        self.reset_ads()?;
        self.delay.delay_ms(10);

        self.ads.write_register(
            Register::CONFIG1,
            Config1::default().with_sample_rate(self.sample_rate).bits(),
        )?;
        self.delay.delay_ms(40);

        self.channels = [ChannelConfig::default(); NUM_CHANNELS];
        self.use_in_bias = [true; NUM_CHANNELS];
        self.use_srb1 = true;
        self.write_all_channel_settings()?;

        // Internal reference buffer, internal bias reference, bias buffer.
        self.ads.write_register(
            Register::CONFIG3,
            Config3::default()
                .with_pd_refbuf(true)
                .with_biasref_int(true)
                .with_pd_bias(true)
                .bits(),
        )?;
        self.delay.delay_ms(1);

        self.lead_off = [LeadOffConfig::default(); NUM_CHANNELS];
        self.write_lead_off_all()?;

        self.first_frame = true;
        self.streaming = false;
        Ok(())
    }

    /// Reset sequence: RESET defaults every register, SDATAC re-enables
    /// register access, then every channel is parked powered down.
    fn reset_ads(&mut self) -> Result<(), Error<E>> {
        self.ads.cmd(Command::Reset)?;
        self.ads.cmd(Command::Sdatac)?;
        self.led_probe()?;
        self.delay.delay_ms(100);
        for ch in 1..=NUM_CHANNELS {
            self.deactivate_channel(ch)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Acquisition lifecycle
    // -----------------------------------------------------------------

    /// Idle -> Running: reset the frame bookkeeping, raise START, start
    /// conversions and enter continuous-read mode.
    pub(crate) fn start_acquisition(&mut self) -> Result<(), Error<E>> {
        self.sample_counter = 0;
        self.first_frame = true;
        self.start_pin.set_high().unwrap();
        self.delay.delay_ms(10);
        self.ads.cmd(Command::Start)?;
        self.delay.delay_ms(1);
        self.ads.cmd(Command::Rdatac)?;
        self.delay.delay_ms(1);
        self.running = true;
        Ok(())
    }

    /// Running -> Idle: stop conversions and leave continuous-read mode so
    /// register access is defined again.
    pub(crate) fn stop_acquisition(&mut self) -> Result<(), Error<E>> {
        self.ads.cmd(Command::Stop)?;
        self.delay.delay_ms(1);
        self.ads.cmd(Command::Sdatac)?;
        self.delay.delay_ms(1);
        self.running = false;
        Ok(())
    }

    pub fn stream_start(&mut self) -> Result<(), Error<E>> {
        self.streaming = true;
        self.start_acquisition()
    }

    pub fn stream_stop(&mut self) -> Result<(), Error<E>> {
        self.streaming = false;
        self.stop_acquisition()
    }

    // -----------------------------------------------------------------
    // Streaming safety
    // -----------------------------------------------------------------

    /// Run a configuration mutation with acquisition suspended.
    ///
    /// Register access and continuous-read mode are mutually exclusive on
    /// this device, so every configuration entry point funnels through
    /// here: stop if streaming, mutate, restart if it was streaming.
    pub(crate) fn stream_safe<F>(&mut self, mutation: F) -> Result<(), Error<E>>
    where
        F: FnOnce(&mut Self) -> Result<(), Error<E>>,
    {
        let was_streaming = self.streaming;
        if self.streaming {
            self.stream_stop()?;
        }
        mutation(self)?;
        if was_streaming {
            self.stream_start()?;
        }
        Ok(())
    }

    pub fn stream_safe_channel_activate(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        self.stream_safe(|board| {
            board.activate_channel(channel)?;
            board.report_channel_state(channel, "activated");
            Ok(())
        })
    }

    pub fn stream_safe_channel_deactivate(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        self.stream_safe(|board| {
            board.deactivate_channel(channel)?;
            board.report_channel_state(channel, "deactivated");
            Ok(())
        })
    }

    pub fn stream_safe_channel_settings(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        self.stream_safe(|board| board.write_channel_settings(channel))
    }

    pub fn stream_safe_lead_off(
        &mut self,
        channel: usize,
    ) -> Result<(), Error<E>> {
        self.stream_safe(|board| board.write_lead_off(channel))
    }

    pub fn stream_safe_set_defaults(&mut self) -> Result<(), Error<E>> {
        self.stream_safe(|board| board.set_channels_to_default())
    }

    /// Changing the data rate re-runs the whole power-up/default sequence,
    /// not just a CONFIG1 tweak.
    pub fn stream_safe_set_sample_rate(
        &mut self,
        rate: SampleRate,
    ) -> Result<(), Error<E>> {
        self.stream_safe(|board| {
            board.sample_rate = rate;
            board.initialize_ads()
        })
    }

    pub fn stream_safe_set_tx_mode(
        &mut self,
        mode: TxMode,
    ) -> Result<(), Error<E>> {
        self.stream_safe(|board| {
            board.tx_mode = mode;
            Ok(())
        })
    }

    // -----------------------------------------------------------------
    // Diagnostics on the ADS GPIO bank
    // -----------------------------------------------------------------

    /// GPIO write/readback used during reset as a bus sanity check.
    pub(crate) fn led_probe(&mut self) -> Result<(), Error<E>> {
        self.ads.read_register(Register::GPIO)?;
        self.ads.write_register(Register::GPIO, 0x00)?;
        self.delay.delay_ms(100);
        self.ads.read_register(Register::GPIO)?;
        Ok(())
    }

    fn write_led(&mut self, gpio: u8) -> Result<(), Error<E>> {
        self.stream_safe(|board| {
            board.ads.read_register(Register::GPIO)?;
            board.ads.cmd(Command::Sdatac)?;
            board.ads.write_register(Register::GPIO, gpio)?;
            board.delay.delay_ms(100);
            board.ads.read_register(Register::GPIO)?;
            Ok(())
        })
    }

    /// Status LED sits on GPIO4, driven low-active.
    pub fn led_on(&mut self) -> Result<(), Error<E>> {
        self.write_led(0x00)
    }

    pub fn led_off(&mut self) -> Result<(), Error<E>> {
        self.write_led(0x80)
    }

    // -----------------------------------------------------------------
    // Internal test signal
    // -----------------------------------------------------------------

    /// Route every channel to a test condition: program the internal test
    /// signal, then switch all input muxes. `None` keeps the current
    /// amplitude/frequency bits.
    pub fn apply_test_mode(
        &mut self,
        input: Mux,
        amplitude_2x: Option<bool>,
        frequency: Option<CalFreq>,
    ) -> Result<(), Error<E>> {
        let was_streaming = self.streaming;
        if self.streaming {
            self.stream_stop()?;
        }

        self.configure_test_signal(amplitude_2x, frequency)?;
        self.change_input_type(input)?;

        if was_streaming {
            self.stream_start()?;
        } else {
            self.send_line("Configured internal");
            self.send_eot();
        }
        Ok(())
    }

    fn configure_test_signal(
        &mut self,
        amplitude_2x: Option<bool>,
        frequency: Option<CalFreq>,
    ) -> Result<(), Error<E>> {
        let (amp, freq) = match (amplitude_2x, frequency) {
            (Some(a), Some(f)) => (a, f),
            _ => {
                let current = Config2::from_bits_retain(
                    self.ads.read_register(Register::CONFIG2)?,
                );
                (
                    amplitude_2x.unwrap_or(current.cal_amp()),
                    frequency.unwrap_or(current.cal_freq()),
                )
            }
        };
        self.ads.write_register(
            Register::CONFIG2,
            Config2::default()
                .with_int_cal(true)
                .with_cal_amp(amp)
                .with_cal_freq(freq)
                .bits(),
        )?;
        self.delay.delay_ms(1);
        Ok(())
    }

    // -----------------------------------------------------------------
    // State accessors
    // -----------------------------------------------------------------

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Whether the converter itself is running (streaming intent aside).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Status word of the last captured frame: 1100 + LOFF_STATP +
    /// LOFF_STATN + GPIO[7:4].
    pub fn status_word(&self) -> u32 {
        self.status_word
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    pub fn tx_mode(&self) -> TxMode {
        self.tx_mode
    }

    pub fn serial_stream(&self) -> bool {
        self.serial_stream
    }

    pub fn channel_config(&self, channel: usize) -> &ChannelConfig {
        &self.channels[channel]
    }

    pub fn lead_off_config(&self, channel: usize) -> &LeadOffConfig {
        &self.lead_off[channel]
    }

    pub fn uses_common_reference(&self) -> bool {
        self.use_srb1
    }

    pub fn sample_counter(&self) -> u8 {
        self.sample_counter
    }

    pub fn channel_values(&self) -> &[i32; BOARD_CHANNELS] {
        &self.values
    }

    /// Clamp a 1-based channel number into range and convert to the
    /// zero-based index. Out-of-range input is silently reinterpreted,
    /// never rejected.
    pub(crate) fn clamp_channel(channel: usize) -> usize {
        channel.clamp(1, NUM_CHANNELS) - 1
    }

    /// Data-ready flag state, as set by the interrupt handler.
    pub fn data_ready(&self) -> bool {
        self.drdy.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_data_ready(&mut self) {
        self.drdy.store(false, Ordering::SeqCst);
    }
}
