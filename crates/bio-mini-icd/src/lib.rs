//! Interface control document for the bio-mini acquisition front-end.
//!
//! Everything a host needs to talk to the board lives here: the command byte
//! table, framing constants, per-channel configuration types and the
//! compiled-in board defaults they revert to on reset.

#![no_std]

pub mod commands;

use ads1299::{Gain, Mux};

pub const BOARD_NAME: &str = "bio-mini";
pub const FW_VERSION: &str = "v1.0";

/// Channels the settings engine manages (the full CHnSET register bank).
pub const NUM_CHANNELS: usize = 8;
/// Channels bonded out on this board variant and present in every frame.
pub const BOARD_CHANNELS: usize = 4;
pub const BYTES_PER_CHANNEL: usize = 3;
/// Raw sample payload per frame, big-endian per channel.
pub const SAMPLE_BYTES: usize = BOARD_CHANNELS * BYTES_PER_CHANNEL;
/// Status word plus channel data, as clocked out in continuous-read mode.
pub const FRAME_BYTES: usize = 3 + SAMPLE_BYTES;

/// Channels on the auxiliary low-rate sensor ADC.
pub const AUX_CHANNELS: usize = 4;

/// End-of-transmission marker closing every textual acknowledgement.
pub const EOT: &str = "$$$";

/// Window for completing a multi-byte command before it is abandoned.
pub const MULTI_CHAR_CMD_TIMEOUT_MS: u64 = 1000;

/// Bytes in the channel-settings sequence, trigger and latch included.
pub const CHANNEL_SETTINGS_BYTES: u8 = 9;
/// Bytes in the lead-off sequence, trigger and latch included.
pub const LEAD_OFF_SETTINGS_BYTES: u8 = 5;

/// How sample data is written to the host link.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxMode {
    #[default]
    Raw,
    Ascii,
}

/// Stored configuration for one acquisition channel.
///
/// `bias_include` tracks the channel's membership in the two bias-sense
/// registers; `srb1` is modeled per channel even though the hardware switch
/// is board-wide (any channel asking for it closes it for all).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub power_down: bool,
    pub gain: Gain,
    pub mux: Mux,
    pub bias_include: bool,
    pub srb2: bool,
    pub srb1: bool,
}

impl Default for ChannelConfig {
    /// Board power-up defaults: active, 24x gain, normal electrode input,
    /// included in bias generation, N side referenced through SRB1.
    fn default() -> Self {
        Self {
            power_down: false,
            gain: Gain::X24,
            mux: Mux::Normal,
            bias_include: true,
            srb2: false,
            srb1: true,
        }
    }
}

impl ChannelConfig {
    /// The six settings as ASCII digits, in protocol order (power-down,
    /// gain, input type, bias, SRB2, SRB1). Used by the defaults report.
    pub fn as_digits(&self) -> [u8; 6] {
        [
            b'0' + self.power_down as u8,
            b'0' + self.gain.code(),
            b'0' + self.mux.code(),
            b'0' + self.bias_include as u8,
            b'0' + self.srb2 as u8,
            b'0' + self.srb1 as u8,
        ]
    }
}

/// Per-channel impedance-test enables for the two sensing sides.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeadOffConfig {
    pub p_side: bool,
    pub n_side: bool,
}
