//! Host command byte assignments.
//!
//! Single bytes unless noted. The three multi-byte sequences (channel
//! settings, lead-off settings, sample rate) are introduced by their trigger
//! byte and, where applicable, terminated by a latch byte.

/// Turn a channel off, 1-based.
pub const CHANNEL_OFF: [u8; 8] = *b"12345678";

/// Turn a channel on, 1-based.
pub const CHANNEL_ON: [u8; 8] = *b"QWERTYUI";

// Channel settings sequence: 'x' <channel> <power> <gain> <input> <bias>
// <srb2> <srb1> 'X'.
pub const CHANNEL_SETTINGS_SET: u8 = b'x';
pub const CHANNEL_SETTINGS_LATCH: u8 = b'X';

// Lead-off sequence: 'z' <channel> <p-side> <n-side> 'Z'.
pub const LEAD_OFF_SET: u8 = b'z';
pub const LEAD_OFF_LATCH: u8 = b'Z';

/// Trigger for the sample-rate sequence; repeated, it queries the current
/// rate instead of setting one.
pub const SAMPLE_RATE_SET: u8 = b'~';

// Internal test-signal selectors.
pub const TEST_GND: u8 = b'0';
pub const TEST_PULSE_1X_SLOW: u8 = b'-';
pub const TEST_PULSE_1X_FAST: u8 = b'=';
pub const TEST_PULSE_2X_SLOW: u8 = b'[';
pub const TEST_PULSE_2X_FAST: u8 = b']';
pub const TEST_DC: u8 = b'p';
pub const NORMAL_INPUT: u8 = b'n';

pub const SET_CHANNEL_DEFAULTS: u8 = b'd';
pub const REPORT_CHANNEL_DEFAULTS: u8 = b'D';

pub const STREAM_START: u8 = b'b';
pub const STREAM_STOP: u8 = b's';

pub const SOFT_RESET: u8 = b'v';
pub const QUERY_REGISTERS: u8 = b'?';
pub const GET_VERSION: u8 = b'V';
pub const QUERY_CHANNEL_COUNT: u8 = b'C';

pub const SERIAL_STREAM_ON: u8 = b't';
pub const SERIAL_STREAM_OFF: u8 = b'y';

/// Diagnostic LED on the ADS GPIO bank.
pub const LED_ON: u8 = b'l';
pub const LED_OFF: u8 = b'k';

// Transmit format selection.
pub const TX_RAW: u8 = b'<';
pub const TX_ASCII: u8 = b'>';
