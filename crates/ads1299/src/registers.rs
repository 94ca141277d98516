use crate::errors::RegisterError;
use bitflags::bitflags;

/// SPI opcodes (datasheet pg. 35). Register reads and writes are built from
/// the RREG/WREG opcode bases in the driver; everything else is a
/// single-byte chip command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Wakeup,
    Standby,
    Reset,
    Start,
    Stop,
    Rdatac,
    Sdatac,
    Rdata,
}

pub(crate) const RREG: u8 = 0x20;
pub(crate) const WREG: u8 = 0x40;

impl Command {
    pub const fn opcode(self) -> u8 {
        match self {
            Command::Wakeup => 0x02,
            Command::Standby => 0x04,
            Command::Reset => 0x06,
            Command::Start => 0x08,
            Command::Stop => 0x0A,
            Command::Rdatac => 0x10,
            Command::Sdatac => 0x11,
            Command::Rdata => 0x12,
        }
    }

    /// Execution/decode time the device needs after the opcode before the
    /// next SCLKs may arrive (datasheet pg. 40-41). Held inside the
    /// chip-select frame.
    pub const fn settle_ns(self) -> u32 {
        match self {
            // 18 tCLK to execute.
            Command::Reset => 12_000,
            // 4 tCLK before data retrieval SCLKs or the next command.
            Command::Wakeup | Command::Rdatac => 3_000,
            Command::Sdatac => 10_000,
            Command::Standby | Command::Start | Command::Stop | Command::Rdata => 0,
        }
    }
}

/// Register map (datasheet Table 14).
#[allow(non_camel_case_types)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// ID Control Register (Factory-Programmed, Read-Only)
    ID = 0x00,
    CONFIG1 = 0x01,
    CONFIG2 = 0x02,
    CONFIG3 = 0x03,
    /// Lead-Off Control Register
    LOFF = 0x04,
    CH1SET = 0x05,
    CH2SET = 0x06,
    CH3SET = 0x07,
    CH4SET = 0x08,
    CH5SET = 0x09,
    CH6SET = 0x0A,
    CH7SET = 0x0B,
    CH8SET = 0x0C,
    BIAS_SENSP = 0x0D,
    BIAS_SENSN = 0x0E,
    LOFF_SENSP = 0x0F,
    LOFF_SENSN = 0x10,
    LOFF_FLIP = 0x11,
    LOFF_STATP = 0x12,
    LOFF_STATN = 0x13,
    GPIO = 0x14,
    MISC1 = 0x15,
    MISC2 = 0x16,
    CONFIG4 = 0x17,
}

/// Number of mapped registers, for full-map dumps.
pub const NUM_REGISTERS: usize = 24;

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// CHnSET register for a zero-based channel index. Out-of-range indices
    /// saturate at channel 8.
    pub const fn from_channel_index(ch: usize) -> Self {
        match ch {
            0 => Self::CH1SET,
            1 => Self::CH2SET,
            2 => Self::CH3SET,
            3 => Self::CH4SET,
            4 => Self::CH5SET,
            5 => Self::CH6SET,
            6 => Self::CH7SET,
            _ => Self::CH8SET,
        }
    }

    pub const fn from_addr(addr: u8) -> Option<Self> {
        Some(match addr {
            0x00 => Self::ID,
            0x01 => Self::CONFIG1,
            0x02 => Self::CONFIG2,
            0x03 => Self::CONFIG3,
            0x04 => Self::LOFF,
            0x05 => Self::CH1SET,
            0x06 => Self::CH2SET,
            0x07 => Self::CH3SET,
            0x08 => Self::CH4SET,
            0x09 => Self::CH5SET,
            0x0A => Self::CH6SET,
            0x0B => Self::CH7SET,
            0x0C => Self::CH8SET,
            0x0D => Self::BIAS_SENSP,
            0x0E => Self::BIAS_SENSN,
            0x0F => Self::LOFF_SENSP,
            0x10 => Self::LOFF_SENSN,
            0x11 => Self::LOFF_FLIP,
            0x12 => Self::LOFF_STATP,
            0x13 => Self::LOFF_STATN,
            0x14 => Self::GPIO,
            0x15 => Self::MISC1,
            0x16 => Self::MISC2,
            0x17 => Self::CONFIG4,
            _ => return None,
        })
    }

    /// Datasheet name, used by the register dump report.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ID => "ID",
            Self::CONFIG1 => "CONFIG1",
            Self::CONFIG2 => "CONFIG2",
            Self::CONFIG3 => "CONFIG3",
            Self::LOFF => "LOFF",
            Self::CH1SET => "CH1SET",
            Self::CH2SET => "CH2SET",
            Self::CH3SET => "CH3SET",
            Self::CH4SET => "CH4SET",
            Self::CH5SET => "CH5SET",
            Self::CH6SET => "CH6SET",
            Self::CH7SET => "CH7SET",
            Self::CH8SET => "CH8SET",
            Self::BIAS_SENSP => "BIAS_SENSP",
            Self::BIAS_SENSN => "BIAS_SENSN",
            Self::LOFF_SENSP => "LOFF_SENSP",
            Self::LOFF_SENSN => "LOFF_SENSN",
            Self::LOFF_FLIP => "LOFF_FLIP",
            Self::LOFF_STATP => "LOFF_STATP",
            Self::LOFF_STATN => "LOFF_STATN",
            Self::GPIO => "GPIO",
            Self::MISC1 => "MISC1",
            Self::MISC2 => "MISC2",
            Self::CONFIG4 => "CONFIG4",
        }
    }
}

/// Output data rate. The discriminant doubles as the CONFIG1.DR field value
/// and as the protocol digit used to select the rate over the command link.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
    KSps16 = 0,
    KSps8 = 1,
    KSps4 = 2,
    KSps2 = 3,
    KSps1 = 4,
    Sps500 = 5,
    #[default]
    Sps250 = 6,
}

impl SampleRate {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Result<Self, RegisterError> {
        Ok(match code {
            0 => Self::KSps16,
            1 => Self::KSps8,
            2 => Self::KSps4,
            3 => Self::KSps2,
            4 => Self::KSps1,
            5 => Self::Sps500,
            6 => Self::Sps250,
            e => return Err(RegisterError::InvalidSampleRate(e)),
        })
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::KSps16 => "16000",
            Self::KSps8 => "8000",
            Self::KSps4 => "4000",
            Self::KSps2 => "2000",
            Self::KSps1 => "1000",
            Self::Sps500 => "500",
            Self::Sps250 => "250",
        }
    }
}

/// PGA gain. The discriminant is the protocol digit; the CHnSET field value
/// is the digit shifted into bits 6:4.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    X1 = 0,
    X2 = 1,
    X4 = 2,
    X6 = 3,
    X8 = 4,
    X12 = 5,
    #[default]
    X24 = 6,
}

impl Gain {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Result<Self, RegisterError> {
        Ok(match code {
            0 => Self::X1,
            1 => Self::X2,
            2 => Self::X4,
            3 => Self::X6,
            4 => Self::X8,
            5 => Self::X12,
            6 => Self::X24,
            e => return Err(RegisterError::InvalidGain(e)),
        })
    }
}

/// Channel input multiplexer selection (CHnSET bits 2:0).
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mux {
    #[default]
    Normal = 0,
    Shorted = 1,
    BiasMeasure = 2,
    Supply = 3,
    Temperature = 4,
    TestSignal = 5,
    BiasDriveP = 6,
    BiasDriveN = 7,
}

impl Mux {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Result<Self, RegisterError> {
        Ok(match code {
            0 => Self::Normal,
            1 => Self::Shorted,
            2 => Self::BiasMeasure,
            3 => Self::Supply,
            4 => Self::Temperature,
            5 => Self::TestSignal,
            6 => Self::BiasDriveP,
            7 => Self::BiasDriveN,
            e => return Err(RegisterError::InvalidMux(e)),
        })
    }
}

/// Test-signal frequency (CONFIG2 bits 1:0).
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalFreq {
    /// Pulsed at fCLK / 2^21.
    #[default]
    PulseSlow = 0b00,
    /// Pulsed at fCLK / 2^20.
    PulseFast = 0b01,
    DoNotUse = 0b10,
    Dc = 0b11,
}

/// Lead-off comparator excitation current (LOFF bits 3:2, pre-shifted).
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ILeadOff {
    #[default]
    _6nA = 0b0000,
    _24nA = 0b0100,
    _6uA = 0b1000,
    _24uA = 0b1100,
}

/// Lead-off excitation frequency (LOFF bits 1:0).
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FLeadOff {
    #[default]
    Dc = 0b00,
    Ac7_8 = 0b01,
    Ac31_2 = 0b10,
    AcFdrBy4 = 0b11,
}

bitflags! {
    /// ID
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Id: u8 {
        const REV_ID2 = 0b1000_0000;
        const REV_ID1 = 0b0100_0000;
        const REV_ID0 = 0b0010_0000;
        const DEV_ID1 = 0b0000_1000;
        const DEV_ID0 = 0b0000_0100;
        const NU_CH1  = 0b0000_0010;
        const NU_CH0  = 0b0000_0001;

        const DEV_ID = Self::DEV_ID1.bits() | Self::DEV_ID0.bits();
        const NU_CH = Self::NU_CH1.bits() | Self::NU_CH0.bits();
    }
}

impl Id {
    pub const fn num_channels(&self) -> Result<u8, RegisterError> {
        match self.intersection(Self::NU_CH).bits() {
            0b00 => Ok(4),
            0b01 => Ok(6),
            0b10 => Ok(8),
            e => Err(RegisterError::InvalidChannelCount(e)),
        }
    }

    /// An implausible readback is the only visible symptom of absent or
    /// unresponsive hardware on this bus.
    pub const fn verify(&self) -> Result<(), RegisterError> {
        match self.num_channels() {
            Ok(_) => {}
            Err(_) => return Err(RegisterError::NotDetected),
        }
        match self.intersection(Self::DEV_ID).bits() >> 2 {
            0b11 => Ok(()),
            _ => Err(RegisterError::NotDetected),
        }
    }
}

bitflags! {
    /// CONFIG1
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Config1: u8 {
        const DAISY_EN = 0b0100_0000;
        const CLK_EN   = 0b0010_0000;
        const DR2      = 0b0000_0100;
        const DR1      = 0b0000_0010;
        const DR0      = 0b0000_0001;

        const DR = Self::DR2.bits() | Self::DR1.bits() | Self::DR0.bits();
    }
}

impl Default for Config1 {
    fn default() -> Config1 {
        Self::from_bits_retain(0x96)
    }
}

impl Config1 {
    pub const fn sample_rate(&self) -> Result<SampleRate, RegisterError> {
        SampleRate::from_code(self.intersection(Self::DR).bits())
    }

    pub const fn with_sample_rate(self, rate: SampleRate) -> Self {
        self.difference(Self::DR)
            .union(Self::from_bits_retain(rate.code()))
    }
}

bitflags! {
    /// CONFIG2
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Config2: u8 {
        const INT_CAL   = 0b0001_0000;
        const CAL_AMP   = 0b0000_0100;
        const CAL_FREQ1 = 0b0000_0010;
        const CAL_FREQ0 = 0b0000_0001;

        const CAL_FREQ = Self::CAL_FREQ1.bits() | Self::CAL_FREQ0.bits();
    }
}

impl Default for Config2 {
    fn default() -> Self {
        Self::from_bits_retain(0xC0)
    }
}

impl Config2 {
    pub const fn int_cal(&self) -> bool {
        self.contains(Self::INT_CAL)
    }

    pub const fn with_int_cal(self, int_cal: bool) -> Self {
        let reg = self.difference(Self::INT_CAL);
        if int_cal {
            reg.union(Self::INT_CAL)
        } else {
            reg
        }
    }

    /// True selects the 2x test-signal amplitude.
    pub const fn cal_amp(&self) -> bool {
        self.contains(Self::CAL_AMP)
    }

    pub const fn with_cal_amp(self, cal_amp: bool) -> Self {
        let reg = self.difference(Self::CAL_AMP);
        if cal_amp {
            reg.union(Self::CAL_AMP)
        } else {
            reg
        }
    }

    pub const fn cal_freq(&self) -> CalFreq {
        match self.intersection(Self::CAL_FREQ).bits() {
            0b00 => CalFreq::PulseSlow,
            0b01 => CalFreq::PulseFast,
            0b10 => CalFreq::DoNotUse,
            _ => CalFreq::Dc,
        }
    }

    pub const fn with_cal_freq(self, cal_freq: CalFreq) -> Self {
        self.difference(Self::CAL_FREQ)
            .union(Self::from_bits_retain(cal_freq as u8))
    }
}

bitflags! {
    /// CONFIG3
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Config3: u8 {
        /// 1 = internal reference buffer enabled (the bit is a power-down
        /// control with inverted sense).
        const PD_REFBUF      = 0b1000_0000;
        const BIAS_MEAS      = 0b0001_0000;
        const BIASREF_INT    = 0b0000_1000;
        /// 1 = bias buffer enabled (inverted sense, as PD_REFBUF).
        const PD_BIAS        = 0b0000_0100;
        const BIAS_LOFF_SENS = 0b0000_0010;
        const BIAS_STAT      = 0b0000_0001;
    }
}

impl Default for Config3 {
    fn default() -> Self {
        Self::from_bits_retain(0x60)
    }
}

impl Config3 {
    pub const fn with_pd_refbuf(self, en: bool) -> Self {
        let reg = self.difference(Self::PD_REFBUF);
        if en {
            reg.union(Self::PD_REFBUF)
        } else {
            reg
        }
    }

    pub const fn with_biasref_int(self, en: bool) -> Self {
        let reg = self.difference(Self::BIASREF_INT);
        if en {
            reg.union(Self::BIASREF_INT)
        } else {
            reg
        }
    }

    pub const fn with_pd_bias(self, en: bool) -> Self {
        let reg = self.difference(Self::PD_BIAS);
        if en {
            reg.union(Self::PD_BIAS)
        } else {
            reg
        }
    }
}

bitflags! {
    /// LOFF
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Loff: u8 {
        const COMP_TH2   = 0b1000_0000;
        const COMP_TH1   = 0b0100_0000;
        const COMP_TH0   = 0b0010_0000;
        const ILEAD_OFF1 = 0b0000_1000;
        const ILEAD_OFF0 = 0b0000_0100;
        const FLEAD_OFF1 = 0b0000_0010;
        const FLEAD_OFF0 = 0b0000_0001;

        const COMP_TH = Self::COMP_TH2.bits() | Self::COMP_TH1.bits() | Self::COMP_TH0.bits();
        const ILEAD_OFF = Self::ILEAD_OFF1.bits() | Self::ILEAD_OFF0.bits();
        const FLEAD_OFF = Self::FLEAD_OFF1.bits() | Self::FLEAD_OFF0.bits();
    }
}

impl Default for Loff {
    fn default() -> Self {
        Self::from_bits_retain(0x00)
    }
}

impl Loff {
    pub const fn ilead_off(&self) -> ILeadOff {
        match self.intersection(Self::ILEAD_OFF).bits() {
            0b0000 => ILeadOff::_6nA,
            0b0100 => ILeadOff::_24nA,
            0b1000 => ILeadOff::_6uA,
            _ => ILeadOff::_24uA,
        }
    }

    pub const fn with_ilead_off(self, ilead_off: ILeadOff) -> Self {
        self.difference(Self::ILEAD_OFF)
            .union(Self::from_bits_retain(ilead_off as u8))
    }

    pub const fn flead_off(&self) -> FLeadOff {
        match self.intersection(Self::FLEAD_OFF).bits() {
            0b00 => FLeadOff::Dc,
            0b01 => FLeadOff::Ac7_8,
            0b10 => FLeadOff::Ac31_2,
            _ => FLeadOff::AcFdrBy4,
        }
    }

    pub const fn with_flead_off(self, flead_off: FLeadOff) -> Self {
        self.difference(Self::FLEAD_OFF)
            .union(Self::from_bits_retain(flead_off as u8))
    }
}

bitflags! {
    /// CHnSET
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ChSet: u8 {
        const PD    = 0b1000_0000;
        const GAIN2 = 0b0100_0000;
        const GAIN1 = 0b0010_0000;
        const GAIN0 = 0b0001_0000;
        const SRB2  = 0b0000_1000;
        const MUX2  = 0b0000_0100;
        const MUX1  = 0b0000_0010;
        const MUX0  = 0b0000_0001;

        const GAIN = Self::GAIN2.bits() | Self::GAIN1.bits() | Self::GAIN0.bits();
        const MUX = Self::MUX2.bits() | Self::MUX1.bits() | Self::MUX0.bits();
    }
}

impl Default for ChSet {
    fn default() -> Self {
        Self::from_bits_retain(0x61)
    }
}

impl ChSet {
    pub const fn pd(&self) -> bool {
        self.contains(Self::PD)
    }

    pub const fn with_pd(self, pd: bool) -> Self {
        let reg = self.difference(Self::PD);
        if pd {
            reg.union(Self::PD)
        } else {
            reg
        }
    }

    pub const fn srb2(&self) -> bool {
        self.contains(Self::SRB2)
    }

    pub const fn with_srb2(self, srb2: bool) -> Self {
        let reg = self.difference(Self::SRB2);
        if srb2 {
            reg.union(Self::SRB2)
        } else {
            reg
        }
    }

    pub const fn gain(&self) -> Result<Gain, RegisterError> {
        Gain::from_code(self.intersection(Self::GAIN).bits() >> 4)
    }

    pub const fn with_gain(self, gain: Gain) -> Self {
        self.difference(Self::GAIN)
            .union(Self::from_bits_retain(gain.code() << 4))
    }

    pub const fn mux(&self) -> Result<Mux, RegisterError> {
        Mux::from_code(self.intersection(Self::MUX).bits())
    }

    pub const fn with_mux(self, mux: Mux) -> Self {
        self.difference(Self::MUX)
            .union(Self::from_bits_retain(mux.code()))
    }
}

bitflags! {
    /// BIAS_SENSP
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct BiasSensP: u8 {
        const BIASP8 = 0b1000_0000;
        const BIASP7 = 0b0100_0000;
        const BIASP6 = 0b0010_0000;
        const BIASP5 = 0b0001_0000;
        const BIASP4 = 0b0000_1000;
        const BIASP3 = 0b0000_0100;
        const BIASP2 = 0b0000_0010;
        const BIASP1 = 0b0000_0001;
    }
}

impl BiasSensP {
    /// Mask for a zero-based channel index.
    pub const fn channel(ch: usize) -> Self {
        Self::from_bits_retain(1 << ch)
    }
}

bitflags! {
    /// BIAS_SENSN
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct BiasSensN: u8 {
        const BIASN8 = 0b1000_0000;
        const BIASN7 = 0b0100_0000;
        const BIASN6 = 0b0010_0000;
        const BIASN5 = 0b0001_0000;
        const BIASN4 = 0b0000_1000;
        const BIASN3 = 0b0000_0100;
        const BIASN2 = 0b0000_0010;
        const BIASN1 = 0b0000_0001;
    }
}

impl BiasSensN {
    pub const fn channel(ch: usize) -> Self {
        Self::from_bits_retain(1 << ch)
    }
}

bitflags! {
    /// LOFF_SENSP
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LoffSensP: u8 {
        const LOFFP8 = 0b1000_0000;
        const LOFFP7 = 0b0100_0000;
        const LOFFP6 = 0b0010_0000;
        const LOFFP5 = 0b0001_0000;
        const LOFFP4 = 0b0000_1000;
        const LOFFP3 = 0b0000_0100;
        const LOFFP2 = 0b0000_0010;
        const LOFFP1 = 0b0000_0001;
    }
}

impl LoffSensP {
    pub const fn channel(ch: usize) -> Self {
        Self::from_bits_retain(1 << ch)
    }
}

bitflags! {
    /// LOFF_SENSN
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LoffSensN: u8 {
        const LOFFN8 = 0b1000_0000;
        const LOFFN7 = 0b0100_0000;
        const LOFFN6 = 0b0010_0000;
        const LOFFN5 = 0b0001_0000;
        const LOFFN4 = 0b0000_1000;
        const LOFFN3 = 0b0000_0100;
        const LOFFN2 = 0b0000_0010;
        const LOFFN1 = 0b0000_0001;
    }
}

impl LoffSensN {
    pub const fn channel(ch: usize) -> Self {
        Self::from_bits_retain(1 << ch)
    }
}

bitflags! {
    /// GPIO. Upper nibble is pin data, lower nibble is pin direction
    /// (1 = input).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Gpio: u8 {
        const GPIOD4 = 0b1000_0000;
        const GPIOD3 = 0b0100_0000;
        const GPIOD2 = 0b0010_0000;
        const GPIOD1 = 0b0001_0000;
        const GPIOC4 = 0b0000_1000;
        const GPIOC3 = 0b0000_0100;
        const GPIOC2 = 0b0000_0010;
        const GPIOC1 = 0b0000_0001;

        const GPIOD = Self::GPIOD4.bits() | Self::GPIOD3.bits() | Self::GPIOD2.bits() | Self::GPIOD1.bits();
        const GPIOC = Self::GPIOC4.bits() | Self::GPIOC3.bits() | Self::GPIOC2.bits() | Self::GPIOC1.bits();
    }
}

impl Default for Gpio {
    fn default() -> Self {
        Self::from_bits_retain(0x0F)
    }
}

bitflags! {
    /// MISC1
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Misc1: u8 {
        const SRB1 = 0b0010_0000;
    }
}

impl Default for Misc1 {
    fn default() -> Self {
        Self::from_bits_retain(0x00)
    }
}

impl Misc1 {
    pub const fn srb1(&self) -> bool {
        self.contains(Self::SRB1)
    }

    pub const fn with_srb1(self, srb1: bool) -> Self {
        let reg = self.difference(Self::SRB1);
        if srb1 {
            reg.union(Self::SRB1)
        } else {
            reg
        }
    }
}
