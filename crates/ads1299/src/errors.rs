use core;

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<SpiE> {
    Spi(SpiE),
    Register(RegisterError),
}

impl<E: core::fmt::Display> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Spi(err) => {
                write!(f, "SPI communication error: {}", err)
            }
            Error::Register(err) => {
                write!(f, "register error: {}", err)
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    InvalidSampleRate(u8),
    InvalidGain(u8),
    InvalidMux(u8),
    InvalidChannelCount(u8),
    NotDetected,
}

impl core::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegisterError::InvalidSampleRate(value) => {
                write!(f, "invalid sample rate code: {}", value)
            }
            RegisterError::InvalidGain(value) => {
                write!(f, "invalid gain code: {}", value)
            }
            RegisterError::InvalidMux(value) => {
                write!(f, "invalid input mux code: {}", value)
            }
            RegisterError::InvalidChannelCount(value) => {
                write!(f, "invalid channel count bits: {}", value)
            }
            RegisterError::NotDetected => {
                write!(f, "device not detected")
            }
        }
    }
}

impl<SpiE> From<RegisterError> for Error<SpiE> {
    fn from(e: RegisterError) -> Self {
        Error::Register(e)
    }
}
