//! Baud/parity selectors and engine configuration.

use crate::error::ConfigError;

/// Supported baud rates, indexed exactly as the wire configuration API
/// expects.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaudRate {
    B4800,
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B230400,
}

impl BaudRate {
    pub fn from_index(index: u8) -> Result<Self, ConfigError> {
        Ok(match index {
            0 => Self::B4800,
            1 => Self::B9600,
            2 => Self::B19200,
            3 => Self::B38400,
            4 => Self::B57600,
            5 => Self::B115200,
            6 => Self::B230400,
            _ => return Err(ConfigError::InvalidBaudIndex(index)),
        })
    }

    pub fn index(self) -> u8 {
        match self {
            Self::B4800 => 0,
            Self::B9600 => 1,
            Self::B19200 => 2,
            Self::B38400 => 3,
            Self::B57600 => 4,
            Self::B115200 => 5,
            Self::B230400 => 6,
        }
    }

    pub fn bps(self) -> u32 {
        match self {
            Self::B4800 => 4800,
            Self::B9600 => 9600,
            Self::B19200 => 19200,
            Self::B38400 => 38400,
            Self::B57600 => 57600,
            Self::B115200 => 115200,
            Self::B230400 => 230400,
        }
    }

    /// Receiver/inter-character timeout, in bit-times, that the serial
    /// driver should be configured with for this baud rate (>= 3.5
    /// character-times).
    pub fn receiver_timeout_bit_times(self) -> u16 {
        match self {
            Self::B4800 | Self::B9600 | Self::B19200 => 39,
            Self::B38400 => 67,
            Self::B57600 => 101,
            Self::B115200 => 202,
            Self::B230400 => 403,
        }
    }
}

/// Parity selector. Even and odd parity add a ninth data bit on the wire.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    pub fn from_index(index: u8) -> Result<Self, ConfigError> {
        Ok(match index {
            0 => Self::None,
            1 => Self::Even,
            2 => Self::Odd,
            _ => return Err(ConfigError::InvalidParityIndex(index)),
        })
    }

    pub fn index(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Even => 1,
            Self::Odd => 2,
        }
    }

    pub fn data_bits(self) -> u8 {
        match self {
            Self::None => 8,
            Self::Even | Self::Odd => 9,
        }
    }
}

/// Lowest and highest valid addressed slave id; `0` is reserved for
/// broadcast reception and is not a configurable own-address.
pub const MIN_SLAVE_ID: u8 = 1;
pub const MAX_SLAVE_ID: u8 = 247;

/// Communication parameters for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub slave_id: u8,
    pub baud: BaudRate,
    pub parity: Parity,
}

impl EngineConfig {
    pub fn new(slave_id: u8, baud: BaudRate, parity: Parity) -> Result<Self, ConfigError> {
        if !(MIN_SLAVE_ID..=MAX_SLAVE_ID).contains(&slave_id) {
            return Err(ConfigError::InvalidSlaveId(slave_id));
        }
        Ok(Self {
            slave_id,
            baud,
            parity,
        })
    }
}
