//! Error taxonomy for the engine.
//!
//! Wire-level failures (`ExceptionCode`) end up in a Modbus exception reply;
//! everything else is a local API misuse that the caller can react to
//! directly and never reaches the wire.

/// Standard Modbus exception codes. The built-in handlers only ever emit
/// [`IllegalFunction`](ExceptionCode::IllegalFunction),
/// [`IllegalDataAddress`](ExceptionCode::IllegalDataAddress) and
/// [`IllegalDataValue`](ExceptionCode::IllegalDataValue); the rest exist so a
/// custom function hook can use the full standard set.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExceptionCode {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    ServerDeviceFailure = 0x04,
    Acknowledge = 0x05,
    ServerDeviceBusy = 0x06,
    NegativeAcknowledge = 0x07,
    MemoryParityError = 0x08,
}

/// Errors from the address-space registry.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// `add` was called with the registry already at capacity.
    TooManySpaces,
    /// `remove_by_backing` found no entry with a matching backing pointer.
    NotFound,
    /// The descriptor itself violates the data-model invariants (empty or
    /// out-of-range backing store).
    InvalidAddressSpace(&'static str),
}

/// Errors from `set_communication_parameters` and friends.
///
/// Returned instead of silently leaving the previous setting in place;
/// callers that want the old, permissive behavior can simply ignore the
/// `Err` and keep using the engine's current configuration.
#[cfg_attr(not(test), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaudIndex(u8),
    InvalidParityIndex(u8),
    InvalidSlaveId(u8),
}
