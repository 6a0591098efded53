//! Injectable capability hooks.
//!
//! The original C firmware bound these as `__weak` linker symbols that a
//! board-support module could override. This crate exposes the same
//! capability set — `check_restrictions`, `register_update`,
//! `register_read`, `start_sending`, `end_sending`, `custom_command` — as
//! one trait with the same defaults the weak symbols had (accept all writes,
//! no notifications, reject unknown function codes).

use crate::response::ResponseDescriptor;
use crate::ExceptionCode;

/// Application-supplied collaborator for register writes, RS-485 direction
/// control, and custom function codes.
///
/// Implement only the methods you need; the defaults reproduce the source
/// firmware's weak-symbol behavior.
pub trait Hooks {
    /// Called before a holding register write is committed. Returning
    /// `true` rejects the write with exception `0x03` (illegal data value).
    fn check_restrictions(&mut self, _address: u16, _value: u16) -> bool {
        false
    }

    /// Notification after a holding register write has been committed.
    fn register_update(&mut self, _address: u16, _value: u16) {}

    /// Notification that `value` was read from `address`. This is a
    /// read **notification**, not a read override: the backing array is
    /// always authoritative for what gets sent on the wire.
    fn register_read(&mut self, _address: u16, _value: u16) {}

    /// Called immediately before a response frame is handed to the
    /// transport for transmission (RS-485 driver-enable assert).
    fn start_sending(&mut self) {}

    /// Called once transmission has completed (RS-485 driver-enable
    /// de-assert), before reception is re-armed.
    fn end_sending(&mut self) {}

    /// Handles any function code not in `{0x03, 0x04, 0x06, 0x10}`.
    ///
    /// `buf` is the shared receive/transmit buffer, the same one every
    /// built-in handler in `handlers.rs` writes its response into; `buf[..request_len]`
    /// holds the request as received, slave/function bytes through the
    /// trailing CRC. An override that wants to reply writes its payload into
    /// `buf` starting at `buf[0]` (echoing slave/function as needed) and sets
    /// `response.payload_size` to the number of bytes written, excluding the
    /// CRC the dispatcher appends afterwards. The default rejects with
    /// illegal function and always replies (even to what looked like a
    /// broadcast), matching the source firmware's default custom-command
    /// callback.
    fn custom_command(&mut self, _buf: &mut [u8], _request_len: usize, response: &mut ResponseDescriptor) {
        response.exception = Some(ExceptionCode::IllegalFunction);
        response.send_reply_override = Some(true);
    }
}

/// A `Hooks` implementation that accepts every write and rejects every
/// custom function code — the engine's built-in behavior with nothing
/// plugged in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}
