//! Request dispatcher: turns an already-framed, already-addressed request
//! into a response, or into silence.
//!
//! This is pure logic over the shared buffer plus the registry and hooks —
//! it never touches the transport. The supervisor (`engine.rs`) is the only
//! caller, and is the only thing that knows about DMA/ISR-driven reception.

use crate::config::EngineConfig;
use crate::error::ExceptionCode;
use crate::frame::{append_crc, write_exception};
use crate::handlers;
use crate::hooks::Hooks;
use crate::registry::Registry;
use crate::response::ResponseDescriptor;

/// Result of processing one request.
pub struct ProcessOutcome {
    /// Total length, including CRC, of the frame now sitting in the buffer.
    /// Meaningless when `send_reply` is `false`.
    pub total_len: usize,
    /// Whether the supervisor should hand the buffer to the transport.
    pub send_reply: bool,
}

/// Dispatches on `buf[1]` (the function code) and writes a response (or
/// exception) back into `buf` in place.
///
/// `buf[0]` on entry holds the request's slave id, which the caller has
/// already confirmed is either this engine's own id or the broadcast id
/// `0`; `send_reply` therefore defaults to "this was not a broadcast",
/// and an individual handler may override it (the 0x03 quirk, and the
/// default custom-command rejection, both always reply).
pub fn process_request<const N: usize>(
    buf: &mut [u8],
    request_len: usize,
    config: &EngineConfig,
    registry: &mut Registry<'_, N>,
    hooks: &mut impl Hooks,
) -> ProcessOutcome {
    let broadcast = buf[0] == 0;
    let function = buf[1];

    let mut descriptor = match function {
        0x03 => handlers::read_holding_registers(buf, registry, hooks),
        0x04 => handlers::read_input_registers(buf, registry, hooks),
        0x06 => handlers::write_single_register(buf, registry, hooks),
        0x10 => handlers::write_multiple_registers(buf, request_len, registry, hooks),
        _ => {
            let mut descriptor = ResponseDescriptor::ok(0);
            hooks.custom_command(buf, request_len, &mut descriptor);
            descriptor
        }
    };

    let send_reply = descriptor
        .send_reply_override
        .take()
        .unwrap_or(!broadcast);

    if !send_reply {
        return ProcessOutcome {
            total_len: 0,
            send_reply: false,
        };
    }

    let total_len = match descriptor.exception {
        Some(exception) => write_exception(buf, config.slave_id, function, exception),
        None => append_crc(buf, descriptor.payload_size as usize),
    };

    ProcessOutcome {
        total_len,
        send_reply: true,
    }
}

/// Standard reject for a request addressed to neither this engine nor the
/// broadcast id; the supervisor filters these out before `process_request`
/// is ever called, but the exception code is exposed here for symmetry with
/// the rest of the error taxonomy.
pub const WRONG_ADDRESS: ExceptionCode = ExceptionCode::IllegalDataAddress;
