//! Built-in function handlers.
//!
//! Each handler reads its request out of the shared buffer, consults the
//! registry, and writes its response payload back into the same buffer in
//! place; the caller (the processor) appends the CRC afterwards. This
//! mirrors `modbus_handler.rs::handle_read_holding_registers` et al. in the
//! teacher crate, generalized from a single hard-coded register map to the
//! registry.

use crate::error::ExceptionCode;
use crate::frame::{read_u16, write_u16};
use crate::hooks::Hooks;
use crate::registry::{RegisterType, Registry};
use crate::response::ResponseDescriptor;

/// Largest register count the 256-byte buffer and the Modbus standard both
/// allow for a single read or write.
pub const MAX_REGISTERS: usize = 125;

/// 0x03 Read Holding Registers.
pub fn read_holding_registers<const N: usize>(
    buf: &mut [u8],
    registry: &Registry<'_, N>,
    hooks: &mut impl Hooks,
) -> ResponseDescriptor {
    read_registers(buf, registry, hooks, RegisterType::Holding)
}

/// 0x04 Read Input Registers.
pub fn read_input_registers<const N: usize>(
    buf: &mut [u8],
    registry: &Registry<'_, N>,
    hooks: &mut impl Hooks,
) -> ResponseDescriptor {
    read_registers(buf, registry, hooks, RegisterType::Input)
}

fn read_registers<const N: usize>(
    buf: &mut [u8],
    registry: &Registry<'_, N>,
    hooks: &mut impl Hooks,
    register_type: RegisterType,
) -> ResponseDescriptor {
    let start = read_u16(buf, 2);
    let count = read_u16(buf, 4);

    if count == 0 || count as usize > MAX_REGISTERS {
        return ResponseDescriptor::exception(ExceptionCode::IllegalDataValue);
    }

    let Some(space) = registry.find(register_type, start, count) else {
        return ResponseDescriptor::exception(ExceptionCode::IllegalDataAddress);
    };

    buf[2] = (count * 2) as u8;
    for i in 0..count {
        let address = start + i;
        let value = space.backing()[(address - space.start_offset()) as usize];
        hooks.register_read(address, value);
        write_u16(buf, 3 + i as usize * 2, value);
    }

    let mut response = ResponseDescriptor::ok(3 + (count * 2) as u8);

    // 0x03 with start=0, count=4 always replies, even to a broadcast
    // request.
    if register_type == RegisterType::Holding && start == 0 && count == 4 {
        response.send_reply_override = Some(true);
    }

    response
}

/// 0x06 Write Single Register.
pub fn write_single_register<const N: usize>(
    buf: &mut [u8],
    registry: &mut Registry<'_, N>,
    hooks: &mut impl Hooks,
) -> ResponseDescriptor {
    let start = read_u16(buf, 2);
    let value = read_u16(buf, 4);

    let Some(space) = registry.find_mut(RegisterType::Holding, start, 1) else {
        return ResponseDescriptor::exception(ExceptionCode::IllegalDataAddress);
    };

    if hooks.check_restrictions(start, value) {
        return ResponseDescriptor::exception(ExceptionCode::IllegalDataValue);
    }

    let offset = space.start_offset();
    space.backing_mut()[(start - offset) as usize] = value;
    hooks.register_update(start, value);

    // Request and response share the same layout here; buf[0..6] already
    // holds slave/func/start/value, nothing left to write.
    ResponseDescriptor::ok(6)
}

/// 0x10 Write Multiple Registers.
///
/// Stages every word through the restrictions hook before committing any of
/// them, so a rejection partway through leaves the backing store untouched
/// not replicated from the source firmware, which committed a
/// zero-initialized temporary buffer regardless of a rejection partway
/// through).
pub fn write_multiple_registers<const N: usize>(
    buf: &mut [u8],
    request_len: usize,
    registry: &mut Registry<'_, N>,
    hooks: &mut impl Hooks,
) -> ResponseDescriptor {
    let start = read_u16(buf, 2);
    let count = read_u16(buf, 4);
    let byte_count = buf[6] as usize;

    let count_usize = count as usize;
    if count == 0
        || count_usize > MAX_REGISTERS
        || byte_count != count_usize * 2
        || byte_count != request_len.saturating_sub(9)
    {
        return ResponseDescriptor::exception(ExceptionCode::IllegalDataValue);
    }

    let Some(space) = registry.find_mut(RegisterType::Holding, start, count) else {
        return ResponseDescriptor::exception(ExceptionCode::IllegalDataAddress);
    };

    let mut staged = [0u16; MAX_REGISTERS];
    for i in 0..count_usize {
        let value = read_u16(buf, 7 + i * 2);
        let address = start + i as u16;
        if hooks.check_restrictions(address, value) {
            return ResponseDescriptor::exception(ExceptionCode::IllegalDataValue);
        }
        staged[i] = value;
    }

    let base = (start - space.start_offset()) as usize;
    for (i, value) in staged.iter().take(count_usize).enumerate() {
        space.backing_mut()[base + i] = *value;
        hooks.register_update(start + i as u16, *value);
    }

    // Response payload is the first six request bytes (slave, func, start,
    // count), already in place.
    ResponseDescriptor::ok(6)
}
