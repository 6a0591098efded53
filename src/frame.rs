//! RTU frame layout and CRC framing.
//!
//! Request: `[slave:1][func:1][payload:N][crc_lo:1][crc_hi:1]`. Response
//! mirrors it; exception replies are `[slave:1][func|0x80:1][exception:1][crc_lo:1][crc_hi:1]`.
//! 16-bit fields on the wire are big-endian; the CRC itself is transmitted
//! little-endian.

use crate::crc::crc16;
use crate::error::ExceptionCode;

/// Size of the shared receive/transmit buffer. The source firmware armed
/// DMA reception for exactly this many bytes (`MODBUS_BUFFER_SIZE`).
pub const BUFFER_SIZE: usize = 256;

/// Shortest frame the supervisor will hand to the processor: slave + func +
/// 4 payload bytes + 2 CRC bytes.
pub const MIN_REQUEST_LEN: usize = 8;

/// Reads a big-endian `u16` at `buf[offset..offset+2]`.
pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

/// Writes `value` big-endian at `buf[offset..offset+2]`.
pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    let bytes = value.to_be_bytes();
    buf[offset] = bytes[0];
    buf[offset + 1] = bytes[1];
}

/// Checks the trailing CRC of a frame of length `len` against the CRC of the
/// bytes preceding it.
pub fn verify_crc(buf: &[u8], len: usize) -> bool {
    if len < 2 {
        return false;
    }
    let received = u16::from_le_bytes([buf[len - 2], buf[len - 1]]);
    received == crc16(&buf[..len - 2])
}

/// Appends the CRC of `buf[..payload_size]` right after it and returns the
/// total frame length (`payload_size + 2`).
pub fn append_crc(buf: &mut [u8], payload_size: usize) -> usize {
    let crc = crc16(&buf[..payload_size]);
    let bytes = crc.to_le_bytes();
    buf[payload_size] = bytes[0];
    buf[payload_size + 1] = bytes[1];
    payload_size + 2
}

/// Writes an exception reply in place and returns its total length (always 5).
///
/// The slave field of an exception reply is always the engine's own
/// configured `slave_id`, never whatever value happened to be in the
/// request's slave byte.
pub fn write_exception(buf: &mut [u8], slave_id: u8, function: u8, exception: ExceptionCode) -> usize {
    buf[0] = slave_id;
    buf[1] = function | 0x80;
    buf[2] = exception as u8;
    append_crc(buf, 3)
}
