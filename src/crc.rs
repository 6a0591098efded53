//! Modbus RTU CRC-16.
//!
//! Initial value `0xFFFF`, polynomial `0xA001` (the bit-reflected form of the
//! generator polynomial `0x8005`), computed byte-wise over the frame with the
//! low byte transmitted first. This is exactly the `MODBUS` preset of the
//! `crc16` crate, already part of this crate's dependency stack.

/// Computes the Modbus CRC-16 of `data`.
///
/// Pure function: same input always yields the same output, no state is
/// kept between calls.
pub fn crc16(data: &[u8]) -> u16 {
    crc16::State::<crc16::MODBUS>::calculate(data)
}
