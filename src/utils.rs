//! Byte-level helpers for assembly buffers.
//!
//! Both assemblies are little-endian and pack their flags into single bytes,
//! so everything here works on `u8` flag bytes and byte slices addressed by
//! offset. Reads are bounds-checked and return
//! [`VisionError::InvalidFormat`](crate::VisionError::InvalidFormat) instead
//! of panicking.
//!
//! # Example
//!
//! ```
//! use keyence_vision::utils::{get_bit, read_u16_le, read_u32_le};
//!
//! let buffer = [0b1001_0001, 0x00, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
//!
//! assert!(get_bit(buffer[0], 0));
//! assert!(!get_bit(buffer[0], 1));
//! assert_eq!(read_u16_le(&buffer, 2).unwrap(), 0x1234);
//! assert_eq!(read_u32_le(&buffer, 4).unwrap(), 0x1234_5678);
//! ```

use crate::error::{Result, VisionError};

/// Gets a single bit from a flag byte.
///
/// # Example
///
/// ```
/// use keyence_vision::utils::get_bit;
///
/// let value: u8 = 0b0000_0101;
/// assert!(get_bit(value, 0));
/// assert!(!get_bit(value, 1));
/// assert!(get_bit(value, 2));
/// ```
#[inline]
pub fn get_bit(value: u8, bit: u8) -> bool {
    (value & (1 << bit)) != 0
}

/// Sets or clears a single bit in a flag byte.
///
/// # Example
///
/// ```
/// use keyence_vision::utils::set_bit;
///
/// assert_eq!(set_bit(0, 7, true), 0b1000_0000);
/// assert_eq!(set_bit(0xFF, 6, false), 0b1011_1111);
/// ```
#[inline]
pub fn set_bit(value: u8, bit: u8, state: bool) -> u8 {
    if state {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}

/// Reads one bit from the byte at `offset`.
///
/// # Errors
///
/// Returns `VisionError::InvalidFormat` if `offset` is out of bounds.
pub fn read_bit(data: &[u8], offset: usize, bit: u8) -> Result<bool> {
    data.get(offset)
        .map(|&byte| get_bit(byte, bit))
        .ok_or_else(|| out_of_bounds(offset, 1, data.len()))
}

/// Reads a little-endian `u16` starting at `offset`.
///
/// # Errors
///
/// Returns `VisionError::InvalidFormat` if the two bytes are out of bounds.
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| out_of_bounds(offset, 2, data.len()))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Reads a little-endian `u32` starting at `offset`.
///
/// # Errors
///
/// Returns `VisionError::InvalidFormat` if the four bytes are out of bounds.
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| out_of_bounds(offset, 4, data.len()))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Writes a little-endian `u16` at `offset`.
///
/// # Errors
///
/// Returns `VisionError::InvalidFormat` if the target range is out of bounds.
pub fn write_u16_le(data: &mut [u8], offset: usize, value: u16) -> Result<()> {
    let len = data.len();
    data.get_mut(offset..offset + 2)
        .ok_or_else(|| out_of_bounds(offset, 2, len))?
        .copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Writes a little-endian `u32` at `offset`.
///
/// # Errors
///
/// Returns `VisionError::InvalidFormat` if the target range is out of bounds.
pub fn write_u32_le(data: &mut [u8], offset: usize, value: u32) -> Result<()> {
    let len = data.len();
    data.get_mut(offset..offset + 4)
        .ok_or_else(|| out_of_bounds(offset, 4, len))?
        .copy_from_slice(&value.to_le_bytes());
    Ok(())
}

fn out_of_bounds(offset: usize, width: usize, len: usize) -> VisionError {
    VisionError::invalid_format(format!(
        "{} byte(s) at offset {} exceed buffer of {} bytes",
        width, offset, len
    ))
}

/// Formats a flag byte as binary with a nibble separator.
///
/// # Example
///
/// ```
/// use keyence_vision::utils::format_binary;
///
/// assert_eq!(format_binary(0b1001_0001), "0b1001_0001");
/// ```
pub fn format_binary(value: u8) -> String {
    let binary = format!("{:08b}", value);
    format!("0b{}_{}", &binary[0..4], &binary[4..8])
}

/// Formats a buffer as space-separated uppercase hex bytes.
///
/// # Example
///
/// ```
/// use keyence_vision::utils::format_hex;
///
/// assert_eq!(format_hex(&[0x38, 0x00, 0x0A]), "38 00 0A");
/// ```
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
