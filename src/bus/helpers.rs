//! Address-byte decoding and cursor arithmetic shared by the bus engine.
//!
//! Exposed so host-side tooling and tests can build address bytes the
//! same way the engine decodes them.

use crate::bus::BusError;

/// High nibble of the address byte. Any bit set here forces the control page.
pub const CONTROL_MARKER_MASK: u8 = 0xF0;

/// Which page an address byte resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressTarget {
    /// Offset into the control page, selected by the marker.
    Control(u8),
    /// Offset into the sticky page.
    Sticky(u8),
}

/// Splits the first written byte of a transaction into page and offset.
///
/// # Example
/// ```
/// use regbus::bus::helpers::{AddressTarget, split_address};
///
/// // 0xF2 reaches the control page's command byte
/// assert_eq!(split_address(0xF2), AddressTarget::Control(2));
///
/// // Without the marker the byte is an offset into the sticky page
/// assert_eq!(split_address(0x03), AddressTarget::Sticky(3));
/// ```
pub const fn split_address(byte: u8) -> AddressTarget {
    if byte & CONTROL_MARKER_MASK != 0 {
        AddressTarget::Control(byte & !CONTROL_MARKER_MASK)
    } else {
        AddressTarget::Sticky(byte)
    }
}

/// Builds the address byte that reaches `offset` in the control page.
///
/// # Example
/// ```
/// use regbus::bus::helpers::control_address;
///
/// assert_eq!(control_address(0), 0xF0);
/// ```
pub const fn control_address(offset: u8) -> u8 {
    CONTROL_MARKER_MASK | (offset & !CONTROL_MARKER_MASK)
}

/// Advances a cursor by one byte, wrapping to 0 at the end of the page.
pub const fn next_offset(offset: usize, len: usize) -> usize {
    if offset + 1 >= len { 0 } else { offset + 1 }
}

/// Calculates the byte range `[offset, end)` inside a page of `page_len` bytes.
///
/// # Errors
/// * [`BusError::ZeroLength`] - if `len` is 0
/// * [`BusError::OutOfBounds`] - if the range exceeds the page
///
/// # Example
/// ```
/// use regbus::bus::helpers::page_span;
///
/// assert_eq!(page_span(7, 3, 4), Ok((3, 7)));
/// assert!(page_span(7, 4, 4).is_err());
/// ```
pub fn page_span(page_len: usize, offset: usize, len: usize) -> Result<(usize, usize), BusError> {
    if len == 0 {
        return Err(BusError::ZeroLength);
    }

    let end = offset.checked_add(len).ok_or(BusError::OutOfBounds)?;

    if end > page_len {
        return Err(BusError::OutOfBounds);
    }

    Ok((offset, end))
}

#[test]
fn split_address_edge_cases() {
    // Lowest marker bit already selects control
    assert_eq!(split_address(0x10), AddressTarget::Control(0));
    assert_eq!(split_address(0x8F), AddressTarget::Control(0x0F));

    // Largest sticky offset
    assert_eq!(split_address(0x0F), AddressTarget::Sticky(0x0F));
    assert_eq!(split_address(0x00), AddressTarget::Sticky(0));
}

#[test]
fn next_offset_wraps() {
    assert_eq!(next_offset(0, 3), 1);
    assert_eq!(next_offset(2, 3), 0);
    assert_eq!(next_offset(0, 1), 0);
}

#[test]
fn page_span_edge_cases() {
    assert_eq!(page_span(4, 0, 0), Err(BusError::ZeroLength));
    assert_eq!(page_span(4, usize::MAX, 2), Err(BusError::OutOfBounds));
    assert_eq!(page_span(4, 0, 4), Ok((0, 4)));
}
