//! Order-preserving `f32` <-> `u32` map.
//!
//! For any non-NaN `a < b`, `float_to_ordered_bits(a) < float_to_ordered_bits(b)`
//! as unsigned integers, so unsigned atomic min/max on the encoded values act as
//! float min/max on the originals. Non-negative floats land in the upper half
//! (sign bit set), negatives are complemented into the lower half with their
//! order reversed. `-0.0` encodes one below `+0.0`. NaN has no meaningful
//! position.

const SIGN_BIT: u32 = 0x8000_0000;

/// Encodes `value` so that unsigned integer order matches float order.
#[inline]
pub const fn float_to_ordered_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & SIGN_BIT != 0 { !bits } else { bits | SIGN_BIT }
}

/// Inverse of [`float_to_ordered_bits`].
#[inline]
pub const fn ordered_bits_to_float(encoded: u32) -> f32 {
    let bits = if encoded & SIGN_BIT != 0 { encoded & !SIGN_BIT } else { !encoded };
    f32::from_bits(bits)
}
