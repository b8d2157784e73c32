//! Bounding boxes and their atomic-friendly integer encoding.
//!
//! `Aabb` is the decoded, float-valued box consumers work with. `AabbBits` is
//! the 32-byte record the kernel narrows with integer atomics; every component
//! is stored through the order-preserving map in `encoding`.

mod aabb;
mod bits;
mod encoding;

pub use aabb::Aabb;
pub use bits::AabbBits;
pub use encoding::{float_to_ordered_bits, ordered_bits_to_float};
