use bytemuck::{Pod, Zeroable};

use super::{float_to_ordered_bits, ordered_bits_to_float, Aabb};
use crate::math::Vec3;

/// Encoded AABB record, laid out exactly like the kernel's result buffer.
///
/// ```text
/// offset  0: min_bits  [u32; 3]
/// offset 12: pad
/// offset 16: max_bits  [u32; 3]
/// offset 28: pad
/// ```
///
/// The kernel never initializes this record. It must hold [`AabbBits::SEEDED`]
/// before a dispatch that should produce a fresh box; otherwise the previous
/// extrema carry over.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct AabbBits {
    pub min_bits: [u32; 3],
    pub _pad0: u32,
    pub max_bits: [u32; 3],
    pub _pad1: u32,
}

impl AabbBits {
    /// Encoded `+inf` in every min slot and `-inf` in every max slot.
    pub const SEEDED: AabbBits = AabbBits {
        min_bits: [float_to_ordered_bits(f32::INFINITY); 3],
        _pad0: 0,
        max_bits: [float_to_ordered_bits(f32::NEG_INFINITY); 3],
        _pad1: 0,
    };

    /// Size of the record in bytes.
    pub const SIZE: u64 = core::mem::size_of::<AabbBits>() as u64;

    /// Encodes a float box.
    pub fn encode(aabb: &Aabb) -> Self {
        Self {
            min_bits: aabb.min.to_array().map(float_to_ordered_bits),
            _pad0: 0,
            max_bits: aabb.max.to_array().map(float_to_ordered_bits),
            _pad1: 0,
        }
    }

    /// Decodes into float bounds. A record nothing was merged into decodes to [`Aabb::EMPTY`].
    pub fn decode(&self) -> Aabb {
        Aabb::new(
            Vec3::from_array(self.min_bits.map(ordered_bits_to_float)),
            Vec3::from_array(self.max_bits.map(ordered_bits_to_float)),
        )
    }

    #[inline]
    pub fn is_seeded(&self) -> bool {
        *self == Self::SEEDED
    }
}

impl Default for AabbBits {
    fn default() -> Self {
        Self::SEEDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_32_bytes_with_max_at_16() {
        assert_eq!(AabbBits::SIZE, 32);
        let bits = AabbBits {
            min_bits: [1, 2, 3],
            _pad0: 0,
            max_bits: [4, 5, 6],
            _pad1: 0,
        };
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&bits));
        assert_eq!(words, &[1, 2, 3, 0, 4, 5, 6, 0]);
    }

    #[test]
    fn seeded_decodes_to_empty() {
        assert_eq!(AabbBits::SEEDED.decode(), Aabb::EMPTY);
        assert!(AabbBits::default().is_seeded());
    }

    #[test]
    fn encode_decode_round_trip() {
        let b = Aabb::new(Vec3::new(-1.0, -0.0, 2.5), Vec3::new(3.0, 0.0, 1.0e9));
        assert_eq!(AabbBits::encode(&b).decode(), b);
    }
}
