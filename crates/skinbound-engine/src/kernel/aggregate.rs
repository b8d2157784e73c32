use std::sync::atomic::{AtomicU32, Ordering};

use crate::bounds::{float_to_ordered_bits, AabbBits};
use crate::math::Vec3;

/// Host-side counterpart of the kernel's result buffer.
///
/// Six independent atomics: three encoded min components, three encoded max
/// components. [`AtomicAabb::merge`] is the only path that touches them during
/// a dispatch, and it only ever narrows (min can only drop, max can only rise),
/// so the final value is independent of the order groups arrive in.
#[derive(Debug)]
pub struct AtomicAabb {
    min_bits: [AtomicU32; 3],
    max_bits: [AtomicU32; 3],
}

impl AtomicAabb {
    /// A record holding [`AabbBits::SEEDED`].
    pub fn seeded() -> Self {
        Self::from_bits(AabbBits::SEEDED)
    }

    pub fn from_bits(bits: AabbBits) -> Self {
        Self {
            min_bits: bits.min_bits.map(AtomicU32::new),
            max_bits: bits.max_bits.map(AtomicU32::new),
        }
    }

    /// Resets to [`AabbBits::SEEDED`]. Must not race with a dispatch.
    pub fn reseed(&self) {
        let seed = AabbBits::SEEDED;
        for (slot, v) in self.min_bits.iter().zip(seed.min_bits) {
            slot.store(v, Ordering::Relaxed);
        }
        for (slot, v) in self.max_bits.iter().zip(seed.max_bits) {
            slot.store(v, Ordering::Relaxed);
        }
    }

    /// Folds one group's corners in: encoded atomic min per min component,
    /// encoded atomic max per max component.
    ///
    /// Relaxed ordering suffices: each slot is its own min/max lattice and the
    /// dispatch's thread joins publish the final values.
    #[inline]
    pub fn merge(&self, min: Vec3, max: Vec3) {
        for (slot, v) in self.min_bits.iter().zip(min.to_array()) {
            slot.fetch_min(float_to_ordered_bits(v), Ordering::Relaxed);
        }
        for (slot, v) in self.max_bits.iter().zip(max.to_array()) {
            slot.fetch_max(float_to_ordered_bits(v), Ordering::Relaxed);
        }
    }

    /// Current encoded contents.
    pub fn snapshot(&self) -> AabbBits {
        AabbBits {
            min_bits: self.min_bits.each_ref().map(|a| a.load(Ordering::Relaxed)),
            _pad0: 0,
            max_bits: self.max_bits.each_ref().map(|a| a.load(Ordering::Relaxed)),
            _pad1: 0,
        }
    }
}

impl Default for AtomicAabb {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn random_boxes(rng: &mut StdRng, n: usize) -> Vec<(Vec3, Vec3)> {
        (0..n)
            .map(|_| {
                let a = Vec3::new(
                    rng.random_range(-1.0e4..1.0e4),
                    rng.random_range(-1.0e4..1.0e4),
                    rng.random_range(-1.0e4..1.0e4),
                );
                (a, a + Vec3::splat(rng.random_range(0.0..10.0)))
            })
            .collect()
    }

    #[test]
    fn fresh_record_is_seeded() {
        assert!(AtomicAabb::seeded().snapshot().is_seeded());
    }

    #[test]
    fn merge_never_widens_past_inputs() {
        let acc = AtomicAabb::seeded();
        acc.merge(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, 4.0));
        acc.merge(Vec3::new(0.0, -5.0, 3.0), Vec3::new(0.5, 1.0, 9.0));
        let b = acc.snapshot().decode();
        assert_eq!(b.min, Vec3::new(-1.0, -5.0, 2.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 9.0));
    }

    #[test]
    fn merge_order_does_not_matter() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut boxes = random_boxes(&mut rng, 200);
        let expected = boxes
            .iter()
            .fold(Aabb::EMPTY, |acc, &(lo, hi)| acc + Aabb::new(lo, hi));

        for _ in 0..8 {
            boxes.shuffle(&mut rng);
            let acc = AtomicAabb::seeded();
            for &(lo, hi) in &boxes {
                acc.merge(lo, hi);
            }
            assert_eq!(acc.snapshot(), AabbBits::encode(&expected));
        }
    }

    #[test]
    fn concurrent_merges_converge() {
        let mut rng = StdRng::seed_from_u64(7);
        let boxes = random_boxes(&mut rng, 4096);
        let expected = boxes
            .iter()
            .fold(Aabb::EMPTY, |acc, &(lo, hi)| acc + Aabb::new(lo, hi));

        let acc = AtomicAabb::seeded();
        std::thread::scope(|s| {
            for chunk in boxes.chunks(512) {
                let acc = &acc;
                s.spawn(move || {
                    for &(lo, hi) in chunk {
                        acc.merge(lo, hi);
                    }
                });
            }
        });
        assert_eq!(acc.snapshot().decode(), expected);
    }

    #[test]
    fn reseed_discards_previous_extrema() {
        let acc = AtomicAabb::seeded();
        acc.merge(Vec3::splat(-1.0), Vec3::splat(1.0));
        acc.reseed();
        assert!(acc.snapshot().is_seeded());
    }
}
