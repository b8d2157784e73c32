use crate::math::Vec3;

/// Group-local scratch: one min and one max candidate slot per lane.
///
/// Lives for one group's execution and is reused by the next group a worker
/// picks up. Lanes execute in lock-step: [`GroupScratch::store`] is called for
/// every lane before [`GroupScratch::reduce`], and each reduction round finishes
/// for all lanes before the next starts. Those round edges are the barriers.
#[derive(Debug, Clone)]
pub struct GroupScratch {
    min: Vec<Vec3>,
    max: Vec<Vec3>,
}

impl GroupScratch {
    /// Identity of the min reduction.
    pub const MIN_IDENTITY: Vec3 = Vec3::splat(f32::INFINITY);
    /// Identity of the max reduction.
    pub const MAX_IDENTITY: Vec3 = Vec3::splat(f32::NEG_INFINITY);

    /// `group_size` must be a power of two.
    pub fn new(group_size: u32) -> Self {
        debug_assert!(group_size.is_power_of_two(), "group size must be a power of two");
        let n = group_size as usize;
        Self {
            min: vec![Self::MIN_IDENTITY; n],
            max: vec![Self::MAX_IDENTITY; n],
        }
    }

    #[inline]
    pub fn group_size(&self) -> usize {
        self.min.len()
    }

    /// Seeds `lane`'s own slots. Lanes without a vertex (`None`, the tail of
    /// the last group) store the reduction identities and still take part in
    /// every round.
    #[inline]
    pub fn store(&mut self, lane: usize, position: Option<Vec3>) {
        let (lo, hi) = match position {
            Some(p) => (p, p),
            None => (Self::MIN_IDENTITY, Self::MAX_IDENTITY),
        };
        self.min[lane] = lo;
        self.max[lane] = hi;
    }

    /// Pairwise tree reduction over `log2(group_size)` rounds; returns lane 0's
    /// `(min, max)`.
    ///
    /// In the round with stride `s`, lane `i < s` folds slot `i + s` into slot
    /// `i`. Slots `>= s` are only read during that round, so no lane reads a
    /// slot another lane writes in the same round.
    pub fn reduce(&mut self) -> (Vec3, Vec3) {
        let mut stride = self.group_size() >> 1;
        while stride > 0 {
            let (min_lo, min_hi) = self.min.split_at_mut(stride);
            let (max_lo, max_hi) = self.max.split_at_mut(stride);
            for lane in 0..stride {
                min_lo[lane] = min_lo[lane].min(min_hi[lane]);
                max_lo[lane] = max_lo[lane].max(max_hi[lane]);
            }
            stride >>= 1;
        }
        (self.min[0], self.max[0])
    }
}
