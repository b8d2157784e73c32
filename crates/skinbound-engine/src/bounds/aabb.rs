use core::ops::{Add, AddAssign};

use crate::math::{Mat4, Vec3};

/// Axis-aligned bounding box in world space.
///
/// The empty box has `min = +inf` and `max = -inf` on every axis, so adding
/// the first point (or taking a union) needs no special case.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Line-list indices into [`Aabb::corners`] for the 12 box edges.
    pub const LINE_INDICES: [u32; 24] = [
        0, 1, 2, 3, 2, 0, 3, 1, //
        4, 5, 6, 7, 4, 6, 7, 5, //
        2, 6, 3, 7, 0, 4, 1, 5,
    ];

    /// Triangle-list indices into [`Aabb::corners`] for the 6 box faces.
    ///
    /// Each face is two triangles split along one shared diagonal; faces are
    /// ordered min x, max x, min y, max y, min z, max z.
    pub const TRIANGLE_INDICES: [u32; 36] = [
        0, 1, 3, 3, 2, 0, //
        4, 5, 7, 7, 6, 4, //
        0, 1, 5, 5, 4, 0, //
        2, 3, 7, 7, 6, 2, //
        0, 2, 6, 6, 4, 0, //
        1, 3, 7, 7, 5, 1,
    ];

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point of `points`. Empty input yields [`Aabb::EMPTY`].
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Aabb::EMPTY;
        for p in points {
            aabb.add_point(p);
        }
        aabb
    }

    #[inline]
    pub fn add_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True when no point has been added (any axis has `min > max`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Closed containment: `[min, max]`.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.z >= self.min.z
            && p.x <= self.max.x
            && p.y <= self.max.y
            && p.z <= self.max.z
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full side lengths.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners; bit 2 of the index selects max x, bit 1 max y, bit 0 max z.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        core::array::from_fn(|i| {
            Vec3::new(
                if i & 4 != 0 { hi.x } else { lo.x },
                if i & 2 != 0 { hi.y } else { lo.y },
                if i & 1 != 0 { hi.z } else { lo.z },
            )
        })
    }

    /// Bounds of this box after `transform` (corners are projected with a homogeneous divide).
    ///
    /// The result encloses the transformed box but is generally looser than the
    /// bounds of the transformed contents.
    pub fn to_space(&self, transform: &Mat4) -> Aabb {
        if self.is_empty() {
            return Aabb::EMPTY;
        }
        Aabb::from_points(self.corners().map(|c| transform.transform_point(c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

impl AddAssign for Aabb {
    /// Union.
    #[inline]
    fn add_assign(&mut self, rhs: Aabb) {
        self.min = self.min.min(rhs.min);
        self.max = self.max.max(rhs.max);
    }
}

impl Add for Aabb {
    type Output = Aabb;
    #[inline]
    fn add(mut self, rhs: Aabb) -> Aabb {
        self += rhs;
        self
    }
}
