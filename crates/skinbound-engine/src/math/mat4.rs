use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::{Vec3, Vec4};

/// 4x4 matrix, column-major.
///
/// `cols[c][r]` is row `r` of column `c`, which matches the memory layout of a
/// WGSL `mat4x4<f32>`, so a `&[Mat4]` can be uploaded with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4::from_cols(
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    );

    #[inline]
    pub const fn from_cols(c0: [f32; 4], c1: [f32; 4], c2: [f32; 4], c3: [f32; 4]) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    /// Builds a matrix from row-major data (the layout most asset formats use).
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                cols[c][r] = *v;
            }
        }
        Self { cols }
    }

    #[inline]
    pub const fn translation(t: Vec3) -> Self {
        Self::from_cols(
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [t.x, t.y, t.z, 1.0],
        )
    }

    #[inline]
    pub const fn scale(s: Vec3) -> Self {
        Self::from_cols(
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Rotation about +X by `angle` radians.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Rotation about +Z by `angle` radians.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    #[inline]
    pub fn col(&self, c: usize) -> Vec4 {
        Vec4::from_array(self.cols[c])
    }

    /// Transforms a point (`w = 1`) and applies the homogeneous divide.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).project()
    }

    pub fn transpose(&self) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = self.cols[r][c];
            }
        }
        Self { cols }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.col(0) * v.x + self.col(1) * v.y + self.col(2) * v.z + self.col(3) * v.w
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let c = |i: usize| (self * rhs.col(i)).to_array();
        Mat4::from_cols(c(0), c(1), c(2), c(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec3::new(1.5, -2.0, 3.25);
        assert_eq!(Mat4::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn translation_moves_points_not_directions() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m * Vec4::new(0.0, 0.0, 0.0, 1.0), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(m * Vec4::new(1.0, 0.0, 0.0, 0.0), Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn product_applies_right_operand_first() {
        let t = Mat4::translation(Vec3::new(10.0, 0.0, 0.0));
        let s = Mat4::scale(Vec3::splat(2.0));
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!((t * s).transform_point(p), Vec3::new(12.0, 2.0, 2.0));
        assert_eq!((s * t).transform_point(p), Vec3::new(22.0, 2.0, 2.0));
    }

    #[test]
    fn from_rows_is_transpose_of_columns() {
        let rows = [
            [1.0, 0.0, 0.0, 5.0],
            [0.0, 1.0, 0.0, 6.0],
            [0.0, 0.0, 1.0, 7.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let m = Mat4::from_rows(rows);
        assert_eq!(m, Mat4::translation(Vec3::new(5.0, 6.0, 7.0)));
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn projective_row_is_divided_out() {
        // w' = 2 for every point: halves the result.
        let mut m = Mat4::IDENTITY;
        m.cols[3][3] = 2.0;
        assert_eq!(m.transform_point(Vec3::new(2.0, 4.0, 6.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn quarter_turn_about_z() {
        let p = Mat4::rotation_z(core::f32::consts::FRAC_PI_2).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((p.x).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }
}
