//! Vector and matrix types shared by the skinning evaluator, the bounds types
//! and the GPU uploads.
//!
//! Conventions:
//! - right-handed world space, no implied units
//! - `Mat4` is column-major and byte-compatible with WGSL `mat4x4<f32>`
//! - points are promoted with `w = 1` and projected back with a homogeneous divide

mod mat4;
mod vec3;
mod vec4;

pub use mat4::Mat4;
pub use vec3::Vec3;
pub use vec4::Vec4;
