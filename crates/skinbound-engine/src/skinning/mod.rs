//! Skinning inputs and the per-vertex evaluator.
//!
//! Everything here is host-side data owned by the caller. The kernels only
//! read it: one thread per vertex, blending up to `max_bone_influences` bone
//! transforms and mapping the result to world space with the model matrix.

mod config;
mod error;
mod evaluator;
mod mesh;
mod palette;

pub use config::{KernelConfig, MAX_SUPPORTED_BONES, MAX_SUPPORTED_INFLUENCES};
pub use error::ConfigError;
pub use evaluator::{reference_aabb, skin_vertex};
pub use mesh::SkinnedMesh;
pub use palette::BonePalette;

use crate::math::Mat4;

/// Everything one dispatch reads: the vertex streams, the bone table and the
/// model transform (constant for the whole dispatch).
#[derive(Debug, Copy, Clone)]
pub struct SkinningInputs<'a> {
    pub mesh: &'a SkinnedMesh,
    pub bones: &'a BonePalette,
    pub model: Mat4,
}

impl<'a> SkinningInputs<'a> {
    #[inline]
    pub fn new(mesh: &'a SkinnedMesh, bones: &'a BonePalette, model: Mat4) -> Self {
        Self { mesh, bones, model }
    }

    /// Checks every integration contract the kernels rely on but never test.
    pub fn validate(&self, config: &KernelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.bones.capacity() != config.max_bones as usize {
            return Err(ConfigError::PaletteCapacity {
                palette: self.bones.capacity(),
                expected: config.max_bones,
            });
        }
        self.mesh.validate(config)
    }
}
