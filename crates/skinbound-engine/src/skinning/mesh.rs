use crate::math::Vec3;

use super::{ConfigError, KernelConfig, MAX_SUPPORTED_INFLUENCES};

const SLOTS: usize = MAX_SUPPORTED_INFLUENCES as usize;

/// Weight sums further than this from 1.0 are reported by [`SkinnedMesh::validate`].
const WEIGHT_SUM_TOLERANCE: f32 = 1.0e-3;

/// Bind-pose vertex streams of a skinned mesh.
///
/// Three parallel streams, one entry per vertex:
/// - `positions`: mesh-local bind-pose position
/// - `bone_indices`: up to four bone table indices
/// - `bone_weights`: the matching weights; unused slots hold `(0, 0.0)`
///
/// Weights are trusted as given. They are expected to sum to ~1.0 but are not
/// renormalized unless [`SkinnedMesh::normalize_weights`] is called. A vertex
/// with no weight at all is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinnedMesh {
    positions: Vec<Vec3>,
    bone_indices: Vec<[u32; SLOTS]>,
    bone_weights: Vec<[f32; SLOTS]>,
}

impl SkinnedMesh {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            bone_indices: Vec::with_capacity(vertices),
            bone_weights: Vec::with_capacity(vertices),
        }
    }

    /// Wraps pre-packed streams (e.g. straight from an asset loader).
    pub fn from_streams(
        positions: Vec<Vec3>,
        bone_indices: Vec<[u32; SLOTS]>,
        bone_weights: Vec<[f32; SLOTS]>,
    ) -> Result<Self, ConfigError> {
        if positions.len() != bone_indices.len() || positions.len() != bone_weights.len() {
            return Err(ConfigError::StreamLength {
                positions: positions.len(),
                indices: bone_indices.len(),
                weights: bone_weights.len(),
            });
        }
        Ok(Self {
            positions,
            bone_indices,
            bone_weights,
        })
    }

    /// Appends a vertex with one to four `(bone, weight)` influences.
    pub fn push_vertex(&mut self, position: Vec3, influences: &[(u32, f32)]) -> Result<(), ConfigError> {
        if influences.is_empty() {
            return Err(ConfigError::ZeroWeights {
                vertex: self.positions.len(),
            });
        }
        if influences.len() > SLOTS {
            return Err(ConfigError::TooManyInfluences {
                vertex: self.positions.len(),
                count: influences.len(),
            });
        }

        let mut indices = [0u32; SLOTS];
        let mut weights = [0.0f32; SLOTS];
        for (slot, &(bone, weight)) in influences.iter().enumerate() {
            indices[slot] = bone;
            weights[slot] = weight;
        }

        self.positions.push(position);
        self.bone_indices.push(indices);
        self.bone_weights.push(weights);
        Ok(())
    }

    /// Appends a vertex fully bound to a single bone.
    pub fn push_rigid(&mut self, position: Vec3, bone: u32) {
        self.positions.push(position);
        self.bone_indices.push([bone, 0, 0, 0]);
        self.bone_weights.push([1.0, 0.0, 0.0, 0.0]);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` stream (the GPU layout).
    #[inline]
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    #[inline]
    pub fn bone_indices(&self) -> &[[u32; SLOTS]] {
        &self.bone_indices
    }

    #[inline]
    pub fn bone_weights(&self) -> &[[f32; SLOTS]] {
        &self.bone_weights
    }

    /// Sum of the first `influences` weights of `vertex` (at most four).
    pub fn weight_sum(&self, vertex: usize, influences: u32) -> f32 {
        self.bone_weights[vertex].iter().take(influences as usize).sum()
    }

    /// Rescales the first `influences` weights of each vertex to sum to 1.0.
    ///
    /// Slots past `influences` are zeroed, since the kernel never reads them.
    /// Vertices whose read weights sum to zero are left untouched and still
    /// fail [`SkinnedMesh::validate`].
    pub fn normalize_weights(&mut self, influences: u32) {
        let k = (influences as usize).min(SLOTS);
        for weights in &mut self.bone_weights {
            let (read, unread) = weights.split_at_mut(k);
            let sum: f32 = read.iter().sum();
            if sum != 0.0 {
                read.iter_mut().for_each(|w| *w /= sum);
                unread.fill(0.0);
            }
        }
    }

    /// Checks stream lengths and that every bone index the kernel will read is
    /// inside the bone table.
    ///
    /// Slots past `max_bone_influences` are never read and are not checked.
    /// Weight sums of zero are rejected; other sums away from 1.0 are logged.
    pub fn validate(&self, config: &KernelConfig) -> Result<(), ConfigError> {
        if self.positions.len() != self.bone_indices.len()
            || self.positions.len() != self.bone_weights.len()
        {
            return Err(ConfigError::StreamLength {
                positions: self.positions.len(),
                indices: self.bone_indices.len(),
                weights: self.bone_weights.len(),
            });
        }

        let k = config.max_bone_influences as usize;
        let mut unnormalized = 0usize;

        for (vertex, (indices, weights)) in self.bone_indices.iter().zip(&self.bone_weights).enumerate() {
            if let Some(&bone) = indices.iter().take(k).find(|&&b| b >= config.max_bones) {
                return Err(ConfigError::BoneIndex {
                    vertex,
                    bone,
                    capacity: config.max_bones,
                });
            }
            let sum: f32 = weights.iter().take(k).sum();
            if sum == 0.0 {
                return Err(ConfigError::ZeroWeights { vertex });
            }
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                unnormalized += 1;
            }
        }

        if unnormalized > 0 {
            log::warn!(
                "{unnormalized} of {} vertices have bone weights not summing to 1.0",
                self.len()
            );
        }

        Ok(())
    }
}
