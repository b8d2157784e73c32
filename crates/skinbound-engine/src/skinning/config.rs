use super::ConfigError;

/// Influences are packed into one `vec4` of indices and one of weights.
pub const MAX_SUPPORTED_INFLUENCES: u32 = 4;

/// A `mat4x4<f32>` table in a 64 KiB uniform binding.
pub const MAX_SUPPORTED_BONES: u32 = 1024;

/// Specialisation constants baked into the kernel at pipeline creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Threads per group. Must be a power of two for the tree reduction.
    pub group_size: u32,

    /// Bone slots read per vertex (K).
    pub max_bone_influences: u32,

    /// Bone table capacity.
    pub max_bones: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            group_size: 256,
            max_bone_influences: 4,
            max_bones: 100,
        }
    }
}

impl KernelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.group_size.is_power_of_two() {
            return Err(ConfigError::GroupSize(self.group_size));
        }
        if self.max_bone_influences == 0 || self.max_bone_influences > MAX_SUPPORTED_INFLUENCES {
            return Err(ConfigError::Influences {
                requested: self.max_bone_influences,
                supported: MAX_SUPPORTED_INFLUENCES,
            });
        }
        if self.max_bones == 0 || self.max_bones > MAX_SUPPORTED_BONES {
            return Err(ConfigError::BoneCapacity {
                requested: self.max_bones,
                supported: MAX_SUPPORTED_BONES,
            });
        }
        Ok(())
    }

    /// Number of groups covering `vertex_count` threads: `ceil(n / group_size)`.
    #[inline]
    pub fn group_count(&self, vertex_count: usize) -> u64 {
        (vertex_count as u64).div_ceil(u64::from(self.group_size.max(1)))
    }

    /// Bytes of group-local scratch the GPU kernel declares (two `vec3<f32>` arrays, 16-byte stride).
    #[inline]
    pub fn scratch_bytes(&self) -> u32 {
        self.group_size.saturating_mul(2 * 16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(KernelConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_power_of_two_groups() {
        for group_size in [0, 3, 96, 255] {
            let cfg = KernelConfig { group_size, ..Default::default() };
            assert_eq!(cfg.validate(), Err(ConfigError::GroupSize(group_size)));
        }
        let cfg = KernelConfig { group_size: 1, ..Default::default() };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn rejects_influence_counts_outside_vec4() {
        for k in [0, 5] {
            let cfg = KernelConfig { max_bone_influences: k, ..Default::default() };
            assert!(matches!(cfg.validate(), Err(ConfigError::Influences { .. })));
        }
    }

    #[test]
    fn rejects_oversized_bone_tables() {
        let cfg = KernelConfig { max_bones: MAX_SUPPORTED_BONES + 1, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::BoneCapacity { .. })));
    }

    #[test]
    fn group_count_rounds_up() {
        let cfg = KernelConfig { group_size: 64, ..Default::default() };
        assert_eq!(cfg.group_count(0), 0);
        assert_eq!(cfg.group_count(1), 1);
        assert_eq!(cfg.group_count(64), 1);
        assert_eq!(cfg.group_count(65), 2);
        assert_eq!(cfg.group_count(256), 4);
    }
}
