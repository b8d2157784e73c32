use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bounds::Aabb;
use crate::skinning::{skin_vertex, ConfigError, KernelConfig, SkinningInputs};

use super::{AtomicAabb, GroupScratch};

/// Host executor for the skinned-AABB kernel.
///
/// Runs the same three stages as the GPU kernel (skin, group-local tree
/// reduction, atomic merge) on a pool of scoped threads. Workers claim group
/// ids from a shared counter, so groups complete in no particular order and
/// several merge into the result concurrently. Lanes within a group run in
/// lock-step on the worker that owns the group.
#[derive(Debug, Clone)]
pub struct CpuKernel {
    config: KernelConfig,
    workers: NonZeroUsize,
}

impl CpuKernel {
    /// Creates an executor using all available hardware threads.
    pub fn new(config: KernelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let workers = std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Ok(Self { config, workers })
    }

    /// Overrides the worker count (clamped to at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN);
        self
    }

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Narrows `result` by every vertex of `inputs`.
    ///
    /// `result` is not reset; seed it (or [`AtomicAabb::reseed`]) first when a
    /// fresh box is wanted. Returns the number of groups dispatched.
    pub fn dispatch(&self, inputs: &SkinningInputs<'_>, result: &AtomicAabb) -> Result<u64, ConfigError> {
        inputs.validate(&self.config)?;

        let group_count = self.config.group_count(inputs.mesh.len());
        if group_count == 0 {
            return Ok(0);
        }

        let workers = self.workers.get().min(group_count as usize);
        log::debug!(
            "cpu dispatch: {} vertices, {group_count} groups of {}, {workers} workers",
            inputs.mesh.len(),
            self.config.group_size
        );

        let next_group = AtomicU64::new(0);
        std::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| {
                    let mut scratch = GroupScratch::new(self.config.group_size);
                    loop {
                        let group = next_group.fetch_add(1, Ordering::Relaxed);
                        if group >= group_count {
                            break;
                        }
                        self.run_group(group, inputs, &mut scratch, result);
                    }
                });
            }
        });

        Ok(group_count)
    }

    /// Seeds a fresh record, dispatches, and decodes.
    pub fn compute(&self, inputs: &SkinningInputs<'_>) -> Result<Aabb, ConfigError> {
        let result = AtomicAabb::seeded();
        self.dispatch(inputs, &result)?;
        Ok(result.snapshot().decode())
    }

    /// Executes one group: every lane skins its vertex into its own scratch
    /// slots, the group reduces, lane 0 merges.
    ///
    /// Inputs must already be validated against this kernel's config, and
    /// `scratch` must have this kernel's group size.
    pub(crate) fn run_group(
        &self,
        group: u64,
        inputs: &SkinningInputs<'_>,
        scratch: &mut GroupScratch,
        result: &AtomicAabb,
    ) {
        let mesh = inputs.mesh;
        let bones = inputs.bones.as_slice();
        let k = self.config.max_bone_influences as usize;
        assert_eq!(
            scratch.group_size(),
            self.config.group_size as usize,
            "scratch lanes must match the kernel's group size"
        );
        let base = group * u64::from(self.config.group_size);

        for lane in 0..scratch.group_size() {
            let vertex = (base + lane as u64) as usize;
            let position = (vertex < mesh.len()).then(|| {
                skin_vertex(
                    mesh.positions()[vertex],
                    &mesh.bone_indices()[vertex],
                    &mesh.bone_weights()[vertex],
                    k,
                    bones,
                    &inputs.model,
                )
            });
            scratch.store(lane, position);
        }

        let (min, max) = scratch.reduce();
        result.merge(min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::AabbBits;
    use crate::math::{Mat4, Vec3};
    use crate::skinning::{reference_aabb, BonePalette, SkinnedMesh};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn config(group_size: u32) -> KernelConfig {
        KernelConfig {
            group_size,
            max_bone_influences: 4,
            max_bones: 16,
        }
    }

    fn unit_cube() -> SkinnedMesh {
        let mut mesh = SkinnedMesh::new();
        for i in 0..8u32 {
            let c = Vec3::new(((i >> 2) & 1) as f32, ((i >> 1) & 1) as f32, (i & 1) as f32);
            mesh.push_rigid(c, 0);
        }
        mesh
    }

    fn random_rig(rng: &mut StdRng, vertices: usize) -> (SkinnedMesh, BonePalette) {
        let mut bones = BonePalette::new(16);
        for b in 0..16 {
            let t = Vec3::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
            bones
                .set(b, Mat4::translation(t) * Mat4::rotation_z(rng.random_range(0.0..core::f32::consts::TAU)))
                .unwrap();
        }

        let mut mesh = SkinnedMesh::with_capacity(vertices);
        for _ in 0..vertices {
            let p = Vec3::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
            let a = rng.random_range(0..16);
            let b = rng.random_range(0..16);
            let w = rng.random_range(0.0..1.0);
            mesh.push_vertex(p, &[(a, w), (b, 1.0 - w)]).unwrap();
        }
        (mesh, bones)
    }

    #[test]
    fn unit_cube_with_identity_bones() {
        let mesh = unit_cube();
        let bones = BonePalette::new(16);
        let kernel = CpuKernel::new(config(4)).unwrap();
        let aabb = kernel.compute(&SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY)).unwrap();
        assert_eq!(aabb, Aabb::new(Vec3::zero(), Vec3::splat(1.0)));
    }

    #[test]
    fn model_matrix_moves_the_box() {
        let mesh = unit_cube();
        let bones = BonePalette::new(16);
        let model = Mat4::translation(Vec3::new(-3.0, 0.0, 2.0)) * Mat4::scale(Vec3::splat(2.0));
        let kernel = CpuKernel::new(config(8)).unwrap();
        let aabb = kernel.compute(&SkinningInputs::new(&mesh, &bones, model)).unwrap();
        assert_eq!(aabb, Aabb::new(Vec3::new(-3.0, 0.0, 2.0), Vec3::new(-1.0, 2.0, 4.0)));
    }

    #[test]
    fn one_big_group_and_many_small_groups_agree_bit_for_bit() {
        let mut rng = StdRng::seed_from_u64(1);
        let (mesh, bones) = random_rig(&mut rng, 256);
        let inputs = SkinningInputs::new(&mesh, &bones, Mat4::rotation_x(0.3));

        let run = |group_size: u32| {
            let result = AtomicAabb::seeded();
            let groups = CpuKernel::new(config(group_size)).unwrap().dispatch(&inputs, &result).unwrap();
            (groups, result.snapshot())
        };

        let (g1, one) = run(256);
        let (g4, four) = run(64);
        let (g256, single) = run(1);
        assert_eq!((g1, g4, g256), (1, 4, 256));
        assert_eq!(one, four);
        assert_eq!(one, single);
    }

    #[test]
    fn matches_sequential_reference_with_partial_tail_group() {
        let mut rng = StdRng::seed_from_u64(2);
        let (mesh, bones) = random_rig(&mut rng, 1000);
        let cfg = config(64);
        let inputs = SkinningInputs::new(&mesh, &bones, Mat4::translation(Vec3::new(0.0, 10.0, 0.0)));

        let aabb = CpuKernel::new(cfg).unwrap().with_workers(4).compute(&inputs).unwrap();
        assert_eq!(aabb, reference_aabb(&inputs, &cfg));
    }

    #[test]
    fn group_execution_order_is_irrelevant() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mesh, bones) = random_rig(&mut rng, 640);
        let cfg = config(32);
        let kernel = CpuKernel::new(cfg).unwrap();
        let inputs = SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY);

        let mut order: Vec<u64> = (0..cfg.group_count(mesh.len())).collect();
        let mut scratch = GroupScratch::new(cfg.group_size);
        let expected = AtomicAabb::seeded();
        kernel.dispatch(&inputs, &expected).unwrap();

        for _ in 0..8 {
            order.shuffle(&mut rng);
            let result = AtomicAabb::seeded();
            for &g in &order {
                kernel.run_group(g, &inputs, &mut scratch, &result);
            }
            assert_eq!(result.snapshot(), expected.snapshot());
        }
    }

    #[test]
    fn reseeding_reproduces_the_first_dispatch() {
        let mut rng = StdRng::seed_from_u64(4);
        let (mesh, bones) = random_rig(&mut rng, 300);
        let kernel = CpuKernel::new(config(16)).unwrap();
        let inputs = SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY);

        let result = AtomicAabb::seeded();
        kernel.dispatch(&inputs, &result).unwrap();
        let first = result.snapshot();

        result.reseed();
        kernel.dispatch(&inputs, &result).unwrap();
        assert_eq!(result.snapshot(), first);
    }

    #[test]
    fn stale_record_keeps_previous_extrema() {
        let mesh = unit_cube();
        let bones = BonePalette::new(16);
        let kernel = CpuKernel::new(config(8)).unwrap();

        let result = AtomicAabb::from_bits(AabbBits::encode(&Aabb::new(Vec3::splat(-9.0), Vec3::splat(9.0))));
        kernel
            .dispatch(&SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY), &result)
            .unwrap();
        assert_eq!(result.snapshot().decode(), Aabb::new(Vec3::splat(-9.0), Vec3::splat(9.0)));
    }

    #[test]
    fn empty_mesh_leaves_record_seeded() {
        let mesh = SkinnedMesh::new();
        let bones = BonePalette::new(16);
        let kernel = CpuKernel::new(config(8)).unwrap();
        let result = AtomicAabb::seeded();
        let groups = kernel
            .dispatch(&SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY), &result)
            .unwrap();
        assert_eq!(groups, 0);
        assert!(result.snapshot().decode().is_empty());
    }

    #[test]
    fn invalid_inputs_are_rejected_before_dispatch() {
        let mut mesh = unit_cube();
        mesh.push_rigid(Vec3::zero(), 16);
        let bones = BonePalette::new(16);
        let kernel = CpuKernel::new(config(8)).unwrap();
        let err = kernel
            .compute(&SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY))
            .unwrap_err();
        assert_eq!(err, ConfigError::BoneIndex { vertex: 8, bone: 16, capacity: 16 });

        let small = BonePalette::new(4);
        let err = kernel
            .compute(&SkinningInputs::new(&unit_cube(), &small, Mat4::IDENTITY))
            .unwrap_err();
        assert_eq!(err, ConfigError::PaletteCapacity { palette: 4, expected: 16 });
    }

    #[test]
    fn weightless_vertex_is_rejected_before_dispatch() {
        let mut mesh = unit_cube();
        mesh.push_vertex(Vec3::splat(5.0), &[(0, 0.0)]).unwrap();
        let bones = BonePalette::new(16);
        let kernel = CpuKernel::new(config(8)).unwrap();
        let err = kernel
            .compute(&SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY))
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroWeights { vertex: 8 });
    }

    #[test]
    #[should_panic(expected = "scratch lanes must match")]
    fn run_group_refuses_mismatched_scratch() {
        let mesh = unit_cube();
        let bones = BonePalette::new(16);
        let kernel = CpuKernel::new(config(8)).unwrap();
        let mut scratch = GroupScratch::new(4);
        kernel.run_group(0, &SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY), &mut scratch, &AtomicAabb::seeded());
    }

    #[test]
    fn non_power_of_two_group_is_rejected() {
        assert_eq!(CpuKernel::new(config(48)).unwrap_err(), ConfigError::GroupSize(48));
    }
}
