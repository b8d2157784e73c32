use crate::bounds::Aabb;
use crate::math::{Mat4, Vec3, Vec4};

use super::{KernelConfig, SkinningInputs};

/// World-space position of one skinned vertex.
///
/// `skinned = sum_i (bones[indices[i]] * base) * weights[i]` over the first
/// `influences` slots, then `model * skinned` and a homogeneous divide.
/// Bone indices are not range-checked beyond slice indexing; validate the mesh
/// against its palette before evaluating.
#[inline]
pub fn skin_vertex(
    position: Vec3,
    indices: &[u32; 4],
    weights: &[f32; 4],
    influences: usize,
    bones: &[Mat4],
    model: &Mat4,
) -> Vec3 {
    let base = position.extend(1.0);
    let mut skinned = Vec4::zero();
    for (&bone, &weight) in indices.iter().zip(weights).take(influences) {
        skinned += (bones[bone as usize] * base) * weight;
    }
    (*model * skinned).project()
}

/// Sequential host reference: skins every vertex and grows one box.
pub fn reference_aabb(inputs: &SkinningInputs<'_>, config: &KernelConfig) -> Aabb {
    let mesh = inputs.mesh;
    let bones = inputs.bones.as_slice();
    let k = config.max_bone_influences as usize;

    Aabb::from_points((0..mesh.len()).map(|v| {
        skin_vertex(
            mesh.positions()[v],
            &mesh.bone_indices()[v],
            &mesh.bone_weights()[v],
            k,
            bones,
            &inputs.model,
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skinning::{BonePalette, SkinnedMesh};
    use approx::assert_abs_diff_eq;

    #[test]
    fn opposing_translations_blend_to_origin() {
        let bones = [
            Mat4::translation(Vec3::new(1.0, 0.0, 0.0)),
            Mat4::translation(Vec3::new(-1.0, 0.0, 0.0)),
        ];
        let p = skin_vertex(
            Vec3::zero(),
            &[0, 1, 0, 0],
            &[0.5, 0.5, 0.0, 0.0],
            4,
            &bones,
            &Mat4::IDENTITY,
        );
        assert_eq!(p, Vec3::zero());
    }

    #[test]
    fn uneven_blend_is_weighted_average() {
        let bones = [
            Mat4::translation(Vec3::new(4.0, 0.0, 0.0)),
            Mat4::translation(Vec3::new(0.0, 8.0, 0.0)),
        ];
        let p = skin_vertex(
            Vec3::new(1.0, 1.0, 1.0),
            &[0, 1, 0, 0],
            &[0.25, 0.75, 0.0, 0.0],
            2,
            &bones,
            &Mat4::IDENTITY,
        );
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 7.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn model_applies_after_skinning() {
        let bones = [Mat4::scale(Vec3::splat(2.0))];
        let model = Mat4::translation(Vec3::new(0.0, 0.0, 5.0));
        let p = skin_vertex(Vec3::new(1.0, 1.0, 1.0), &[0; 4], &[1.0, 0.0, 0.0, 0.0], 4, &bones, &model);
        assert_eq!(p, Vec3::new(2.0, 2.0, 7.0));
    }

    #[test]
    fn slots_past_influence_count_are_ignored() {
        let bones = [Mat4::IDENTITY, Mat4::translation(Vec3::splat(100.0))];
        let p = skin_vertex(
            Vec3::new(1.0, 2.0, 3.0),
            &[0, 1, 0, 0],
            &[1.0, 1.0, 0.0, 0.0],
            1,
            &bones,
            &Mat4::IDENTITY,
        );
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn unnormalized_weights_are_trusted_and_divided_out() {
        // Weights summing to 2 double w as well as xyz; the divide cancels it.
        let bones = [Mat4::IDENTITY];
        let p = skin_vertex(Vec3::new(3.0, 0.0, 0.0), &[0; 4], &[2.0, 0.0, 0.0, 0.0], 4, &bones, &Mat4::IDENTITY);
        assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn reference_aabb_of_unit_cube() {
        let mut mesh = SkinnedMesh::new();
        for i in 0..8u32 {
            let c = Vec3::new(((i >> 2) & 1) as f32, ((i >> 1) & 1) as f32, (i & 1) as f32);
            mesh.push_rigid(c, 0);
        }
        let bones = BonePalette::new(1);
        let cfg = KernelConfig { max_bones: 1, ..Default::default() };
        let aabb = reference_aabb(&SkinningInputs::new(&mesh, &bones, Mat4::IDENTITY), &cfg);
        assert_eq!(aabb, Aabb::new(Vec3::zero(), Vec3::splat(1.0)));
    }
}
