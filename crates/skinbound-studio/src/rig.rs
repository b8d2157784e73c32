use std::f32::consts::TAU;

use skinbound_engine::math::{Mat4, Vec3};
use skinbound_engine::skinning::{BonePalette, ConfigError, SkinnedMesh};

/// Length of each arm segment along +Y.
pub const SEGMENT: f32 = 1.0;

const RADIUS: f32 = 0.2;

/// Half-width of the band around the elbow where both bones contribute.
const BLEND: f32 = 0.25;

/// A capped-free cylinder along +Y, two segments long, skinned to two bones.
///
/// Bone 0 drives the lower segment, bone 1 the upper. Vertices near the elbow
/// blend linearly between the two.
pub fn arm_mesh(rings: u32, sides: u32) -> Result<SkinnedMesh, ConfigError> {
    let rings = rings.max(2);
    let sides = sides.max(3);
    let mut mesh = SkinnedMesh::with_capacity((rings * sides) as usize);

    for ring in 0..rings {
        let y = 2.0 * SEGMENT * ring as f32 / (rings - 1) as f32;
        let upper = ((y - (SEGMENT - BLEND)) / (2.0 * BLEND)).clamp(0.0, 1.0);
        for side in 0..sides {
            let a = TAU * side as f32 / sides as f32;
            let p = Vec3::new(RADIUS * a.cos(), y, RADIUS * a.sin());
            mesh.push_vertex(p, &[(0, 1.0 - upper), (1, upper)])?;
        }
    }

    Ok(mesh)
}

/// Writes the pose at time `t` (seconds): shoulder swings, elbow bends.
pub fn pose(bones: &mut BonePalette, t: f32) -> Result<(), ConfigError> {
    let shoulder = Mat4::rotation_z(0.6 * (0.5 * TAU * t).sin());
    let elbow = Mat4::translation(Vec3::new(0.0, SEGMENT, 0.0))
        * Mat4::rotation_z(1.2 * (0.5 * TAU * t).cos().abs())
        * Mat4::translation(Vec3::new(0.0, -SEGMENT, 0.0));

    bones.set(0, shoulder)?;
    bones.set(1, shoulder * elbow)
}

/// Object placement at time `t`: slow drift and tilt.
pub fn model(t: f32) -> Mat4 {
    Mat4::translation(Vec3::new(0.5 * t, 0.0, -2.0)) * Mat4::rotation_x(0.1 * t)
}
