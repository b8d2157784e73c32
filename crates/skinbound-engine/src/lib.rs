//! Skinbound engine crate.
//!
//! Computes world-space axis-aligned bounding boxes of skinned meshes. Every
//! vertex is skinned by its bone influences, groups of vertices reduce to a
//! local box, and groups merge into one result through integer atomics on an
//! order-preserving float encoding. The kernel runs either as a wgpu compute
//! pipeline ([`kernel::GpuAabbKernel`]) or on host threads ([`kernel::CpuKernel`]).

pub mod bounds;
pub mod device;
pub mod kernel;
pub mod logging;
pub mod math;
pub mod shader;
pub mod skinning;
