//! The skinned-AABB kernel and its executors.
//!
//! Three stages per dispatch:
//! 1. every thread skins one vertex into world space
//! 2. each group tree-reduces its positions into a group-local min/max
//! 3. one thread per group narrows the shared result with integer atomics
//!    on order-preserving encodings
//!
//! [`CpuKernel`] runs the stages on scoped threads; [`GpuAabbKernel`] runs
//! them as a wgpu compute pipeline. Both narrow a seeded record and agree on
//! the result regardless of group size or group completion order.

mod aggregate;
mod cpu;
mod gpu;
mod reduce;

pub use aggregate::AtomicAabb;
pub use cpu::CpuKernel;
pub use gpu::{GpuAabbKernel, GpuSkinnedMesh};
pub use reduce::GroupScratch;

/// WGSL source of the kernel, before specialisation.
pub const SKINNED_AABB_WGSL: &str = include_str!("shaders/skinned_aabb.wgsl");

/// WGSL snippet with the order-preserving float encoding, included by name.
pub const ORDERED_BITS_WGSL: &str = include_str!("shaders/ordered_bits.wgsl");
