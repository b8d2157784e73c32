//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - exposing the device limits the kernel is checked against

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;
