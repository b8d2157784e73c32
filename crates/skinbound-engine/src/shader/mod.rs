//! Shader source specialisation.
//!
//! Kernel sources carry `%%KEY%%` placeholders for build-time constants and
//! `%%include name%%` directives for shared snippets. `ShaderProcessor`
//! expands both before the source reaches wgpu.

mod error;
mod processor;

pub use error::ShaderError;
pub use processor::ShaderProcessor;
