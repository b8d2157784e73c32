use std::sync::mpsc;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::bounds::{Aabb, AabbBits};
use crate::device::Gpu;
use crate::math::Mat4;
use crate::shader::{ShaderError, ShaderProcessor};
use crate::skinning::{BonePalette, ConfigError, KernelConfig, SkinningInputs};

use super::{ORDERED_BITS_WGSL, SKINNED_AABB_WGSL};

/// Storage bindings may not be zero-sized; empty streams upload this many zero bytes.
const MIN_STORAGE_BYTES: usize = 16;

/// Per-dispatch uniform block. Matches `Params` in the kernel source.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Params {
    model: Mat4,
    vertex_count: u32,
    _pad: [u32; 3],
}

/// Compute pipeline for the skinned-AABB kernel, specialised for one [`KernelConfig`].
///
/// Group size, influence count and bone capacity are baked into the shader at
/// creation; a different config needs a different kernel.
pub struct GpuAabbKernel {
    config: KernelConfig,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl GpuAabbKernel {
    /// Specialises the kernel source for `config`.
    pub fn shader_source(config: &KernelConfig) -> Result<String, ShaderError> {
        ShaderProcessor::new()
            .global("GROUP_SIZE", config.group_size)
            .global("MAX_BONES", config.max_bones)
            .global("MAX_BONE_INFLUENCES", config.max_bone_influences)
            .source("ordered_bits", ORDERED_BITS_WGSL)
            .process("skinned_aabb", SKINNED_AABB_WGSL)
    }

    /// Builds the pipeline.
    ///
    /// Fails if the config is invalid or exceeds what `device` can run.
    pub fn new(device: &wgpu::Device, config: KernelConfig) -> Result<Self> {
        config.validate()?;

        let limits = device.limits();
        let invocation_limit = limits
            .max_compute_invocations_per_workgroup
            .min(limits.max_compute_workgroup_size_x);
        if config.group_size > invocation_limit {
            return Err(ConfigError::GroupSizeLimit {
                group_size: config.group_size,
                limit: invocation_limit,
            }
            .into());
        }
        anyhow::ensure!(
            config.scratch_bytes() <= limits.max_compute_workgroup_storage_size,
            "group scratch of {} bytes exceeds the device limit of {}",
            config.scratch_bytes(),
            limits.max_compute_workgroup_storage_size
        );
        let bone_bytes = u64::from(config.max_bones) * std::mem::size_of::<Mat4>() as u64;
        anyhow::ensure!(
            bone_bytes <= u64::from(limits.max_uniform_buffer_binding_size),
            "bone table of {bone_bytes} bytes exceeds the uniform binding limit of {}",
            limits.max_uniform_buffer_binding_size
        );

        let source = Self::shader_source(&config).context("failed to specialise skinned_aabb.wgsl")?;
        log::debug!(
            "building skinned aabb kernel: group_size={} influences={} bones={}",
            config.group_size,
            config.max_bone_influences,
            config.max_bones
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skinbound skinned_aabb shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skinbound skinned_aabb bgl"),
            entries: &[
                uniform_entry(0),
                uniform_entry(1),
                storage_entry(2, true),
                storage_entry(3, true),
                storage_entry(4, true),
                storage_entry(5, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skinbound skinned_aabb pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("skinbound skinned_aabb pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            config,
            bind_group_layout,
            pipeline,
        })
    }

    #[inline]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Validates `inputs` and uploads them into device buffers bound to this kernel.
    ///
    /// The result record starts seeded.
    pub fn upload(&self, device: &wgpu::Device, inputs: &SkinningInputs<'_>) -> Result<GpuSkinnedMesh> {
        inputs.validate(&self.config)?;

        let mesh = inputs.mesh;
        let vertex_count = u32::try_from(mesh.len()).context("vertex count does not fit in u32")?;
        let groups = self.config.group_count(mesh.len());
        let group_limit = device.limits().max_compute_workgroups_per_dimension;
        if groups > u64::from(group_limit) {
            return Err(ConfigError::GroupCount {
                groups,
                limit: group_limit,
            }
            .into());
        }

        let params = Params {
            model: inputs.model,
            vertex_count,
            _pad: [0; 3],
        };

        let params_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skinbound params ubo"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bones_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skinbound bones ubo"),
            contents: bytemuck::cast_slice(inputs.bones.as_slice()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let positions = storage_init(device, "skinbound positions", bytemuck::cast_slice(mesh.positions_flat()));
        let bone_indices = storage_init(device, "skinbound bone indices", bytemuck::cast_slice(mesh.bone_indices()));
        let bone_weights = storage_init(device, "skinbound bone weights", bytemuck::cast_slice(mesh.bone_weights()));

        let result = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skinbound aabb result"),
            contents: bytemuck::bytes_of(&AabbBits::SEEDED),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
        });
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("skinbound aabb staging"),
            size: AabbBits::SIZE,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skinbound skinned_aabb bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: params_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: bones_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: positions.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: bone_indices.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: bone_weights.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 5, resource: result.as_entire_binding() },
            ],
        });

        Ok(GpuSkinnedMesh {
            vertex_count,
            group_count: groups as u32,
            max_bones: self.config.max_bones,
            params,
            params_ubo,
            bones_ubo,
            _positions: positions,
            _bone_indices: bone_indices,
            _bone_weights: bone_weights,
            result,
            staging,
            bind_group,
        })
    }

    /// Records one dispatch followed by a copy of the result into the staging buffer.
    ///
    /// The record is narrowed, not reset: call [`GpuSkinnedMesh::seed`] before
    /// submitting when a fresh box is wanted. An empty mesh records no dispatch.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, mesh: &GpuSkinnedMesh) {
        if mesh.group_count > 0 {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("skinbound skinned_aabb pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &mesh.bind_group, &[]);
            pass.dispatch_workgroups(mesh.group_count, 1, 1);
        }
        encoder.copy_buffer_to_buffer(&mesh.result, 0, &mesh.staging, 0, AabbBits::SIZE);
    }

    /// Seeds, dispatches, waits and decodes.
    pub fn compute(&self, gpu: &Gpu, mesh: &GpuSkinnedMesh) -> Result<Aabb> {
        mesh.seed(gpu.queue());

        let mut encoder = gpu.device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("skinbound skinned_aabb encoder"),
        });
        self.record(&mut encoder, mesh);
        gpu.queue().submit(Some(encoder.finish()));

        Ok(mesh.read_result(gpu.device())?.decode())
    }
}

/// Device-resident inputs and result record of one skinned mesh.
///
/// Vertex streams are immutable after upload. Bones and the model matrix are
/// rewritten per frame with [`GpuSkinnedMesh::update_bones`] and
/// [`GpuSkinnedMesh::set_model`].
pub struct GpuSkinnedMesh {
    vertex_count: u32,
    group_count: u32,
    max_bones: u32,
    params: Params,
    params_ubo: wgpu::Buffer,
    bones_ubo: wgpu::Buffer,
    _positions: wgpu::Buffer,
    _bone_indices: wgpu::Buffer,
    _bone_weights: wgpu::Buffer,
    result: wgpu::Buffer,
    staging: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuSkinnedMesh {
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Uploads a new bone table. Its capacity must match the kernel's.
    pub fn update_bones(&self, queue: &wgpu::Queue, bones: &BonePalette) -> Result<(), ConfigError> {
        if bones.capacity() != self.max_bones as usize {
            return Err(ConfigError::PaletteCapacity {
                palette: bones.capacity(),
                expected: self.max_bones,
            });
        }
        queue.write_buffer(&self.bones_ubo, 0, bytemuck::cast_slice(bones.as_slice()));
        Ok(())
    }

    pub fn set_model(&mut self, queue: &wgpu::Queue, model: Mat4) {
        self.params.model = model;
        queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&self.params));
    }

    /// Resets the result record to the empty box.
    pub fn seed(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.result, 0, bytemuck::bytes_of(&AabbBits::SEEDED));
    }

    /// Maps the staging copy written by the last recorded dispatch and returns it.
    ///
    /// Blocks until the device is idle.
    pub fn read_result(&self, device: &wgpu::Device) -> Result<AabbBits> {
        let slice = self.staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed while reading the aabb record")?;
        rx.recv()
            .context("aabb staging map callback dropped")?
            .context("failed to map aabb staging buffer")?;

        let bits = {
            let data = slice.get_mapped_range();
            bytemuck::pod_read_unaligned::<AabbBits>(&data)
        };
        self.staging.unmap();
        Ok(bits)
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_init(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    let padding = [0u8; MIN_STORAGE_BYTES];
    let contents = if contents.is_empty() { &padding[..] } else { contents };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::STORAGE,
    })
}
