mod rig;

use anyhow::{Context, Result};
use skinbound_engine::bounds::Aabb;
use skinbound_engine::device::{Gpu, GpuInit};
use skinbound_engine::kernel::{CpuKernel, GpuAabbKernel, GpuSkinnedMesh};
use skinbound_engine::logging::{init_logging, LoggingConfig};
use skinbound_engine::math::Vec3;
use skinbound_engine::skinning::{reference_aabb, BonePalette, KernelConfig, SkinningInputs};

const FRAMES: u32 = 12;
const FRAME_TIME: f32 = 1.0 / 6.0;

/// GPU and CPU boxes may differ by float contraction in the skinning sum.
const GPU_TOLERANCE: f32 = 1.0e-4;

/// Command line: `[--cpu-only] [--log <filter>]`.
#[derive(Debug, Default, PartialEq)]
struct Options {
    cpu_only: bool,
    log_filter: Option<String>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--cpu-only" => options.cpu_only = true,
                "--log" => options.log_filter = Some(args.next().context("--log needs a filter")?),
                other => anyhow::bail!("unknown argument {other:?}"),
            }
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    let options = Options::parse(std::env::args().skip(1))?;
    init_logging(match options.log_filter {
        Some(filter) => LoggingConfig::with_filter(filter),
        None => LoggingConfig::default(),
    });

    let cpu_only = options.cpu_only;
    let config = KernelConfig::default();

    let mesh = rig::arm_mesh(64, 48).context("failed to build arm mesh")?;
    let mut bones = BonePalette::new(config.max_bones);
    rig::pose(&mut bones, 0.0)?;

    println!();
    println!("  skinbound studio");
    println!("  {} vertices, group size {}, {} frames", mesh.len(), config.group_size, FRAMES);
    println!();

    let cpu = CpuKernel::new(config)?;

    let gpu = if cpu_only {
        None
    } else {
        match Gpu::new_blocking(GpuInit::default()) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                log::warn!("no gpu available, running on cpu only: {err:#}");
                None
            }
        }
    };

    let mut gpu_run: Option<(&Gpu, GpuAabbKernel, GpuSkinnedMesh)> = match gpu.as_ref() {
        Some(gpu) => {
            let kernel = GpuAabbKernel::new(gpu.device(), config)?;
            let uploaded = kernel.upload(gpu.device(), &SkinningInputs::new(&mesh, &bones, rig::model(0.0)))?;
            log::info!("gpu kernel ready on {}", gpu.adapter_info().name);
            Some((gpu, kernel, uploaded))
        }
        None => None,
    };

    for frame in 0..FRAMES {
        let t = frame as f32 * FRAME_TIME;
        rig::pose(&mut bones, t)?;
        let model = rig::model(t);
        let inputs = SkinningInputs::new(&mesh, &bones, model);

        let cpu_box = cpu.compute(&inputs)?;
        let reference = reference_aabb(&inputs, &config);
        if cpu_box != reference {
            log::error!("frame {frame}: cpu kernel {cpu_box:?} differs from reference {reference:?}");
        }

        let gpu_box = match gpu_run.as_mut() {
            Some((gpu, kernel, uploaded)) => {
                uploaded.update_bones(gpu.queue(), &bones)?;
                uploaded.set_model(gpu.queue(), model);
                let aabb = kernel.compute(gpu, uploaded)?;
                let err = max_difference(&aabb, &cpu_box);
                if err > GPU_TOLERANCE {
                    log::warn!("frame {frame}: gpu and cpu boxes differ by {err}");
                }
                Some(aabb)
            }
            None => None,
        };

        println!(
            "  frame {frame:>2}  t={t:4.2}  min {}  max {}{}",
            fmt_vec(cpu_box.min),
            fmt_vec(cpu_box.max),
            if gpu_box.is_some() { "  [gpu]" } else { "" }
        );
    }

    println!();
    Ok(())
}

fn max_difference(a: &Aabb, b: &Aabb) -> f32 {
    (0..3)
        .flat_map(|i| [(a.min[i] - b.min[i]).abs(), (a.max[i] - b.max[i]).abs()])
        .fold(0.0, f32::max)
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:7.3}, {:7.3}, {:7.3})", v.x, v.y, v.z)
}
