/// Initialization parameters for the headless GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    /// Adapter preference (discrete vs integrated).
    pub power_preference: wgpu::PowerPreference,

    /// Accept only a software adapter (useful in CI without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// The kernel needs none; favor an empty set for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// Group size, bone table size and group count are validated against these.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
