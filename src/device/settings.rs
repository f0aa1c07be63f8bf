//! Device initialization settings.

/// Global configuration for GPU device initialization.
///
/// Consumed once by [`WgpuDevice::new`](super::WgpuDevice::new) to select an
/// adapter and configure the surface.
///
/// | Field              | Description                          | Default           |
/// |--------------------|--------------------------------------|-------------------|
/// | `vsync`            | Vertical sync enabled                | `true`            |
/// | `power_preference` | GPU adapter selection strategy       | `HighPerformance` |
/// | `required_features`| Required wgpu features               | Empty             |
/// | `required_limits`  | Required wgpu limits                 | Default           |
/// | `depth_format`     | Depth buffer texture format          | `Depth32Float`    |
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Enable vertical synchronization (VSync).
    ///
    /// When `true`, the frame rate is capped to the display refresh rate.
    /// When `false`, the frame rate is uncapped, which may cause tearing
    /// but reduces input latency.
    pub vsync: bool,

    /// GPU adapter selection preference.
    ///
    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features that must be supported by the adapter.
    pub required_features: wgpu::Features,

    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,

    /// Depth buffer texture format.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}
