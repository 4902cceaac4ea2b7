/// How [`super::Gpu::new`] picks an adapter and configures the surface.
///
/// Anything the adapter can't honour falls back to a supported value
/// (formats, alpha mode); features and limits are hard requirements.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Choose an 8-bit sRGB swapchain format when the surface offers one.
    ///
    /// Image textures are sRGB and blending happens in linear space, so an sRGB
    /// swapchain keeps colours as authored.
    pub prefer_srgb: bool,

    /// `Fifo` (vsync) is the only mode every platform supports.
    pub present_mode: wgpu::PresentMode,
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub desired_maximum_frame_latency: u32,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}
