use anyhow::{ensure, Result};

use crate::asset::ImageData;

/// Texture format used for every image texture.
pub const IMAGE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Creates an uninitialized 2D texture sized for `image`, ready to be filled by an
/// upload batch and sampled by [`super::QuadRenderer`].
pub fn texture_for_image(
    device: &wgpu::Device,
    image: &ImageData,
    label: &str,
) -> Result<wgpu::Texture> {
    ensure!(
        image.channels == 4,
        "texture '{label}' needs RGBA pixels, image has {} channel(s)",
        image.channels
    );
    ensure!(
        image.width > 0 && image.height > 0,
        "texture '{label}' has zero size ({}x{})",
        image.width,
        image.height
    );

    Ok(device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: IMAGE_TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }))
}
