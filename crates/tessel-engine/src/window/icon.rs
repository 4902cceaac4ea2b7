use anyhow::{ensure, Context, Result};

use crate::asset::ImageData;

/// Window icon as tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIcon {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

impl WindowIcon {
    pub fn from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        ensure!(width > 0 && height > 0, "window icon has zero size");
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .context("window icon dimensions overflow")?;
        ensure!(
            rgba.len() == expected,
            "window icon is {width}x{height} but has {} bytes (expected {expected})",
            rgba.len()
        );
        Ok(Self {
            rgba,
            width,
            height,
        })
    }

    /// Builds an icon from a decoded 4-channel image.
    pub fn from_image(image: &ImageData) -> Result<Self> {
        ensure!(
            image.channels == 4,
            "window icon needs RGBA pixels, image has {} channel(s)",
            image.channels
        );
        Self::from_rgba(image.pixels.clone(), image.width, image.height)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn to_winit(&self) -> Result<winit::window::Icon> {
        winit::window::Icon::from_rgba(self.rgba.clone(), self.width, self.height)
            .context("platform rejected window icon")
    }
}
