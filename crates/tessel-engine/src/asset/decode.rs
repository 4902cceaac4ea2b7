use super::AssetError;

/// Decoded image: tightly packed 8-bit pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel (1 = luma, 2 = luma+alpha, 3 = RGB, 4 = RGBA).
    pub channels: u8,
}

impl ImageData {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        Self {
            pixels,
            width,
            height,
            channels,
        }
    }

    /// `width × height × channels`, or `None` on overflow.
    pub fn checked_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.channels as usize)
    }

    /// Bytes in one row of pixels.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.channels as usize
    }
}

/// Decodes an encoded image (PNG) from memory.
///
/// `desired_channels = None` keeps the channel count stored in the file;
/// `Some(n)` converts to `n` channels.
pub fn load_image(bytes: &[u8], desired_channels: Option<u8>) -> Result<ImageData, AssetError> {
    if let Some(n) = desired_channels {
        if !(1..=4).contains(&n) {
            return Err(AssetError::UnsupportedChannels(n));
        }
    }

    let decoded = ::image::load_from_memory(bytes)?;
    let channels = desired_channels.unwrap_or_else(|| decoded.color().channel_count());
    let (width, height) = (decoded.width(), decoded.height());

    let pixels = match channels {
        1 => decoded.into_luma8().into_raw(),
        2 => decoded.into_luma_alpha8().into_raw(),
        3 => decoded.into_rgb8().into_raw(),
        4 => decoded.into_rgba8().into_raw(),
        other => return Err(AssetError::UnsupportedChannels(other)),
    };

    Ok(ImageData {
        pixels,
        width,
        height,
        channels,
    })
}
