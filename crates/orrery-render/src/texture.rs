//! Sampled RGBA8 textures for pixel-art sprites.

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match the expected size for the given dimensions and format.
    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height} {format:?}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture {width}x{height} exceeds the device limit of {max} per side")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// A texture, its default view, and a nearest-filtering sampler.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub dimensions: (u32, u32),
}

impl GpuTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Upload tightly packed RGBA8 pixels. Sampling is nearest-neighbour so
    /// sprite texels stay crisp under magnification.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Self, TextureError> {
        validate_dimensions(width, height)?;
        validate_limits(width, height, device.limits().max_texture_dimension_2d)?;
        validate_data_size(data, width, height, Self::FORMAT)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row(width, Self::FORMAT)),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-nearest"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        log::debug!("Uploaded texture '{label}' ({width}x{height})");
        Ok(Self {
            texture,
            view,
            sampler,
            dimensions: (width, height),
        })
    }

    /// Release the GPU memory now instead of when the last handle drops.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

fn expected_byte_size(width: u32, height: u32, format: wgpu::TextureFormat) -> usize {
    let bpp = format.block_copy_size(None).unwrap_or(4) as usize;
    width as usize * height as usize * bpp
}

fn bytes_per_row(width: u32, format: wgpu::TextureFormat) -> u32 {
    let bpp = format.block_copy_size(None).unwrap_or(4);
    width * bpp
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_limits(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

fn validate_data_size(
    data: &[u8],
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<(), TextureError> {
    let expected = expected_byte_size(width, height, format);
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
            format,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_test_device_queue;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            validate_dimensions(0, 16),
            Err(TextureError::ZeroDimensions { width: 0, height: 16 })
        ));
        assert!(validate_dimensions(1, 1).is_ok());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(validate_limits(8192, 8192, 8192).is_ok());
        assert!(matches!(
            validate_limits(16384, 16384, 8192),
            Err(TextureError::TooLarge {
                width: 16384,
                height: 16384,
                max: 8192
            })
        ));
        assert!(validate_limits(64, 8193, 8192).is_err());
    }

    #[test]
    fn test_data_size_must_match_rgba8() {
        let data = vec![0u8; 4 * 4 * 4];
        assert!(validate_data_size(&data, 4, 4, GpuTexture::FORMAT).is_ok());
        let err = validate_data_size(&data[..60], 4, 4, GpuTexture::FORMAT).unwrap_err();
        match err {
            TextureError::DataSizeMismatch {
                actual, expected, ..
            } => {
                assert_eq!(actual, 60);
                assert_eq!(expected, 64);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bytes_per_row_is_four_per_texel() {
        assert_eq!(bytes_per_row(64, GpuTexture::FORMAT), 256);
    }

    #[test]
    fn test_upload_rejects_short_data_before_gpu_work() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let result = GpuTexture::from_rgba8(&device, &queue, "short", 8, 8, &[0; 10]);
        assert!(matches!(result, Err(TextureError::DataSizeMismatch { .. })));
    }

    #[test]
    fn test_upload_past_device_limit_fails_cleanly() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let side = device.limits().max_texture_dimension_2d + 1;
        let result = GpuTexture::from_rgba8(&device, &queue, "huge", side, 1, &[]);
        assert!(matches!(result, Err(TextureError::TooLarge { .. })));
    }

    #[test]
    fn test_upload_and_destroy() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let data = vec![255u8; 16 * 8 * 4];
        let tex = GpuTexture::from_rgba8(&device, &queue, "atlas", 16, 8, &data).unwrap();
        assert_eq!(tex.dimensions, (16, 8));
        assert_eq!(tex.texture.format(), GpuTexture::FORMAT);
        tex.destroy();
    }
}
