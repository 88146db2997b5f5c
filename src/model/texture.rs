use std::path::Path;

use image::{imageops::FilterType, RgbaImage};

use crate::error::TextureError;

/// Color used when the wood texture cannot be loaded.
pub const PLACEHOLDER_COLOR: [u8; 4] = [133, 94, 66, 255];

/// Decoded RGBA8 pixels, ready for upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub image: RgbaImage,
}

impl TextureImage {
    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path).map_err(|source| TextureError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let image = img.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty {
                path: path.to_path_buf(),
                width: image.width(),
                height: image.height(),
            });
        }

        Ok(Self { image })
    }

    /// A 1x1 texture of a single color.
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(1, 1, image::Rgba(color)),
        }
    }

    /// Loads `path`, falling back to the placeholder color on failure.
    pub fn load_or_placeholder(path: &Path) -> Self {
        match Self::load(path) {
            Ok(texture) => {
                log::info!(
                    "Loaded texture {} ({}x{})",
                    path.display(),
                    texture.width(),
                    texture.height()
                );
                texture
            }
            Err(e) => {
                log::warn!("{}; using placeholder color", e);
                Self::solid(PLACEHOLDER_COLOR)
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn mip_level_count(&self) -> u32 {
        32 - self.width().max(self.height()).leading_zeros()
    }

    /// Returns a downscaled copy when either side exceeds `max_dimension`,
    /// keeping the aspect ratio. `None` means the image already fits.
    pub fn fit_within(&self, max_dimension: u32) -> Option<TextureImage> {
        let largest = self.width().max(self.height());
        if largest <= max_dimension {
            return None;
        }

        let shrink = |side: u32| {
            ((side as u64 * max_dimension as u64) / largest as u64).max(1) as u32
        };
        let (width, height) = (shrink(self.width()), shrink(self.height()));
        log::warn!(
            "Texture is {}x{}, larger than the device limit of {}; downscaling to {}x{}",
            self.width(),
            self.height(),
            max_dimension,
            width,
            height
        );

        Some(TextureImage {
            image: image::imageops::resize(&self.image, width, height, FilterType::Triangle),
        })
    }

    /// Full mip pyramid, level 0 first, halving down to 1x1.
    pub fn mip_chain(&self) -> Vec<RgbaImage> {
        let count = self.mip_level_count();
        let mut levels = Vec::with_capacity(count as usize);
        levels.push(self.image.clone());

        let (mut width, mut height) = (self.width(), self.height());
        for _ in 1..count {
            width = (width / 2).max(1);
            height = (height / 2).max(1);
            let previous = levels.last().unwrap_or(&self.image);
            let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
            levels.push(next);
        }
        levels
    }
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: image.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in image.mip_chain().iter().enumerate() {
            let (aligned_data, aligned_bytes_per_row) = pad_rows(mip);
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &aligned_data,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_bytes_per_row),
                    rows_per_image: Some(mip.height()),
                },
                wgpu::Extent3d {
                    width: mip.width(),
                    height: mip.height(),
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Chair Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Copies rows into a buffer whose row pitch is a multiple of 256 bytes.
fn pad_rows(image: &RgbaImage) -> (Vec<u8>, u32) {
    let bytes_per_row = image.width() * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let aligned_bytes_per_row = (bytes_per_row + align - 1) / align * align;

    let row = bytes_per_row as usize;
    let pitch = aligned_bytes_per_row as usize;
    let height = image.height() as usize;
    let mut aligned_data = vec![0u8; pitch * height];

    let raw = image.as_raw();
    for y in 0..height {
        let src = &raw[y * row..(y + 1) * row];
        aligned_data[y * pitch..y * pitch + row].copy_from_slice(src);
    }

    (aligned_data, aligned_bytes_per_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_missing_file_is_reported() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.child("wood_texture.jpg");

        let err = TextureImage::load(missing.path()).unwrap_err();
        assert!(matches!(err, TextureError::Open { .. }));
        assert!(err.to_string().contains("wood_texture.jpg"));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("wood_texture.jpg");
        file.write_binary(b"definitely not a jpeg").unwrap();

        assert!(TextureImage::load(file.path()).is_err());
    }

    #[test]
    fn test_load_png() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("wood.png");
        RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]))
            .save(file.path())
            .unwrap();

        let texture = TextureImage::load(file.path()).unwrap();
        assert_eq!((texture.width(), texture.height()), (8, 4));
        assert_eq!(texture.image.get_pixel(3, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_fallback_to_placeholder() {
        let temp = assert_fs::TempDir::new().unwrap();
        let texture = TextureImage::load_or_placeholder(&temp.path().join("nope.jpg"));
        assert_eq!((texture.width(), texture.height()), (1, 1));
        assert_eq!(texture.image.get_pixel(0, 0).0, PLACEHOLDER_COLOR);
    }

    #[test]
    fn test_mip_chain() {
        let texture = TextureImage {
            image: RgbaImage::from_pixel(16, 4, image::Rgba([200, 100, 50, 255])),
        };
        assert_eq!(texture.mip_level_count(), 5);

        let sizes: Vec<(u32, u32)> = texture
            .mip_chain()
            .iter()
            .map(|m| (m.width(), m.height()))
            .collect();
        assert_eq!(sizes, vec![(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);

        assert_eq!(TextureImage::solid([0; 4]).mip_chain().len(), 1);
    }

    #[test]
    fn test_image_within_limit_is_kept() {
        let texture = TextureImage {
            image: RgbaImage::from_pixel(64, 32, image::Rgba([1, 2, 3, 255])),
        };
        assert!(texture.fit_within(64).is_none());
        assert!(texture.fit_within(8192).is_none());
    }

    #[test]
    fn test_oversized_image_is_downscaled() {
        let texture = TextureImage {
            image: RgbaImage::from_pixel(300, 100, image::Rgba([9, 8, 7, 255])),
        };
        let fitted = texture.fit_within(64).expect("300px wide exceeds a 64px limit");
        assert_eq!((fitted.width(), fitted.height()), (64, 21));
        assert_eq!(fitted.mip_level_count(), 7);
        assert_eq!(fitted.image.get_pixel(10, 10).0, [9, 8, 7, 255]);

        // A thin strip never collapses to zero height.
        let strip = TextureImage {
            image: RgbaImage::from_pixel(1000, 1, image::Rgba([0, 0, 0, 255])),
        };
        let fitted = strip.fit_within(100).expect("1000px wide exceeds a 100px limit");
        assert_eq!((fitted.width(), fitted.height()), (100, 1));
    }

    #[test]
    fn test_row_padding() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4]));
        let (data, pitch) = pad_rows(&image);
        assert_eq!(pitch, 256);
        assert_eq!(data.len(), 512);
        assert_eq!(&data[..4], &[1, 2, 3, 4]);
        assert_eq!(&data[256..260], &[1, 2, 3, 4]);
        assert_eq!(data[12], 0);
    }
}
