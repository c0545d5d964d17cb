//! Icon fetching and resizing.
//!
//! Every icon is fetched and decoded exactly once per generation run; all
//! density buckets are resized from that single decoded image.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

use super::fetch::{Fetch, FetchError};
use super::manifest::color::Color;

/// A fetched icon, decoded once and ready to be resized into any bucket.
#[derive(Debug)]
pub struct Icon {
    pub url: String,
    image: DynamicImage,
}

impl Icon {
    /// Downloads and decodes an icon. Non-200 responses, non-image content
    /// types and SVGs abort with a descriptive error.
    pub fn fetch(fetcher: &dyn Fetch, url: &str) -> Result<Self, FetchError> {
        let response = fetcher.fetch(url)?;
        if response.status != 200 {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        match response.content_type.as_deref() {
            Some(content_type) if content_type.starts_with("image/svg") => {
                return Err(FetchError::SvgUnsupported {
                    url: url.to_string(),
                })
            }
            Some(content_type) if content_type.starts_with("image/") => {}
            other => {
                return Err(FetchError::NotAnImage {
                    url: url.to_string(),
                    content_type: other.map(str::to_string),
                })
            }
        }

        let image = image::load_from_memory(&response.body).map_err(|err| {
            FetchError::Transport {
                url: url.to_string(),
                message: format!("failed to decode image: {err}"),
            }
        })?;

        Ok(Self {
            url: url.to_string(),
            image,
        })
    }

    #[cfg(test)]
    pub fn from_image(url: &str, image: DynamicImage) -> Self {
        Self {
            url: url.to_string(),
            image,
        }
    }

    /// Repaints every pixel with `color`, keeping the alpha channel. Used to
    /// turn a monochrome icon into a theme-colored notification icon.
    pub fn tinted(&self, color: Color) -> Self {
        let mut rgba = self.image.to_rgba8();
        for pixel in rgba.pixels_mut() {
            *pixel = Rgba([color.r, color.g, color.b, pixel[3]]);
        }
        Self {
            url: self.url.clone(),
            image: DynamicImage::ImageRgba8(rgba),
        }
    }

    /// Encodes the icon as a `size`x`size` PNG.
    ///
    /// With a `background` the resized image is flattened onto that color,
    /// which avoids fringed edges from non-premultiplied alpha when the
    /// splash screen is upscaled. Without one, transparency is kept as-is.
    pub fn to_png(&self, size: u32, background: Option<Color>) -> Result<Vec<u8>> {
        let resized = self.image.resize_exact(size, size, FilterType::Lanczos3);
        let output = match background {
            Some(color) => {
                let mut canvas =
                    RgbaImage::from_pixel(size, size, Rgba([color.r, color.g, color.b, 0xFF]));
                image::imageops::overlay(&mut canvas, &resized.to_rgba8(), 0, 0);
                DynamicImage::ImageRgba8(canvas)
            }
            None => resized,
        };

        let mut buf = Vec::new();
        output
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .with_context(|| format!("Encoding `{}` at {size}x{size}", self.url))?;
        Ok(buf)
    }

    /// Resizes the icon and writes it to `dest` under `target_dir`, creating
    /// parent directories as needed.
    pub fn write_png(
        &self,
        target_dir: &Path,
        dest: &str,
        size: u32,
        background: Option<Color>,
    ) -> Result<()> {
        let png = self.to_png(size, background)?;
        let dest_file = target_dir.join(dest);
        if let Some(parent) = dest_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating `{}`", parent.display()))?;
        }
        fs::write(&dest_file, png)
            .with_context(|| format!("Writing `{}`", dest_file.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::FetchResponse;
    use image::GenericImageView;

    struct StaticFetcher(FetchResponse);

    impl Fetch for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, pixel));
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn fetches_and_decodes_an_icon() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 200,
            content_type: Some("image/png".to_string()),
            body: png_bytes(64, 64, Rgba([0, 0, 255, 255])),
        });
        let icon = Icon::fetch(&fetcher, "https://pwa.example/icon.png").unwrap();
        assert_eq!(icon.image.dimensions(), (64, 64));
    }

    #[test]
    fn rejects_non_image_content_types() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            body: b"<html></html>".to_vec(),
        });
        let err = Icon::fetch(&fetcher, "https://pwa.example/icon.png").unwrap_err();
        assert!(matches!(err, FetchError::NotAnImage { .. }));
    }

    #[test]
    fn rejects_svgs_explicitly() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 200,
            content_type: Some("image/svg+xml".to_string()),
            body: b"<svg/>".to_vec(),
        });
        let err = Icon::fetch(&fetcher, "https://pwa.example/icon.svg").unwrap_err();
        assert!(matches!(err, FetchError::SvgUnsupported { .. }));
    }

    #[test]
    fn rejects_missing_content_types() {
        let fetcher = StaticFetcher(FetchResponse {
            status: 200,
            content_type: None,
            body: png_bytes(8, 8, Rgba([0, 0, 0, 255])),
        });
        let err = Icon::fetch(&fetcher, "https://pwa.example/icon.png").unwrap_err();
        assert!(matches!(err, FetchError::NotAnImage { .. }));
    }

    #[test]
    fn resizes_to_the_requested_bucket() {
        let icon = Icon::from_image(
            "icon",
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(512, 512, Rgba([255, 0, 0, 255]))),
        );
        let png = icon.to_png(48, None).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (48, 48));
    }

    #[test]
    fn preserves_transparency_without_a_background() {
        let icon = Icon::from_image(
            "icon",
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 0]))),
        );
        let png = icon.to_png(32, None).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(16, 16)[3], 0);
    }

    #[test]
    fn flattens_onto_the_background_color() {
        let icon = Icon::from_image(
            "icon",
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 0]))),
        );
        let png = icon.to_png(32, Some(Color::rgb(0x12, 0x34, 0x56))).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        let pixel = decoded.get_pixel(16, 16);
        assert_eq!(pixel[3], 255);
        assert_eq!((pixel[0], pixel[1], pixel[2]), (0x12, 0x34, 0x56));
    }

    #[test]
    fn tinting_repaints_rgb_and_keeps_alpha() {
        let icon = Icon::from_image(
            "icon",
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]))),
        );
        let tinted = icon.tinted(Color::rgb(0xAB, 0xCD, 0xEF));
        let rgba = tinted.image.to_rgba8();
        let pixel = rgba.get_pixel(0, 0);
        assert_eq!(
            (pixel[0], pixel[1], pixel[2], pixel[3]),
            (0xAB, 0xCD, 0xEF, 128)
        );
    }
}
