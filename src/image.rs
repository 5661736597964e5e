//! Bitmap loading for image shapes.
//!
//! Shapes ask an [`ImageLoader`] for a decoded bitmap and wait on the returned
//! future. The bundled [`FileImageLoader`] reads files from disk with the `image`
//! crate, extracts the EXIF orientation as a correction [`Transform`] and keeps
//! the decoded bitmap inside a pixel budget.

use std::f64::consts::{FRAC_PI_2, PI};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage};
use log::{debug, info};

use crate::config::ImageConfig;
use crate::error::ImageLoadError;
use crate::transform::Transform;

/// Decoded pixels handed to [`crate::Renderer::draw_image`].
pub type Bitmap = RgbaImage;

/// Grey of the substitute bitmap.
const PLACEHOLDER_GREY: u8 = 0xdc;

/// What to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    /// The fixed bitmap substituted after a failed load.
    Placeholder,
}

/// A decoded bitmap plus the orientation correction read from its metadata.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bitmap: Arc<Bitmap>,
    pub orientation: Option<Transform>,
}

impl LoadedImage {
    pub fn new(bitmap: Bitmap) -> Self {
        Self { bitmap: Arc::new(bitmap), orientation: None }
    }

    pub fn with_orientation(mut self, orientation: Option<Transform>) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Asynchronous bitmap source.
///
/// Painting is single threaded, so the returned future does not need to be `Send`.
pub trait ImageLoader {
    fn load<'a>(&'a self, source: &'a ImageSource) -> LocalBoxFuture<'a, Result<LoadedImage, ImageLoadError>>;
}

/// Loads images from the local filesystem.
///
/// Relative references resolve against `root`; `file://` prefixes are stripped.
/// Remote and `data:` references are rejected as unsupported.
#[derive(Debug, Clone)]
pub struct FileImageLoader {
    root: PathBuf,
    config: ImageConfig,
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, ImageConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: ImageConfig) -> Self {
        Self { root: root.into(), config }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, ImageLoadError> {
        let lower = url.to_ascii_lowercase();
        if ["http:", "https:", "data:", "blob:"].iter().any(|scheme| lower.starts_with(scheme)) {
            return Err(ImageLoadError::Unsupported(url.to_string()));
        }

        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        Ok(if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) })
    }

    fn load_file(&self, path: &Path) -> Result<LoadedImage, ImageLoadError> {
        let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;

        let orientation = match decoder.orientation() {
            Ok(orientation) => orientation_transform(orientation),
            Err(err) => {
                debug!("no orientation metadata for {}: {err}", path.display());
                None
            }
        };

        let image = DynamicImage::from_decoder(decoder)?;
        let bitmap = downscale(image.into_rgba8(), self.config.max_pixels());

        info!("loaded {} ({}x{})", path.display(), bitmap.width(), bitmap.height());
        Ok(LoadedImage::new(bitmap).with_orientation(orientation))
    }
}

impl ImageLoader for FileImageLoader {
    fn load<'a>(&'a self, source: &'a ImageSource) -> LocalBoxFuture<'a, Result<LoadedImage, ImageLoadError>> {
        async move {
            match source {
                ImageSource::Placeholder => Ok(LoadedImage::new(placeholder(self.config.placeholder_size))),
                ImageSource::Url(url) => {
                    let path = self.resolve(url)?;
                    self.load_file(&path)
                }
            }
        }
        .boxed_local()
    }
}

/// Correction matrix for an EXIF orientation: an optional horizontal flip
/// followed by a rotation. `None` when no correction is needed.
pub fn orientation_transform(orientation: Orientation) -> Option<Transform> {
    let (rotation, flip) = match orientation {
        Orientation::NoTransforms => return None,
        Orientation::FlipHorizontal => (0.0, true),
        Orientation::Rotate180 => (PI, false),
        Orientation::FlipVertical => (PI, true),
        Orientation::Rotate90FlipH => (FRAC_PI_2, true),
        Orientation::Rotate90 => (FRAC_PI_2, false),
        Orientation::Rotate270FlipH => (3.0 * FRAC_PI_2, true),
        Orientation::Rotate270 => (3.0 * FRAC_PI_2, false),
        #[allow(unreachable_patterns)]
        _ => return None,
    };

    let mut transform = Transform::identity();
    if flip {
        transform.scale(-1.0, Some(1.0));
    }
    transform.rotate(rotation);
    Some(transform)
}

/// Shrink `bitmap` so it holds at most `max_pixels`, keeping its aspect ratio.
pub fn downscale(bitmap: Bitmap, max_pixels: u64) -> Bitmap {
    let (width, height) = bitmap.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels <= max_pixels || pixels == 0 {
        return bitmap;
    }

    let factor = (max_pixels as f64 / pixels as f64).sqrt();
    let new_width = ((f64::from(width) * factor).floor() as u32).max(1);
    let new_height = ((f64::from(height) * factor).floor() as u32).max(1);

    debug!("downscaling {width}x{height} to {new_width}x{new_height}");
    imageops::resize(&bitmap, new_width, new_height, FilterType::Triangle)
}

/// Flat grey square used in place of a broken image.
pub fn placeholder(side: u32) -> Bitmap {
    RgbaImage::from_pixel(side, side, Rgba([PLACEHOLDER_GREY, PLACEHOLDER_GREY, PLACEHOLDER_GREY, 0xff]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_downscale_respects_budget() {
        let big = RgbaImage::new(400, 300);
        let small = downscale(big, 100 * 75);
        assert_eq!(small.dimensions(), (100, 75));
    }

    #[test]
    fn test_downscale_keeps_small_images() {
        let image = RgbaImage::new(10, 10);
        assert_eq!(downscale(image, 1000).dimensions(), (10, 10));
    }

    #[test]
    fn test_orientation_transforms() {
        assert!(orientation_transform(Orientation::NoTransforms).is_none());

        let rotated = orientation_transform(Orientation::Rotate90).unwrap();
        assert!((rotated.decompose_rotation() - FRAC_PI_2).abs() < 1e-9);

        let flipped = orientation_transform(Orientation::FlipHorizontal).unwrap();
        let (x, y) = flipped.apply(1.0, 1.0);
        assert!((x + 1.0).abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder_always_loads() {
        let loader = FileImageLoader::new(std::env::temp_dir());
        let loaded = block_on(loader.load(&ImageSource::Placeholder)).unwrap();
        assert_eq!(loaded.bitmap.dimensions(), (239, 239));
        assert!(loaded.orientation.is_none());
    }

    #[test]
    fn test_remote_urls_are_unsupported() {
        let loader = FileImageLoader::new(std::env::temp_dir());
        let source = ImageSource::Url("https://example.com/a.png".into());
        assert!(matches!(block_on(loader.load(&source)), Err(ImageLoadError::Unsupported(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = FileImageLoader::new(std::env::temp_dir());
        let source = ImageSource::Url("definitely-not-here-7f3a.png".into());
        assert!(matches!(block_on(loader.load(&source)), Err(ImageLoadError::Io(_))));
    }
}
