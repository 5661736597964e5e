use log::{debug, error, warn};

use crate::error::ShapeResult;
use crate::geometry::BBox;
use crate::image::{ImageLoader, ImageSource, LoadedImage};
use crate::renderer::Renderer;
use crate::transform::Transform;

/// A bitmap referenced by url, centered on the origin at its pixel size.
#[derive(Debug, Clone, Default)]
pub struct Image {
    url: Option<String>,
    loaded: Option<LoadedImage>,
}

impl Image {
    pub(crate) fn new(url: Option<String>) -> Self {
        Self { url, loaded: None }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Point at a different bitmap. The cached decode is dropped.
    pub fn set_url(&mut self, url: Option<String>) {
        if self.url != url {
            self.loaded = None;
        }
        self.url = url;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn loaded(&self) -> Option<&LoadedImage> {
        self.loaded.as_ref()
    }

    /// Orientation correction of the decoded bitmap, if any.
    pub fn orientation(&self) -> Option<&Transform> {
        self.loaded.as_ref().and_then(|loaded| loaded.orientation.as_ref())
    }

    /// Make sure a bitmap is available. Returns `false` when there is nothing
    /// to draw.
    ///
    /// A failed load is retried once with the placeholder bitmap; if that
    /// fails too the error is returned.
    pub(crate) async fn ensure_loaded(&mut self, loader: &dyn ImageLoader) -> ShapeResult<bool> {
        if self.loaded.is_some() {
            return Ok(true);
        }
        let Some(url) = self.url.clone() else {
            debug!("image shape has no url; nothing to draw");
            return Ok(false);
        };

        let loaded = match loader.load(&ImageSource::Url(url.clone())).await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!("failed to load image {url}: {err}; using placeholder");
                match loader.load(&ImageSource::Placeholder).await {
                    Ok(placeholder) => placeholder,
                    Err(err) => {
                        error!("placeholder for {url} failed to load: {err}");
                        return Err(err.into());
                    }
                }
            }
        };

        self.loaded = Some(loaded);
        Ok(true)
    }

    pub(crate) fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) -> Option<BBox> {
        let loaded = self.loaded.as_ref()?;
        let w = f64::from(loaded.bitmap.width());
        let h = f64::from(loaded.bitmap.height());
        let (x, y) = (-w / 2.0, -h / 2.0);

        renderer.draw_image(&loaded.bitmap, x, y);
        Some(BBox::new(x, y, w, h))
    }
}
