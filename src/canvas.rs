//! Paint scheduling for a scene bound to one drawing surface.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::lock::Mutex;
use log::{debug, info, warn};

use crate::color::Color;
use crate::config::CanvasConfig;
use crate::error::SceneResult;
use crate::image::ImageLoader;
use crate::persistence::SceneRecord;
use crate::renderer::{Renderer, Size};
use crate::scene::{PaintReport, Scene};
use crate::shape::{PaintContext, Shape, ShapeId};

struct Surface<R> {
    scene: Scene,
    renderer: R,
}

/// A scene, the renderer it paints to and the loader its images come from.
///
/// Paints never overlap: a paint requested while another is running waits
/// for it and then runs in full. Requests are never dropped.
pub struct Canvas<R, L> {
    surface: Mutex<Surface<R>>,
    images: L,
    config: CanvasConfig,
    background: Color,
    queued: parking_lot::Mutex<usize>,
}

impl<R: Renderer, L: ImageLoader> Canvas<R, L> {
    pub fn new(scene: Scene, renderer: R, images: L, config: CanvasConfig) -> Self {
        let background = Color::parse(&config.background).unwrap_or_else(|err| {
            warn!("bad background color: {err}; using white");
            Color::WHITE
        });

        Self {
            surface: Mutex::new(Surface { scene, renderer }),
            images,
            config,
            background,
            queued: parking_lot::Mutex::new(0),
        }
    }

    /// An empty canvas whose scene takes the configured viewport ratio.
    pub fn empty(renderer: R, images: L, config: CanvasConfig) -> Self {
        let scene = Scene::with_viewport_ratio(config.viewport_ratio);
        Self::new(scene, renderer, images, config)
    }

    /// A canvas showing a persisted scene. Records without a viewport ratio
    /// get the configured one.
    pub fn load(record: SceneRecord, renderer: R, images: L, config: CanvasConfig) -> SceneResult<Self> {
        let scene = Scene::deserialize_with_ratio(record, config.viewport_ratio)?;
        Ok(Self::new(scene, renderer, images, config))
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Paint requests currently waiting behind an active paint.
    pub fn queued_paints(&self) -> usize {
        *self.queued.lock()
    }

    /// Paint the whole scene, after any paint already in progress.
    pub async fn draw_scene(&self) -> PaintReport {
        let mut surface = match self.surface.try_lock() {
            Some(surface) => surface,
            None => {
                let _waiting = Queued::enter(&self.queued);
                debug!("paint already in progress; queued");
                self.surface.lock().await
            }
        };

        let Surface { scene, renderer } = &mut *surface;
        let ctx = PaintContext::new(&self.images, &self.config.nibs);
        scene.paint(renderer, &ctx, &self.background).await
    }

    /// Resize the surface to `width` pixels, keeping the scene's aspect
    /// ratio, and repaint once the host has had a turn to settle.
    pub async fn set_size(&self, width: f64) -> PaintReport {
        {
            let mut surface = self.surface.lock().await;
            let height = (width / surface.scene.viewport_ratio()).round();
            info!("resizing canvas to {width}x{height}");
            surface.renderer.resize(Size::new(width, height));
        }

        yield_now().await;
        self.draw_scene().await
    }

    pub async fn size(&self) -> Size {
        self.surface.lock().await.renderer.size()
    }

    pub async fn add_shape(&self, shape: Shape) -> ShapeId {
        self.surface.lock().await.scene.add_shape(shape)
    }

    /// Run `f` against the scene between paints.
    pub async fn with_scene<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        f(&mut self.surface.lock().await.scene)
    }

    /// Run `f` against the renderer between paints.
    pub async fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.surface.lock().await.renderer)
    }

    pub async fn to_record(&self) -> SceneResult<SceneRecord> {
        self.surface.lock().await.scene.serialize()
    }

    pub fn into_parts(self) -> (Scene, R) {
        let Surface { scene, renderer } = self.surface.into_inner();
        (scene, renderer)
    }
}

/// Counts one waiting paint for as long as it lives, so a waiter that is
/// dropped before its turn is not counted forever.
struct Queued<'a>(&'a parking_lot::Mutex<usize>);

impl<'a> Queued<'a> {
    fn enter(count: &'a parking_lot::Mutex<usize>) -> Self {
        *count.lock() += 1;
        Self(count)
    }
}

impl Drop for Queued<'_> {
    fn drop(&mut self) {
        *self.0.lock() -= 1;
    }
}

/// Completes on its second poll, giving other tasks one turn.
fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
