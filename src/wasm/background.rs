//! The hero background component: a [`RayRenderer`] driven by
//! `requestAnimationFrame`, gated on tab visibility and on-screen state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use super::render::{js_message, RayRenderer};
use crate::config::{RayVariant, RenderConfig};
use crate::error::{InitError, ScheduleError};
use crate::pointer::{self, PointerSpace, Rect};
use crate::scene::RayScene;
use crate::schedule::{FrameLoop, FrameScheduler};

/// `requestAnimationFrame` with a single, reusable callback.
pub(crate) struct RafScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
    pub(crate) fn new(window: &Window) -> Self {
        Self {
            window: window.clone(),
            callback: None,
        }
    }

    pub(crate) fn attach(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request(&mut self) -> Result<i32, ScheduleError> {
        let callback = self.callback.as_ref().ok_or(ScheduleError::Detached)?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| ScheduleError::Rejected(js_message(&e)))
    }

    fn cancel(&mut self, handle: i32) {
        let _ = self.window.cancel_animation_frame(handle);
    }
}

struct Inner {
    renderer: RayRenderer,
    scene: RayScene,
    frames: FrameLoop<i32>,
    scheduler: RafScheduler,
    page_visible: bool,
    on_screen: bool,
}

impl Inner {
    fn frame(&mut self, timestamp: f64) {
        if !self.frames.begin_frame() {
            return;
        }
        let uniforms = self.scene.advance(timestamp);
        self.renderer.draw(&uniforms);
        if let Err(err) = self.frames.end_frame(&mut self.scheduler) {
            tracing::warn!(error = %err, "ray background stopped");
        }
    }

    fn start(&mut self) {
        if self.frames.is_running() {
            return;
        }
        self.set_displayed(true);
        self.resize(false);
        if let Err(err) = self.frames.start(&mut self.scheduler) {
            tracing::warn!(error = %err, "ray background could not start");
            self.set_displayed(false);
        }
    }

    fn stop(&mut self) {
        self.frames.stop(&mut self.scheduler);
        self.renderer.clear();
        self.set_displayed(false);
    }

    fn apply_gate(&mut self) {
        if self.page_visible && self.on_screen {
            self.start();
        } else {
            self.stop();
        }
    }

    fn resize(&mut self, force: bool) {
        let (width, height) = self.renderer.css_size();
        let dpr = self.scheduler.window().device_pixel_ratio();
        if self.scene.resize(width, height, dpr) || force {
            let surface = self.scene.surface();
            self.renderer.apply_surface(&surface);
            tracing::debug!(width = surface.width, height = surface.height, "ray surface resized");
        }
    }

    fn set_displayed(&self, displayed: bool) {
        let display = if displayed { "block" } else { "none" };
        let _ = self
            .renderer
            .canvas()
            .style()
            .set_property("display", display);
    }

    fn pointer_frame(&self) -> Rect {
        match self.scene.config().variant.pointer_space() {
            PointerSpace::Element => {
                let rect = self.renderer.canvas().get_bounding_client_rect();
                Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
            }
            PointerSpace::Viewport => {
                let window = self.scheduler.window();
                let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                Rect::new(0.0, 0.0, dim(window.inner_width()), dim(window.inner_height()))
            }
        }
    }
}

/// Animated light-ray background bound to one canvas. A background whose
/// initialization failed is disabled: every method is then a no-op.
#[derive(Clone)]
pub struct HeroBackground {
    inner: Option<Rc<RefCell<Inner>>>,
    variant: RayVariant,
}

impl HeroBackground {
    /// Build the renderer on `canvas`. Failure is logged and yields a
    /// disabled background; it is never retried.
    pub fn mount(window: &Window, canvas: web_sys::HtmlCanvasElement, config: RenderConfig) -> Self {
        let result = RayRenderer::initialize(canvas, &config);
        Self::from_init(window, config, result)
    }

    pub fn from_init(
        window: &Window,
        config: RenderConfig,
        result: Result<RayRenderer, InitError>,
    ) -> Self {
        let variant = config.variant;
        match result {
            Ok(renderer) => {
                tracing::info!(variant = variant.id(), name = variant.name(), "ray background initialized");
                Self::attach(window, renderer, config)
            }
            Err(err) => {
                tracing::error!(variant = variant.id(), error = %err, "ray background disabled");
                Self::disabled(variant)
            }
        }
    }

    pub fn disabled(variant: RayVariant) -> Self {
        Self {
            inner: None,
            variant,
        }
    }

    fn attach(window: &Window, renderer: RayRenderer, config: RenderConfig) -> Self {
        let variant = config.variant;
        let start_ms = window.performance().map(|p| p.now()).unwrap_or(0.0);
        let inner = Rc::new(RefCell::new(Inner {
            renderer,
            scene: RayScene::new(config, start_ms),
            frames: FrameLoop::new(),
            scheduler: RafScheduler::new(window),
            page_visible: true,
            on_screen: true,
        }));

        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&inner);
        let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.frame(timestamp);
                }
            }
        });
        {
            let mut inner = inner.borrow_mut();
            inner.scheduler.attach(callback);
            inner.resize(true);
        }

        Self {
            inner: Some(inner),
            variant,
        }
    }

    pub fn variant(&self) -> RayVariant {
        self.variant
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.with(|inner| inner.frames.is_running()).unwrap_or(false)
    }

    /// Backing-store size currently applied to the canvas.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.with(|inner| {
            let surface = inner.scene.surface();
            (surface.width, surface.height)
        })
    }

    pub fn start(&self) {
        self.with(Inner::start);
    }

    pub fn stop(&self) {
        self.with(Inner::stop);
    }

    /// Re-read the canvas box and device-pixel ratio.
    pub fn resize(&self) {
        self.with(|inner| inner.resize(false));
    }

    /// Raw pointer target the smoothing is heading for.
    pub fn pointer_target(&self) -> Option<[f32; 2]> {
        self.with(|inner| inner.scene.pointer().target())
    }

    /// Normalized (0..1) pointer target.
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.with(|inner| inner.scene.pointer_move(x, y));
    }

    /// Pointer target from client coordinates, normalized in the variant's
    /// pointer space. Ignored while the host is off screen.
    pub fn pointer_at_client(&self, client_x: f64, client_y: f64) {
        self.with(|inner| {
            if !inner.on_screen {
                return;
            }
            let space = inner.scene.config().variant.pointer_space();
            if let Some([x, y]) = pointer::normalize(client_x, client_y, inner.pointer_frame(), space) {
                inner.scene.pointer_move(x, y);
            }
        });
    }

    pub fn set_page_visible(&self, visible: bool) {
        self.with(|inner| {
            inner.page_visible = visible;
            inner.apply_gate();
        });
    }

    pub fn set_on_screen(&self, on_screen: bool) {
        self.with(|inner| {
            inner.on_screen = on_screen;
            inner.apply_gate();
        });
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Option<R> {
        let inner = self.inner.as_ref()?;
        let mut inner = inner.try_borrow_mut().ok()?;
        Some(f(&mut inner))
    }
}

impl Drop for HeroBackground {
    fn drop(&mut self) {
        if let Some(inner) = &self.inner {
            // last handle: no frame may fire into a dropped callback
            if Rc::strong_count(inner) == 1 {
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.stop();
                }
            }
        }
    }
}
