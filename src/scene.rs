use crate::config::RenderConfig;
use crate::pointer::PointerState;
use crate::surface::SurfaceState;

/// Per-frame values uploaded to the fragment stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    /// Elapsed seconds scaled by the configured speed.
    pub time: f32,
    /// Backing-store size in device pixels.
    pub resolution: [f32; 2],
    /// Smoothed pointer position.
    pub pointer: [f32; 2],
}

/// Mutable state behind one ray background: config, pointer, surface, and
/// the clock origin. Knows nothing about GL.
#[derive(Clone, Debug)]
pub struct RayScene {
    config: RenderConfig,
    pointer: PointerState,
    surface: SurfaceState,
    start_ms: f64,
}

impl RayScene {
    /// `start_ms` must come from the same clock as frame timestamps.
    pub fn new(config: RenderConfig, start_ms: f64) -> Self {
        Self {
            config,
            pointer: PointerState::new(),
            surface: SurfaceState::default(),
            start_ms,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn surface(&self) -> SurfaceState {
        self.surface
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.set_target(x, y);
    }

    /// Returns true when the backing store size changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> bool {
        self.surface
            .resize(css_width, css_height, dpr, self.config.dpr_cap)
    }

    pub fn elapsed(&self, timestamp_ms: f64) -> f32 {
        let seconds = ((timestamp_ms - self.start_ms) * 0.001).max(0.0);
        (seconds * f64::from(self.config.speed)) as f32
    }

    /// Advance one frame: smooth the pointer and produce the uniforms.
    pub fn advance(&mut self, timestamp_ms: f64) -> FrameUniforms {
        self.pointer.step(self.config.smoothing);
        FrameUniforms {
            time: self.elapsed(timestamp_ms),
            resolution: self.surface.resolution(),
            pointer: self.pointer.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_scaled_by_speed() {
        let scene = RayScene::new(RenderConfig::cone(), 1_000.0);
        assert!((scene.elapsed(3_000.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn timestamps_before_start_clamp_to_zero() {
        let scene = RayScene::new(RenderConfig::skew(), 1_000.0);
        assert_eq!(scene.elapsed(990.0), 0.0);
    }

    #[test]
    fn advance_smooths_once_per_frame() {
        let mut scene = RayScene::new(RenderConfig::skew(), 0.0);
        scene.pointer_move(1.0, 0.5);
        let uniforms = scene.advance(16.0);
        assert!((uniforms.pointer[0] - 0.55).abs() < 1e-6);
        assert_eq!(uniforms.pointer[1], 0.5);
        let uniforms = scene.advance(32.0);
        assert!((uniforms.pointer[0] - 0.595).abs() < 1e-6);
    }

    #[test]
    fn resize_uses_the_variant_cap() {
        let mut cone = RayScene::new(RenderConfig::cone(), 0.0);
        let mut skew = RayScene::new(RenderConfig::skew(), 0.0);
        cone.resize(1000.0, 500.0, 3.0);
        skew.resize(1000.0, 500.0, 3.0);
        assert_eq!(cone.advance(0.0).resolution, [2000.0, 1000.0]);
        assert_eq!(skew.advance(0.0).resolution, [1500.0, 750.0]);
    }
}
