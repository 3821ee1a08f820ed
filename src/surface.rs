//! Backing-store sizing for the drawable surface.

/// Backing-store pixel size for a box of `css_width` x `css_height` CSS
/// pixels: `ceil(css * min(dpr, cap))` per axis, never below 1. A missing or
/// nonsensical ratio counts as 1.
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64, cap: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let scale = dpr.min(cap);
    (scale_axis(css_width, scale), scale_axis(css_height, scale))
}

fn scale_axis(css: f64, scale: f64) -> u32 {
    let px = (css.max(0.0) * scale).ceil();
    if px.is_finite() {
        (px as u32).max(1)
    } else {
        1
    }
}

/// Media query that stops matching once the device-pixel ratio moves away
/// from `dpr`.
pub fn dpr_media_query(dpr: f64) -> String {
    format!("(resolution: {dpr}dppx)")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceState {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

impl SurfaceState {
    /// Recompute the backing size. Returns true if it changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64, cap: f64) -> bool {
        let (width, height) = backing_size(css_width, css_height, dpr, cap);
        let changed = width != self.width || height != self.height;
        self.width = width;
        self.height = height;
        changed
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}
