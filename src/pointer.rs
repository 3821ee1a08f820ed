//! Pointer target and its exponentially smoothed follower.

/// Coordinate frame pointer positions are normalized against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerSpace {
    /// Relative to the host element, Y flipped so 0 is the bottom edge.
    Element,
    /// Relative to the window, Y growing downwards.
    Viewport,
}

/// Axis-aligned box in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True when the box lies entirely within a `width` x `height` viewport.
    pub fn fully_inside(&self, width: f64, height: f64) -> bool {
        self.top >= 0.0
            && self.left >= 0.0
            && self.top + self.height <= height
            && self.left + self.width <= width
    }
}

/// Map a client-space position into `0..1` coordinates. `frame` is the host
/// element's box for [`PointerSpace::Element`] and the window box for
/// [`PointerSpace::Viewport`]. Out-of-frame positions are not clamped.
pub fn normalize(client_x: f64, client_y: f64, frame: Rect, space: PointerSpace) -> Option<[f32; 2]> {
    if frame.width <= 0.0 || frame.height <= 0.0 {
        return None;
    }
    let x = (client_x - frame.left) / frame.width;
    let y = (client_y - frame.top) / frame.height;
    match space {
        PointerSpace::Element => Some([x as f32, (1.0 - y) as f32]),
        PointerSpace::Viewport => Some([x as f32, y as f32]),
    }
}

/// One exponential smoothing step of `current` toward `target`.
#[inline]
pub fn smooth(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerState {
    target: [f32; 2],
    current: [f32; 2],
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            target: [0.5, 0.5],
            current: [0.5, 0.5],
        }
    }
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the raw target. Values outside `0..1` are kept as given.
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target = [x, y];
    }

    pub fn step(&mut self, smoothing: f32) {
        self.current[0] = smooth(self.current[0], self.target[0], smoothing);
        self.current[1] = smooth(self.current[1], self.target[1], smoothing);
    }

    pub fn target(&self) -> [f32; 2] {
        self.target
    }

    pub fn current(&self) -> [f32; 2] {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_stored_verbatim() {
        let mut pointer = PointerState::new();
        for (x, y) in [(0.0, 0.0), (0.5, 0.5), (1.0, 1.0), (-0.25, 1.75)] {
            pointer.set_target(x, y);
            assert_eq!(pointer.target(), [x, y]);
        }
    }

    #[test]
    fn step_moves_a_fraction_of_the_gap() {
        let mut pointer = PointerState::new();
        pointer.set_target(1.0, 0.0);
        pointer.step(0.1);
        let [x, y] = pointer.current();
        assert!((x - 0.55).abs() < 1e-6);
        assert!((y - 0.45).abs() < 1e-6);
    }

    #[test]
    fn step_does_not_touch_target() {
        let mut pointer = PointerState::new();
        pointer.set_target(0.2, 0.9);
        for _ in 0..10 {
            pointer.step(0.05);
        }
        assert_eq!(pointer.target(), [0.2, 0.9]);
    }

    #[test]
    fn element_space_flips_y() {
        let rect = Rect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(normalize(100.0, 50.0, rect, PointerSpace::Element), Some([0.0, 1.0]));
        assert_eq!(normalize(300.0, 150.0, rect, PointerSpace::Element), Some([1.0, 0.0]));
    }

    #[test]
    fn viewport_space_keeps_y() {
        let window = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(normalize(400.0, 150.0, window, PointerSpace::Viewport), Some([0.5, 0.25]));
    }

    #[test]
    fn degenerate_frame_is_ignored() {
        let rect = Rect::new(0.0, 0.0, 0.0, 100.0);
        assert_eq!(normalize(10.0, 10.0, rect, PointerSpace::Element), None);
    }

    #[test]
    fn fully_inside_checks_every_edge() {
        assert!(Rect::new(0.0, 0.0, 100.0, 100.0).fully_inside(100.0, 100.0));
        assert!(!Rect::new(-1.0, 0.0, 50.0, 50.0).fully_inside(100.0, 100.0));
        assert!(!Rect::new(0.0, 60.0, 50.0, 50.0).fully_inside(100.0, 100.0));
    }
}
