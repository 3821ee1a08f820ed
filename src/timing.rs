//! Small helpers for scroll-driven navigation state.

/// Scroll offset past which the navigation bar is marked `scrolled`.
pub const SCROLLED_AFTER_PX: f64 = 50.0;
/// Offset added to the scroll position when picking the active section.
pub const ACTIVE_SECTION_OFFSET_PX: f64 = 100.0;

/// Leading-edge throttle: the first call passes, later calls are dropped
/// until `limit_ms` has elapsed.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    limit_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(limit_ms: f64) -> Self {
        Self {
            limit_ms,
            last_ms: None,
        }
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.limit_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

/// A page section's vertical extent.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionSpan {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

pub fn is_scrolled(scroll_y: f64) -> bool {
    scroll_y > SCROLLED_AFTER_PX
}

/// Id of the section under `scroll_y + 100`. When spans overlap the last
/// one in document order wins.
pub fn active_section(scroll_y: f64, sections: &[SectionSpan]) -> Option<&str> {
    let marker = scroll_y + ACTIVE_SECTION_OFFSET_PX;
    sections
        .iter()
        .filter(|s| marker >= s.top && marker < s.top + s.height)
        .last()
        .map(|s| s.id.as_str())
}

/// Parallax is skipped on viewports narrower than this.
pub const PARALLAX_MIN_WIDTH_PX: f64 = 768.0;

pub fn parallax_enabled(viewport_width: f64) -> bool {
    viewport_width >= PARALLAX_MIN_WIDTH_PX
}

/// Vertical shift of the `index`-th parallax layer: deeper layers move faster.
pub fn parallax_offset(scroll_y: f64, index: usize) -> f64 {
    scroll_y * (index as f64 + 1.0) * 0.1
}

/// Selector for an in-page anchor `href`. A bare `#` and non-fragment
/// links yield `None`.
pub fn anchor_selector(href: &str) -> Option<&str> {
    let href = href.trim();
    (href.starts_with('#') && href.len() > 1).then_some(href)
}

/// Document scroll position that puts a target whose top is at
/// `target_top` (viewport coordinates) right below a fixed nav bar.
pub fn anchor_scroll_top(target_top: f64, scroll_y: f64, nav_height: f64) -> f64 {
    target_top + scroll_y - nav_height
}
