//! Composes the landing page: the hero background plus the scroll-driven
//! widgets. Everything registered here is owned by [`Page`] and released
//! when it is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, EventTarget, HtmlElement, HtmlImageElement, HtmlMediaElement, ScrollBehavior,
    ScrollToOptions, Window,
};

use super::background::{HeroBackground, RafScheduler};
use super::events::{self, Debounced, DprWatch, ObserverSubscription, Subscription};
use super::render::js_message;
use crate::config::{RayVariant, RenderConfig};
use crate::counter::{parse_leading_int, CounterAnimation, DEFAULT_DURATION_MS};
use crate::pointer::{PointerSpace, Rect};
use crate::schedule::FrameLoop;
use crate::timing::{self, SectionSpan, Throttle};
use crate::typewriter::{Typewriter, TypewriterOptions};

const RESIZE_DEBOUNCE_MS: i32 = 100;
const REVEAL_SETTLE_MS: i32 = 2000;
const NAV_THROTTLE_MS: f64 = 100.0;
const CURSOR_BLINK: &str = "cursorBlink 1000ms step-end infinite";

pub struct Page {
    background: Option<HeroBackground>,
    _counters: Option<Rc<RefCell<CounterBoard>>>,
    _typing: Vec<TypingEffect>,
    listeners: Vec<Subscription>,
    observers: Vec<ObserverSubscription>,
    _resize: Option<Debounced>,
    _dpr: Option<DprWatch>,
}

impl Page {
    pub fn mount(window: &Window, document: &Document) -> Result<Self, JsValue> {
        let mut page = Self {
            background: None,
            _counters: None,
            _typing: Vec::new(),
            listeners: Vec::new(),
            observers: Vec::new(),
            _resize: None,
            _dpr: None,
        };

        let carousel = Rc::new(RefCell::new(Carousel::new(document)));
        page.mount_background(window, document, &carousel)?;
        page.mount_reveal(window, document)?;
        page.mount_spin(document)?;
        page.mount_carousel(&carousel)?;
        page.mount_lazy_images(document)?;
        page.mount_counters(window, document)?;
        page.mount_typing(window, document)?;
        page.mount_nav(window, document)?;
        page.mount_smooth_scroll(window, document)?;
        page.mount_parallax(window, document)?;
        page.mount_video(window, document)?;

        tracing::info!(
            listeners = page.listeners.len(),
            observers = page.observers.len(),
            "page mounted"
        );
        Ok(page)
    }

    fn mount_background(
        &mut self,
        window: &Window,
        document: &Document,
        carousel: &Rc<RefCell<Carousel>>,
    ) -> Result<(), JsValue> {
        // The visibility listener also drives the carousel, with or without a hero.
        let background = match document.get_element_by_id("hero-canvas") {
            Some(canvas) => match canvas.dyn_into::<web_sys::HtmlCanvasElement>() {
                Ok(canvas) => Some(self.mount_hero(window, document, canvas)?),
                Err(_) => {
                    tracing::warn!("#hero-canvas is not a canvas");
                    None
                }
            },
            None => None,
        };

        let hero = background.clone();
        let carousel = carousel.clone();
        self.listeners.push(events::on_visibility(document, move |visible| {
            if let Some(hero) = &hero {
                hero.set_page_visible(visible);
            }
            carousel.borrow_mut().set_tab_visible(visible);
        })?);

        self.background = background;
        Ok(())
    }

    fn mount_hero(
        &mut self,
        window: &Window,
        document: &Document,
        canvas: web_sys::HtmlCanvasElement,
    ) -> Result<HeroBackground, JsValue> {
        let config = canvas_config(&canvas);
        let variant = config.variant;
        let host = hero_host(document, &canvas);
        let pointer_target: EventTarget = match variant.pointer_space() {
            PointerSpace::Element => canvas
                .closest(".hero")
                .ok()
                .flatten()
                .map(EventTarget::from)
                .unwrap_or_else(|| document.clone().into()),
            PointerSpace::Viewport => document.clone().into(),
        };

        let background = HeroBackground::mount(window, canvas, config);
        if !background.is_enabled() {
            return Ok(background);
        }

        let hero = background.clone();
        self.listeners
            .extend(events::on_pointer(&pointer_target, move |x, y| hero.pointer_at_client(x, y))?);

        let hero = background.clone();
        self._resize = Some(events::on_resize_debounced(window, RESIZE_DEBOUNCE_MS, move || {
            hero.resize()
        })?);

        let hero = background.clone();
        self._dpr = Some(events::on_dpr_change(window, move || hero.resize())?);

        if let Some(host) = host {
            let hero = background.clone();
            self.observers
                .push(events::on_intersection(&host, 0.0, move |on_screen| hero.set_on_screen(on_screen))?);
        }

        // starts the loop unless the tab is hidden
        background.set_page_visible(!document.hidden());
        Ok(background)
    }

    fn mount_reveal(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let elements = query_all(document, ".animate-on-scroll");
        if elements.is_empty() {
            return Ok(());
        }
        let window = window.clone();
        self.observers
            .push(ObserverSubscription::observe_all(&elements, 0.1, move |entry, observer| {
                if !entry.is_intersecting() {
                    return;
                }
                let target = entry.target();
                let _ = target.class_list().add_1("visible");
                observer.unobserve(&target);

                // drop the transition once the reveal has played out
                let settle = Closure::once_into_js(move || {
                    if let Some(el) = target.dyn_ref::<HtmlElement>() {
                        let _ = el.style().set_property("transition", "none");
                    }
                });
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    settle.unchecked_ref(),
                    REVEAL_SETTLE_MS,
                );
            })?);
        Ok(())
    }

    fn mount_spin(&mut self, document: &Document) -> Result<(), JsValue> {
        let elements = query_all(document, ".badge-glow, .step-node-glow, .step-node-ring");
        if elements.is_empty() {
            return Ok(());
        }
        self.observers
            .push(ObserverSubscription::observe_all(&elements, 0.1, |entry, _| {
                let _ = entry
                    .target()
                    .class_list()
                    .toggle_with_force("is-spinning", entry.is_intersecting());
            })?);
        Ok(())
    }

    fn mount_carousel(&mut self, carousel: &Rc<RefCell<Carousel>>) -> Result<(), JsValue> {
        let elements: Vec<Element> = carousel
            .borrow()
            .tracks
            .iter()
            .map(|(track, _)| track.clone().into())
            .collect();
        if elements.is_empty() {
            return Ok(());
        }
        let carousel = carousel.clone();
        self.observers
            .push(ObserverSubscription::observe_all(&elements, 0.0, move |entry, _| {
                carousel
                    .borrow_mut()
                    .set_on_screen(&entry.target(), entry.is_intersecting());
            })?);
        Ok(())
    }

    fn mount_lazy_images(&mut self, document: &Document) -> Result<(), JsValue> {
        let images = query_all(document, "img[data-src]");
        if images.is_empty() {
            return Ok(());
        }
        self.observers
            .push(ObserverSubscription::observe_all(&images, 0.0, |entry, observer| {
                if !entry.is_intersecting() {
                    return;
                }
                let target = entry.target();
                if let Some(img) = target.dyn_ref::<HtmlImageElement>() {
                    if let Some(src) = img.get_attribute("data-src") {
                        img.set_src(&src);
                        let _ = img.remove_attribute("data-src");
                    }
                }
                observer.unobserve(&target);
            })?);
        Ok(())
    }

    fn mount_counters(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let counters = query_all(document, ".stat-number[data-count]");
        if counters.is_empty() {
            return Ok(());
        }
        let board = CounterBoard::new(window);
        let handle = Rc::downgrade(&board);
        let window = window.clone();
        self.observers
            .push(ObserverSubscription::observe_all(&counters, 0.5, move |entry, observer| {
                if !entry.is_intersecting() {
                    return;
                }
                let target = entry.target();
                observer.unobserve(&target);
                let Some(animation) = counter_for(&target, now_ms(&window)) else {
                    return;
                };
                if let Some(board) = handle.upgrade() {
                    if let Ok(mut board) = board.try_borrow_mut() {
                        board.push(target, animation);
                    }
                }
            })?);
        self._counters = Some(board);
        Ok(())
    }

    fn mount_typing(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let mut deferred = Vec::new();
        for element in query_all(document, "[data-text-type]") {
            let fallback = element.text_content().unwrap_or_default();
            let options = TypewriterOptions::from_attributes(|name| element.get_attribute(name), &fallback);
            let effect = TypingEffect::mount(window, document, element.clone(), &options)?;
            if options.start_on_visible {
                deferred.push((element, Rc::downgrade(&effect.inner)));
            } else {
                effect.start();
            }
            self._typing.push(effect);
        }
        if deferred.is_empty() {
            return Ok(());
        }

        let elements: Vec<Element> = deferred.iter().map(|(el, _)| el.clone()).collect();
        self.observers
            .push(ObserverSubscription::observe_all(&elements, 0.1, move |entry, observer| {
                if !entry.is_intersecting() {
                    return;
                }
                let target = entry.target();
                observer.unobserve(&target);
                let found = deferred.iter().find(|(el, _)| *el == target);
                if let Some(inner) = found.and_then(|(_, inner)| inner.upgrade()) {
                    TypingEffect::start_shared(&inner);
                }
            })?);
        Ok(())
    }

    fn mount_nav(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let nav = document.get_element_by_id("nav");
        let links = query_all(document, ".nav-link");
        let sections: Vec<HtmlElement> = query_all(document, "section[id]")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();

        let update = {
            let window = window.clone();
            move || {
                let scroll_y = window.scroll_y().unwrap_or(0.0);
                if let Some(nav) = &nav {
                    let _ = nav
                        .class_list()
                        .toggle_with_force("scrolled", timing::is_scrolled(scroll_y));
                }
                highlight_active_link(scroll_y, &sections, &links);
            }
        };
        update();

        let mut throttle = Throttle::new(NAV_THROTTLE_MS);
        let clock = window.clone();
        self.listeners.push(Subscription::listen(window, "scroll", true, move |_| {
            if throttle.ready(now_ms(&clock)) {
                update();
            }
        })?);

        let toggle = document.get_element_by_id("navToggle");
        let menu = document.get_element_by_id("navLinks");
        if let (Some(toggle), Some(menu)) = (toggle.clone(), menu.clone()) {
            let doc = document.clone();
            let button = toggle.clone();
            self.listeners.push(Subscription::listen(&toggle, "click", false, move |_| {
                let open = menu.class_list().toggle("open").unwrap_or(false);
                let _ = button.class_list().toggle("open");
                lock_scroll(&doc, open);
            })?);
        }

        for link in query_all(document, "#navLinks a, .nav-cta") {
            let doc = document.clone();
            let toggle = toggle.clone();
            let menu = menu.clone();
            self.listeners.push(Subscription::listen(&link, "click", false, move |_| {
                for el in toggle.iter().chain(menu.iter()) {
                    let _ = el.class_list().remove_1("open");
                }
                lock_scroll(&doc, false);
            })?);
        }
        Ok(())
    }

    /// In-page anchors scroll smoothly and stop just below the nav bar.
    fn mount_smooth_scroll(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        for link in query_all(document, "a[href^=\"#\"]") {
            let window = window.clone();
            let doc = document.clone();
            let anchor = link.clone();
            self.listeners.push(Subscription::listen(&link, "click", false, move |event| {
                let Some(href) = anchor.get_attribute("href") else {
                    return;
                };
                let Some(selector) = timing::anchor_selector(&href) else {
                    return;
                };
                let Ok(Some(target)) = doc.query_selector(selector) else {
                    return;
                };
                event.prevent_default();

                let nav_height = doc
                    .get_element_by_id("nav")
                    .and_then(|nav| nav.dyn_into::<HtmlElement>().ok())
                    .map_or(0.0, |nav| f64::from(nav.offset_height()));
                let top = timing::anchor_scroll_top(
                    target.get_bounding_client_rect().top(),
                    window.scroll_y().unwrap_or(0.0),
                    nav_height,
                );
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
            })?);
        }
        Ok(())
    }

    fn mount_parallax(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let Some(hero) = document.query_selector(".hero").ok().flatten() else {
            return Ok(());
        };
        let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0);
        if !timing::parallax_enabled(width) {
            return Ok(());
        }
        let orbs: Vec<HtmlElement> = query_all(document, ".hero-orb")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();
        if orbs.is_empty() {
            return Ok(());
        }

        // the listeners own the ticker; it goes away with them
        let parallax = Parallax::new(window, orbs);
        let gate = parallax.clone();
        self.observers.push(events::on_intersection(&hero, 0.0, move |on_screen| {
            if let Ok(mut parallax) = gate.try_borrow_mut() {
                parallax.hero_visible = on_screen;
            }
        })?);
        self.listeners.push(Subscription::listen(window, "scroll", true, move |_| {
            if let Ok(mut parallax) = parallax.try_borrow_mut() {
                parallax.request();
            }
        })?);
        Ok(())
    }

    fn mount_video(&mut self, window: &Window, document: &Document) -> Result<(), JsValue> {
        let play = document.get_element_by_id("playBtn");
        let modal = document.get_element_by_id("vslModal");
        let video = media_by_id(document, "vslModalVideo");
        let (Some(play), Some(modal), Some(video)) = (play, modal, video) else {
            return Ok(());
        };
        let thumbnail = media_by_id(document, "vslThumbnail");

        if let Some(thumb) = &thumbnail {
            let media = thumb.clone();
            self.observers
                .push(events::on_intersection(thumb, 0.1, move |on_screen| {
                    if on_screen {
                        play_media(&media, "thumbnail autoplay prevented");
                    } else {
                        let _ = media.pause();
                    }
                })?);
        }

        let player = Rc::new(VideoModal {
            window: window.clone(),
            document: document.clone(),
            modal,
            video: video.clone(),
            thumbnail,
        });

        let open = player.clone();
        self.listeners
            .push(Subscription::listen(&play, "click", false, move |_| open.open())?);

        let mut closers: Vec<(EventTarget, &'static str)> = vec![(video.into(), "ended")];
        for id in ["vslModalClose", "vslModalOverlay"] {
            if let Some(el) = document.get_element_by_id(id) {
                closers.push((el.into(), "click"));
            }
        }
        for (target, event) in closers {
            let close = player.clone();
            self.listeners
                .push(Subscription::listen(&target, event, false, move |_| close.close())?);
        }
        Ok(())
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if let Some(background) = &self.background {
            background.stop();
        }
    }
}

/// Render preset for the canvas, honoring `data-variant` and `data-config`.
/// A bad override is logged and the plain preset is used.
fn canvas_config(canvas: &web_sys::HtmlCanvasElement) -> RenderConfig {
    let variant = canvas
        .get_attribute("data-variant")
        .and_then(|id| RayVariant::from_id(&id))
        .unwrap_or_default();
    match canvas.get_attribute("data-config") {
        Some(json) => RenderConfig::from_json(variant, &json).unwrap_or_else(|err| {
            tracing::warn!(variant = variant.id(), error = %err, "ignoring data-config");
            RenderConfig::preset(variant)
        }),
        None => RenderConfig::preset(variant),
    }
}

/// Element whose visibility gates the background.
fn hero_host(document: &Document, canvas: &web_sys::HtmlCanvasElement) -> Option<Element> {
    document
        .query_selector(".hero")
        .ok()
        .flatten()
        .or_else(|| document.get_element_by_id("home"))
        .or_else(|| canvas.parent_element())
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

fn lock_scroll(document: &Document, locked: bool) {
    if let Some(body) = document.body() {
        let _ = body
            .style()
            .set_property("overflow", if locked { "hidden" } else { "" });
    }
}

fn highlight_active_link(scroll_y: f64, sections: &[HtmlElement], links: &[Element]) {
    let spans: Vec<SectionSpan> = sections
        .iter()
        .map(|s| SectionSpan {
            id: s.id(),
            top: f64::from(s.offset_top()),
            height: f64::from(s.offset_height()),
        })
        .collect();
    let Some(active) = timing::active_section(scroll_y, &spans) else {
        return;
    };
    let href = format!("#{active}");
    for link in links {
        let is_active = link.get_attribute("href").as_deref() == Some(href.as_str());
        let _ = link.class_list().toggle_with_force("active", is_active);
    }
}

/// `.slide-track` animations run only while on screen in a visible tab.
struct Carousel {
    tracks: Vec<(HtmlElement, bool)>,
    tab_visible: bool,
}

impl Carousel {
    fn new(document: &Document) -> Self {
        let tracks = query_all(document, ".slide-track")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .map(|el| (el, true))
            .collect();
        Self {
            tracks,
            tab_visible: !document.hidden(),
        }
    }

    fn set_on_screen(&mut self, target: &Element, on_screen: bool) {
        for (track, flag) in &mut self.tracks {
            let el: &Element = track.as_ref();
            if el == target {
                *flag = on_screen;
            }
        }
        self.apply();
    }

    fn set_tab_visible(&mut self, visible: bool) {
        self.tab_visible = visible;
        self.apply();
    }

    fn apply(&self) {
        for (track, on_screen) in &self.tracks {
            let state = if *on_screen && self.tab_visible { "running" } else { "paused" };
            let _ = track.style().set_property("animation-play-state", state);
        }
    }
}

fn counter_for(element: &Element, start_ms: f64) -> Option<CounterAnimation> {
    let target = parse_leading_int(&element.get_attribute("data-count")?)?;
    let duration = element
        .get_attribute("data-duration")
        .and_then(|d| parse_leading_int(&d))
        .filter(|d| *d > 0)
        .map_or(DEFAULT_DURATION_MS, |d| d as f64);
    Some(CounterAnimation::new(target, duration, start_ms))
}

/// `.hero-orb` layers follow the scroll position, at most once per frame and
/// only while the hero is on screen.
struct Parallax {
    orbs: Vec<HtmlElement>,
    hero_visible: bool,
    frames: FrameLoop<i32>,
    scheduler: RafScheduler,
}

impl Parallax {
    fn new(window: &Window, orbs: Vec<HtmlElement>) -> Rc<RefCell<Self>> {
        let parallax = Rc::new(RefCell::new(Self {
            orbs,
            hero_visible: true,
            frames: FrameLoop::new(),
            scheduler: RafScheduler::new(window),
        }));
        let weak = Rc::downgrade(&parallax);
        let callback = Closure::<dyn FnMut(f64)>::new(move |_: f64| {
            if let Some(parallax) = weak.upgrade() {
                if let Ok(mut parallax) = parallax.try_borrow_mut() {
                    parallax.frame();
                }
            }
        });
        parallax.borrow_mut().scheduler.attach(callback);
        parallax
    }

    /// Ask for one frame; a frame already pending absorbs the request.
    fn request(&mut self) {
        if !self.hero_visible {
            return;
        }
        if let Err(err) = self.frames.start(&mut self.scheduler) {
            tracing::warn!(error = %err, "parallax frame rejected");
        }
    }

    fn frame(&mut self) {
        if !self.frames.begin_frame() {
            return;
        }
        let scroll_y = self.scheduler.window().scroll_y().unwrap_or(0.0);
        for (index, orb) in self.orbs.iter().enumerate() {
            let shift = timing::parallax_offset(scroll_y, index);
            let _ = orb
                .style()
                .set_property("transform", &format!("translateY({shift}px)"));
        }
        self.frames.stop(&mut self.scheduler);
    }
}

impl Drop for Parallax {
    fn drop(&mut self) {
        self.frames.stop(&mut self.scheduler);
    }
}

/// Every running counter shares one frame loop.
struct CounterBoard {
    running: Vec<(Element, CounterAnimation)>,
    frames: FrameLoop<i32>,
    scheduler: RafScheduler,
    format: js_sys::Function,
}

impl CounterBoard {
    fn new(window: &Window) -> Rc<RefCell<Self>> {
        let format = js_sys::Intl::NumberFormat::new(&js_sys::Array::new(), &js_sys::Object::new()).format();
        let board = Rc::new(RefCell::new(Self {
            running: Vec::new(),
            frames: FrameLoop::new(),
            scheduler: RafScheduler::new(window),
            format,
        }));
        let weak = Rc::downgrade(&board);
        let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(board) = weak.upgrade() {
                if let Ok(mut board) = board.try_borrow_mut() {
                    board.frame(timestamp);
                }
            }
        });
        board.borrow_mut().scheduler.attach(callback);
        board
    }

    fn push(&mut self, element: Element, animation: CounterAnimation) {
        tracing::debug!(count = animation.target(), "counter started");
        self.running.push((element, animation));
        if let Err(err) = self.frames.start(&mut self.scheduler) {
            tracing::warn!(error = %err, "counter animation could not start");
        }
    }

    fn frame(&mut self, timestamp: f64) {
        if !self.frames.begin_frame() {
            return;
        }
        let format = &self.format;
        self.running.retain(|(element, animation)| {
            let frame = animation.sample(timestamp);
            element.set_text_content(Some(&format_count(format, frame.value)));
            !frame.done
        });
        if self.running.is_empty() {
            self.frames.stop(&mut self.scheduler);
        } else if let Err(err) = self.frames.end_frame(&mut self.scheduler) {
            tracing::warn!(error = %err, "counter animation stopped");
        }
    }
}

impl Drop for CounterBoard {
    fn drop(&mut self) {
        self.frames.stop(&mut self.scheduler);
    }
}

/// Locale-grouped digits, or plain digits if formatting throws.
fn format_count(format: &js_sys::Function, value: i64) -> String {
    format
        .call1(&JsValue::UNDEFINED, &JsValue::from_f64(value as f64))
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| value.to_string())
}

struct TypingInner {
    window: Window,
    element: Element,
    content: Element,
    machine: Typewriter,
    initial_delay_ms: u32,
    started: bool,
    timer: Option<i32>,
    tick: Option<Closure<dyn FnMut()>>,
}

impl TypingInner {
    fn tick(&mut self) {
        self.timer = None;
        let step = self.machine.tick();
        self.content.set_inner_html(&step.text);
        if step.completed {
            let _ = self.element.class_list().add_1("typing-complete");
        }
        if let Some(delay) = step.delay_ms {
            self.schedule(delay);
        }
    }

    fn schedule(&mut self, delay_ms: u32) {
        let Some(tick) = &self.tick else {
            return;
        };
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), delay)
        {
            Ok(handle) => self.timer = Some(handle),
            Err(err) => tracing::warn!(error = %js_message(&err), "typing timer rejected"),
        }
    }
}

/// One `[data-text-type]` element and its timer chain.
struct TypingEffect {
    inner: Rc<RefCell<TypingInner>>,
}

impl TypingEffect {
    fn mount(
        window: &Window,
        document: &Document,
        element: Element,
        options: &TypewriterOptions,
    ) -> Result<Self, JsValue> {
        element.set_text_content(None);
        element.class_list().add_1("text-type")?;

        let content = document.create_element("span")?;
        content.set_class_name("text-type__content");
        element.append_child(&content)?;

        if options.show_cursor {
            let cursor = document.create_element("span")?;
            cursor.set_class_name("text-type__cursor");
            cursor.set_text_content(Some(&options.cursor));
            if let Some(cursor) = cursor.dyn_ref::<HtmlElement>() {
                cursor.style().set_property("animation", CURSOR_BLINK)?;
            }
            element.append_child(&cursor)?;
        }

        let inner = Rc::new(RefCell::new(TypingInner {
            window: window.clone(),
            element,
            content,
            machine: Typewriter::new(options),
            initial_delay_ms: options.initial_delay_ms,
            started: false,
            timer: None,
            tick: None,
        }));
        let weak: Weak<RefCell<TypingInner>> = Rc::downgrade(&inner);
        let tick = Closure::<dyn FnMut()>::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.tick();
                }
            }
        });
        inner.borrow_mut().tick = Some(tick);
        Ok(Self { inner })
    }

    fn start(&self) {
        Self::start_shared(&self.inner);
    }

    fn start_shared(inner: &Rc<RefCell<TypingInner>>) {
        let Ok(mut inner) = inner.try_borrow_mut() else {
            return;
        };
        if inner.started {
            return;
        }
        inner.started = true;
        let delay = inner.initial_delay_ms;
        inner.schedule(delay);
    }
}

impl Drop for TypingEffect {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            if let Some(handle) = inner.timer.take() {
                inner.window.clear_timeout_with_handle(handle);
            }
        }
    }
}

fn media_by_id(document: &Document, id: &str) -> Option<HtmlMediaElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlMediaElement>().ok())
}

/// Start playback; a rejected promise (autoplay policy) is only logged.
fn play_media(media: &HtmlMediaElement, context: &'static str) {
    match media.play() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                tracing::debug!(error = %js_message(&err), "{context}");
            }
        }),
        Err(err) => tracing::debug!(error = %js_message(&err), "{context}"),
    }
}

struct VideoModal {
    window: Window,
    document: Document,
    modal: Element,
    video: HtmlMediaElement,
    thumbnail: Option<HtmlMediaElement>,
}

impl VideoModal {
    fn open(&self) {
        let _ = self.modal.class_list().add_1("is-open");
        lock_scroll(&self.document, true);
        if let Some(thumb) = &self.thumbnail {
            let _ = thumb.pause();
        }
        self.video.set_current_time(0.0);
        play_media(&self.video, "modal playback prevented");
    }

    fn close(&self) {
        let _ = self.modal.class_list().remove_1("is-open");
        lock_scroll(&self.document, false);
        let _ = self.video.pause();

        let Some(thumb) = &self.thumbnail else {
            return;
        };
        let rect = thumb.get_bounding_client_rect();
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let viewport_w = dim(self.window.inner_width());
        let viewport_h = dim(self.window.inner_height());
        if Rect::new(rect.left(), rect.top(), rect.width(), rect.height()).fully_inside(viewport_w, viewport_h) {
            play_media(thumb, "thumbnail playback prevented");
        }
    }
}
