#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use rays_wasm::shaders::VERTEX_SHADER;
use rays_wasm::wasm::background::HeroBackground;
use rays_wasm::wasm::events::{self, Subscription};
use rays_wasm::wasm::render::RayRenderer;
use rays_wasm::{InitError, RayVariant, RenderConfig, ShaderStage};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas(width: u32, height: u32) -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    let style = canvas.style();
    style.set_property("width", &format!("{width}px")).unwrap();
    style.set_property("height", &format!("{height}px")).unwrap();
    style.set_property("display", "block").unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn pinned_canvas(width: u32, height: u32) -> web_sys::HtmlCanvasElement {
    let canvas = canvas(width, height);
    let style = canvas.style();
    style.set_property("position", "fixed").unwrap();
    style.set_property("left", "0px").unwrap();
    style.set_property("top", "0px").unwrap();
    canvas
}

fn close(actual: [f32; 2], expected: [f32; 2]) -> bool {
    (actual[0] - expected[0]).abs() < 1e-3 && (actual[1] - expected[1]).abs() < 1e-3
}

fn broken(config: &RenderConfig) -> Result<RayRenderer, InitError> {
    RayRenderer::initialize_with_sources(canvas(64, 64), config, VERTEX_SHADER, "void main( {")
}

#[wasm_bindgen_test]
fn broken_fragment_shader_is_reported() {
    match broken(&RenderConfig::cone()) {
        // no WebGL2 in this browser; nothing to compile against
        Err(InitError::ContextUnavailable(_)) => {}
        Err(InitError::ShaderCompileFailed { stage, log }) => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("broken shader compiled"),
    }
}

#[wasm_bindgen_test]
fn failed_init_disables_the_background() {
    let window = web_sys::window().unwrap();
    let config = RenderConfig::skew();
    let result = broken(&config);
    let background = HeroBackground::from_init(&window, config, result);

    assert!(!background.is_enabled());
    background.start();
    background.resize();
    background.pointer_move(0.2, 0.8);
    assert!(!background.is_running());
    assert_eq!(background.surface_size(), None);
}

#[wasm_bindgen_test]
fn resize_twice_keeps_the_backing_size() {
    let window = web_sys::window().unwrap();
    let canvas = canvas(320, 180);
    let element = canvas.clone();
    let background = HeroBackground::mount(&window, canvas, RenderConfig::cone());
    if !background.is_enabled() {
        return;
    }

    background.resize();
    let first = background.surface_size();
    background.resize();
    assert_eq!(background.surface_size(), first);

    let (width, height) = first.unwrap();
    assert_eq!((element.width(), element.height()), (width, height));
    assert!(width >= 320 && height >= 180);
}

#[wasm_bindgen_test]
fn start_is_idempotent_and_stop_halts() {
    let window = web_sys::window().unwrap();
    let background = HeroBackground::mount(&window, canvas(100, 100), RenderConfig::cone());
    if !background.is_enabled() {
        return;
    }

    background.start();
    background.start();
    assert!(background.is_running());

    background.stop();
    assert!(!background.is_running());
    background.start();
    assert!(background.is_running());

    background.set_page_visible(false);
    assert!(!background.is_running());
    background.set_page_visible(true);
    assert!(background.is_running());
}

#[wasm_bindgen_test]
fn dropped_subscription_stops_listening() {
    let document = web_sys::window().unwrap().document().unwrap();
    let target = document.create_element("div").unwrap();
    let hits = Rc::new(Cell::new(0));

    let counter = hits.clone();
    let subscription = Subscription::listen(&target, "ping", false, move |_| {
        counter.set(counter.get() + 1);
    })
    .unwrap();

    let ping = web_sys::Event::new("ping").unwrap();
    target.dispatch_event(&ping).unwrap();
    assert_eq!(hits.get(), 1);

    drop(subscription);
    let ping = web_sys::Event::new("ping").unwrap();
    target.dispatch_event(&ping).unwrap();
    assert_eq!(hits.get(), 1);
}

#[wasm_bindgen_test]
fn loop_runs_only_while_visible_and_on_screen() {
    let window = web_sys::window().unwrap();
    let background = HeroBackground::mount(&window, canvas(100, 100), RenderConfig::cone());
    if !background.is_enabled() {
        return;
    }

    background.start();
    background.set_on_screen(false);
    assert!(!background.is_running());

    background.set_page_visible(true);
    assert!(!background.is_running());

    background.set_page_visible(false);
    background.set_on_screen(true);
    assert!(!background.is_running());

    background.set_page_visible(true);
    assert!(background.is_running());
}

#[wasm_bindgen_test]
fn cone_pointer_maps_into_the_canvas_and_ignores_off_screen_moves() {
    let window = web_sys::window().unwrap();
    let background = HeroBackground::mount(&window, pinned_canvas(200, 100), RenderConfig::cone());
    assert_eq!(background.variant(), RayVariant::Cone);
    if !background.is_enabled() {
        return;
    }

    background.pointer_at_client(50.0, 25.0);
    let target = background.pointer_target().unwrap();
    assert!(close(target, [0.25, 0.75]), "{target:?}");

    background.set_on_screen(false);
    background.pointer_at_client(150.0, 75.0);
    assert_eq!(background.pointer_target(), Some(target));
}

#[wasm_bindgen_test]
fn skew_pointer_maps_into_the_viewport() {
    let window = web_sys::window().unwrap();
    let background = HeroBackground::mount(&window, canvas(100, 100), RenderConfig::skew());
    assert_eq!(background.variant(), RayVariant::Skew);
    if !background.is_enabled() {
        return;
    }

    let width = window.inner_width().unwrap().as_f64().unwrap();
    let height = window.inner_height().unwrap().as_f64().unwrap();
    background.pointer_at_client(width / 2.0, height / 4.0);
    let target = background.pointer_target().unwrap();
    assert!(close(target, [0.5, 0.25]), "{target:?}");
}

#[wasm_bindgen_test]
fn dpr_watch_arms_and_disarms() {
    let window = web_sys::window().unwrap();
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let watch = events::on_dpr_change(&window, move || counter.set(counter.get() + 1)).unwrap();
    drop(watch);
    assert_eq!(hits.get(), 0);
}
