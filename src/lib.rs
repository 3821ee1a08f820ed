//! Landing-page client behavior compiled to WebAssembly: an animated WebGL
//! light-ray hero background plus the page's scroll-driven widgets.
//!
//! Everything outside `wasm` is plain Rust and builds (and tests) on the
//! host; the browser glue lives in `wasm` and only exists on `wasm32`.

pub mod config;
pub mod counter;
pub mod error;
pub mod pointer;
pub mod scene;
pub mod schedule;
pub mod shaders;
pub mod surface;
pub mod timing;
pub mod typewriter;

pub use config::{RayVariant, RenderConfig};
pub use error::{ConfigError, InitError, ScheduleError, ShaderStage};
pub use pointer::{PointerSpace, PointerState, Rect};
pub use scene::{FrameUniforms, RayScene};
pub use schedule::{FrameLoop, FrameScheduler, RunState};
pub use surface::{backing_size, SurfaceState};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    pub mod background;
    pub mod console;
    pub mod events;
    pub mod page;
    pub mod render;

    thread_local! {
        static PAGE: RefCell<Option<page::Page>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
        console::init();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let page = page::Page::mount(&window, &document)?;
        PAGE.with(|slot| *slot.borrow_mut() = Some(page));
        Ok(())
    }

    /// Stop every effect and remove every listener the page registered.
    #[wasm_bindgen]
    pub fn teardown() {
        PAGE.with(|slot| {
            if slot.borrow_mut().take().is_some() {
                tracing::info!("page torn down");
            }
        });
    }
}
