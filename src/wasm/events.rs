//! Event sources the page subscribes to. Every subscription owns its
//! callback and unregisters it when dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MediaQueryList, MouseEvent, TouchEvent,
    Window,
};

use super::render::js_message;
use crate::surface::dpr_media_query;

/// A DOM event listener, removed on drop.
pub struct Subscription {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Subscription {
    pub fn listen<F>(
        target: &EventTarget,
        event: &'static str,
        passive: bool,
        handler: F,
    ) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

type EntryCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// An `IntersectionObserver` and its callback, disconnected on drop.
pub struct ObserverSubscription {
    observer: IntersectionObserver,
    _callback: EntryCallback,
}

impl ObserverSubscription {
    /// Observe `elements`; `handler` sees every entry along with the observer
    /// so it can unobserve targets it is done with.
    pub fn observe_all<F>(elements: &[Element], threshold: f64, mut handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(&IntersectionObserverEntry, &IntersectionObserver) + 'static,
    {
        let callback = EntryCallback::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    handler(&entry, &observer);
                }
            }
        });
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for element in elements {
            observer.observe(element);
        }
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ObserverSubscription {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Resize listener that calls back once the window has been quiet for
/// `wait_ms`.
pub struct Debounced {
    _listener: Subscription,
    window: Window,
    pending: Rc<Cell<Option<i32>>>,
    _fire: Rc<Closure<dyn FnMut()>>,
}

impl Drop for Debounced {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

pub fn on_resize_debounced<F>(window: &Window, wait_ms: i32, mut handler: F) -> Result<Debounced, JsValue>
where
    F: FnMut() + 'static,
{
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let fire = {
        let pending = pending.clone();
        Rc::new(Closure::<dyn FnMut()>::new(move || {
            pending.set(None);
            handler();
        }))
    };

    let listener = {
        let timer_window = window.clone();
        let pending = pending.clone();
        let fire = fire.clone();
        Subscription::listen(window, "resize", true, move |_| {
            if let Some(handle) = pending.take() {
                timer_window.clear_timeout_with_handle(handle);
            }
            let callback: &Closure<dyn FnMut()> = &fire;
            match timer_window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                wait_ms,
            ) {
                Ok(handle) => pending.set(Some(handle)),
                Err(err) => tracing::warn!(error = %js_message(&err), "resize timer rejected"),
            }
        })?
    };

    Ok(Debounced {
        _listener: listener,
        window: window.clone(),
        pending,
        _fire: fire,
    })
}

struct DprState {
    window: Window,
    query: Option<MediaQueryList>,
    listener: Option<Closure<dyn FnMut(Event)>>,
}

impl DprState {
    /// Listen on a query matching the ratio in effect right now.
    fn arm(&mut self) -> Result<(), JsValue> {
        self.disarm();
        let Some(listener) = &self.listener else {
            return Ok(());
        };
        let query = dpr_media_query(self.window.device_pixel_ratio());
        if let Some(list) = self.window.match_media(&query)? {
            list.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())?;
            self.query = Some(list);
        }
        Ok(())
    }

    fn disarm(&mut self) {
        if let (Some(list), Some(listener)) = (self.query.take(), &self.listener) {
            let _ = list.remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref());
        }
    }
}

/// Device-pixel-ratio watcher, disarmed on drop. A ratio change does not
/// always come with a `resize` event (moving between displays).
pub struct DprWatch {
    state: Rc<RefCell<DprState>>,
}

impl Drop for DprWatch {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.disarm();
        }
    }
}

/// Calls `handler()` each time the device-pixel ratio changes, re-arming at
/// the new ratio afterwards.
pub fn on_dpr_change<F>(window: &Window, mut handler: F) -> Result<DprWatch, JsValue>
where
    F: FnMut() + 'static,
{
    let state = Rc::new(RefCell::new(DprState {
        window: window.clone(),
        query: None,
        listener: None,
    }));

    let weak = Rc::downgrade(&state);
    let listener = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        handler();
        if let Some(state) = weak.upgrade() {
            if let Ok(mut state) = state.try_borrow_mut() {
                if let Err(err) = state.arm() {
                    tracing::warn!(error = %js_message(&err), "pixel ratio watch lost");
                }
            }
        }
    });

    {
        let mut armed = state.borrow_mut();
        armed.listener = Some(listener);
        armed.arm()?;
    }
    Ok(DprWatch { state })
}

/// Calls `handler(visible)` whenever the tab is shown or hidden.
pub fn on_visibility<F>(document: &Document, mut handler: F) -> Result<Subscription, JsValue>
where
    F: FnMut(bool) + 'static,
{
    let doc = document.clone();
    Subscription::listen(document, "visibilitychange", false, move |_| {
        handler(!doc.hidden());
    })
}

/// Calls `handler(on_screen)` whenever `element` enters or leaves the
/// viewport.
pub fn on_intersection<F>(element: &Element, threshold: f64, mut handler: F) -> Result<ObserverSubscription, JsValue>
where
    F: FnMut(bool) + 'static,
{
    ObserverSubscription::observe_all(std::slice::from_ref(element), threshold, move |entry, _| {
        handler(entry.is_intersecting());
    })
}

/// Calls `handler(client_x, client_y)` for mouse moves and for the first
/// touch of touch moves over `target`.
pub fn on_pointer<F>(target: &EventTarget, handler: F) -> Result<Vec<Subscription>, JsValue>
where
    F: FnMut(f64, f64) + 'static,
{
    let handler = Rc::new(RefCell::new(handler));

    let mouse = {
        let handler = handler.clone();
        Subscription::listen(target, "mousemove", true, move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                (handler.borrow_mut())(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
            }
        })?
    };

    let touch = Subscription::listen(target, "touchmove", true, move |event| {
        let first = event
            .dyn_ref::<TouchEvent>()
            .and_then(|touch| touch.touches().get(0));
        if let Some(point) = first {
            (handler.borrow_mut())(f64::from(point.client_x()), f64::from(point.client_y()));
        }
    })?;

    Ok(vec![mouse, touch])
}
