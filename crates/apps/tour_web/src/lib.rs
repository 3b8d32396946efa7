use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event};

use foundation::ids::RoomId;
use runtime::Level;
use tour::{EventKind, TourApp, TourConfig};

mod clock;
mod dom;
mod startup;
use clock::{JsClock, now_ms};
use dom::DomHost;

// Guards against installing listeners twice (hot reload, repeated start calls).
static STARTED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static APP: RefCell<Option<TourApp<DomHost>>> = const { RefCell::new(None) };
}

/// Runs `f` against the app, or returns `None` before `start_tour` or after
/// thread-local teardown.
fn with_app<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut TourApp<DomHost>) -> R,
{
    APP.try_with(|cell| cell.borrow_mut().as_mut().map(f))
        .ok()
        .flatten()
}

/// Forwards buffered diagnostics to the browser console.
fn flush_console() {
    let events = with_app(|app| app.drain_diagnostics()).unwrap_or_default();
    for event in events {
        let line = JsValue::from_str(&format!("[{}] {}", event.kind, event.message));
        match event.level {
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Debug | Level::Info => web_sys::console::log_1(&line),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Boots the tour with default settings. Call once the page markup exists.
#[wasm_bindgen]
pub fn start_tour() -> Result<(), JsValue> {
    boot(TourConfig::default())
}

/// Boots the tour with a partial JSON `TourConfig`.
#[wasm_bindgen]
pub fn start_tour_with_config(config_json: &str) -> Result<(), JsValue> {
    let config = TourConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    boot(config)
}

/// Fetches a JSON `TourConfig` from `url` and boots with it, falling back to
/// the defaults when the fetch or parse fails.
#[wasm_bindgen]
pub fn load_tour_config(url: String) {
    spawn_local(async move {
        let (config, warning) = startup::config_or_default(fetch_config(&url).await);
        if let Some(msg) = warning {
            web_sys::console::warn_1(&JsValue::from_str(&msg));
        }
        if let Err(err) = boot(config) {
            web_sys::console::error_1(&err);
        }
    });
}

async fn fetch_config(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

fn boot(config: TourConfig) -> Result<(), JsValue> {
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    let host = DomHost::new()?;
    let document = host.document().clone();
    let window = host.window().clone();

    let mut app = TourApp::new(host, config, Box::new(JsClock));
    app.start();
    APP.with(|cell| *cell.borrow_mut() = Some(app));

    install_listeners(&document)?;
    watch_scene_loaded(&document, &window)?;
    flush_console();
    Ok(())
}

/// One delegated listener per event kind on the document; the router does
/// the per-element matching.
fn install_listeners(document: &web_sys::Document) -> Result<(), JsValue> {
    for kind in [EventKind::Click, EventKind::Submit] {
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let outcome = with_app(|app| app.dispatch(kind, &target));
            if outcome.is_some_and(|o| o.prevent_default) {
                event.prevent_default();
            }
            flush_console();
        });
        document.add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// A-Frame fires `loaded` on `a-scene` once assets are ready; the reveal
/// runs after the configured delay. A scene that loaded before boot (late
/// `start_tour`, slow config fetch) is revealed straight away.
fn watch_scene_loaded(document: &web_sys::Document, window: &web_sys::Window) -> Result<(), JsValue> {
    let Some(scene) = document.query_selector("a-scene")? else {
        web_sys::console::warn_1(&JsValue::from_str("no a-scene element; loading screen stays up"));
        return Ok(());
    };
    let has_loaded = js_sys::Reflect::get(&scene, &JsValue::from_str("hasLoaded"))
        .ok()
        .and_then(|v| v.as_bool());
    if startup::already_loaded(has_loaded) {
        schedule_reveal(window);
        return Ok(());
    }
    let window = window.clone();
    let on_loaded = Closure::<dyn FnMut()>::new(move || schedule_reveal(&window));
    scene.add_event_listener_with_callback("loaded", on_loaded.as_ref().unchecked_ref())?;
    on_loaded.forget();
    Ok(())
}

/// Queues the reveal and arms the browser timer that runs it.
fn schedule_reveal(window: &web_sys::Window) {
    let Some(pending) = with_app(|app| startup::schedule(app, now_ms())) else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        with_app(|app| startup::fire(app, pending));
        flush_console();
    });
    let scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        pending.timeout_ms,
    );
    if let Err(err) = scheduled {
        web_sys::console::warn_1(&err);
    }
    flush_console();
}

/// Global entry point kept for markup that calls `navigateTo(room)`.
#[wasm_bindgen(js_name = navigateTo)]
pub fn navigate_to_room(room: &str) -> bool {
    let ok = with_app(|app| app.navigate_to(&RoomId::new(room))).unwrap_or(false);
    flush_console();
    ok
}

#[wasm_bindgen(js_name = showGuideExplanation)]
pub fn show_guide_explanation(location: &str) -> bool {
    let ok = with_app(|app| app.show_guide_explanation(&RoomId::new(location))).unwrap_or(false);
    flush_console();
    ok
}

#[wasm_bindgen(js_name = openBookingForm)]
pub fn open_booking_form(room_type: &str) -> bool {
    let ok = with_app(|app| app.open_booking_form(room_type)).unwrap_or(false);
    flush_console();
    ok
}

#[wasm_bindgen(js_name = closeBookingForm)]
pub fn close_booking_form() -> bool {
    let ok = with_app(|app| app.close_booking_form()).unwrap_or(false);
    flush_console();
    ok
}

/// Cancels pending deferred work. Listeners stay installed for the page's
/// lifetime.
#[wasm_bindgen]
pub fn teardown_tour() {
    with_app(|app| app.teardown());
    flush_console();
}
