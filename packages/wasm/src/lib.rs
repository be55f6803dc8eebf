//! Browser entry point for the Frontecs editor
//!
//! On load every visitor's page is hydrated with the saved edits. When the
//! URL (or the session cache) carries the configured key, the overlay is
//! mounted and DOM events are forwarded to an [`EditorSession`]. The
//! session is sans-IO: this module owns the clock, the `setTimeout` wake-up
//! and the `fetch` that ships each save.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use frontecs_editor::{
    authorize, hydrate, Dispatch, EditSet, EditorConfig, EditorSession, FormatCommand, KeyInput, Point, SaveFailure,
    SavePayload, SaveResponse, Shortcut, CONFIG_PATH, EDITS_PATH, SAVE_PATH,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlInputElement, HtmlSelectElement,
    KeyboardEvent, Node, TouchEvent, Window,
};

mod dom;
mod net;
mod overlay;
mod timer;

pub use dom::DomPage;
pub use net::BrowserSessionStore;
pub use overlay::Overlay;

use net::describe;
use timer::WakeTimer;

const EXIT_PROMPT: &str = "Exit edit mode? Unsaved changes will be lost.";

/// Marks the body while the overlay is mounted
const EDIT_MODE_ATTRIBUTE: &str = "data-frontecs-edit";

struct App {
    /// `None` once the operator has exited
    session: Option<EditorSession<DomPage>>,
    overlay: Overlay,
    /// Set right after the app is shared
    timer: Option<WakeTimer>,
}

type Handle = Rc<RefCell<App>>;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    spawn_local(async {
        if let Err(e) = boot().await {
            warn(&format!("frontecs: editor failed to start: {}", describe(&e)));
        }
    });
}

async fn boot() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let mut page = DomPage::new(window.clone(), document.clone());

    let edit_set = match net::get_text(EDITS_PATH).await {
        Ok(body) => EditSet::from_json_lossy(&body),
        Err(_) => EditSet::default(),
    };
    let report = hydrate(&mut page, &edit_set);
    if !report.skipped.is_empty() {
        warn(&format!("frontecs: {} saved edit(s) no longer match the page", report.skipped.len()));
    }

    // No config means the site is not editable
    let Ok(config) = net::get_json::<EditorConfig>(CONFIG_PATH).await else {
        return Ok(());
    };
    let Some(mut store) = BrowserSessionStore::open(&window) else {
        return Ok(());
    };
    let location = window.location();
    if !authorize(&mut store, &config.secret_key, &location.pathname()?, &location.search()?) {
        return Ok(());
    }

    if let Some(body) = document.body() {
        body.set_attribute(EDIT_MODE_ATTRIBUTE, "1")?;
    }
    let overlay = Overlay::build(&document)?;
    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let session = EditorSession::new(page, config, edit_set, seed);

    let handle: Handle = Rc::new(RefCell::new(App {
        session: Some(session),
        overlay,
        timer: None,
    }));
    let timer = wake_timer(Rc::downgrade(&handle));
    handle.borrow_mut().timer = Some(timer);
    wire_document(&handle, &window, &document)?;
    wire_overlay(&handle)?;
    refresh(&handle);
    Ok(())
}

fn now() -> u64 {
    js_sys::Date::now() as u64
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// Run `f` against the session, then refresh. Returns `None` when the app is
/// already borrowed (a synchronous event fired from inside another handler)
/// or the session has ended.
fn update<R>(handle: &Handle, f: impl FnOnce(&mut EditorSession<DomPage>, &mut Overlay, u64) -> R) -> Option<R> {
    let result = {
        let Ok(mut app) = handle.try_borrow_mut() else {
            return None;
        };
        let App { session, overlay, .. } = &mut *app;
        f(session.as_mut()?, overlay, now())
    };
    refresh(handle);
    Some(result)
}

/// Ship due saves, redraw the overlay and re-arm the wake-up timer
fn refresh(handle: &Handle) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(mut app) = handle.try_borrow_mut() else {
        return;
    };
    let now = now();
    let App { session, overlay, timer } = &mut *app;
    let Some(session) = session.as_mut() else {
        return;
    };

    if let Some(payload) = session.poll(now) {
        send_save(handle.clone(), payload);
    }
    overlay.render(session);

    if let Some(timer) = timer.as_mut() {
        timer.schedule(&window, session.next_deadline(), now);
    }
}

/// Holds the app weakly so the app and its own timer callback do not keep
/// each other alive
fn wake_timer(app: Weak<RefCell<App>>) -> WakeTimer {
    WakeTimer::new(move || {
        let Some(handle) = app.upgrade() else {
            return;
        };
        if let Ok(mut app) = handle.try_borrow_mut() {
            if let Some(timer) = app.timer.as_mut() {
                timer.fired();
            }
        }
        refresh(&handle);
    })
}

fn send_save(handle: Handle, payload: SavePayload) {
    spawn_local(async move {
        let result = net::post_json::<_, SaveResponse>(SAVE_PATH, &payload)
            .await
            .map_err(|e| SaveFailure::Transport(describe(&e)));
        if let Err(SaveFailure::Transport(reason)) = &result {
            warn(&format!("frontecs: save failed: {}", reason));
        }
        if let Ok(mut app) = handle.try_borrow_mut() {
            if let Some(session) = app.session.as_mut() {
                session.on_save_result(result, now());
            }
        }
        refresh(&handle);
    });
}

fn listen(
    target: &EventTarget,
    name: &str,
    capture: bool,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback_and_bool(name, closure.as_ref().unchecked_ref(), capture)?;
    closure.forget();
    Ok(())
}

fn target_element(event: &Event) -> Option<Element> {
    let target = event.target()?;
    match target.dyn_into::<Element>() {
        Ok(element) => Some(element),
        Err(target) => target.dyn_into::<Node>().ok()?.parent_element(),
    }
}

fn first_touch_point(touches: &web_sys::TouchList) -> Option<Point> {
    touches
        .get(0)
        .map(|touch| Point::new(touch.client_x() as f64, touch.client_y() as f64))
}

/// Page-wide listeners: pointer, touch, typing, shortcuts and repositioning
fn wire_document(handle: &Handle, window: &Window, document: &Document) -> Result<(), JsValue> {
    let h = handle.clone();
    listen(document, "mousedown", true, move |event| {
        if let Some(target) = target_element(&event) {
            update(&h, |session, _, now| session.pointer_down(&target, now));
        }
    })?;

    let h = handle.clone();
    listen(document, "click", true, move |event| {
        let Some(target) = target_element(&event) else {
            return;
        };
        if let Some(dispatch) = update(&h, |session, _, now| session.click(&target, now)) {
            if dispatch.prevents_default() {
                event.prevent_default();
            }
        }
    })?;

    let h = handle.clone();
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(point) = event
            .dyn_ref::<TouchEvent>()
            .and_then(|touch| first_touch_point(&touch.touches()))
        else {
            return;
        };
        update(&h, |session, _, _| session.touch_start(point));
    });
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options.set_capture(true);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "touchstart",
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    closure.forget();

    let h = handle.clone();
    let page_document = document.clone();
    listen(document, "touchend", true, move |event| {
        let Some(point) = event
            .dyn_ref::<TouchEvent>()
            .and_then(|touch| first_touch_point(&touch.changed_touches()))
        else {
            return;
        };
        let target = page_document.element_from_point(point.x as f32, point.y as f32);
        let dispatch = update(&h, |session, _, now| session.touch_end(point, target.as_ref(), now));
        if matches!(dispatch, Some(d) if d != Dispatch::Ignored) {
            // the synthetic click would dispatch a second time
            event.prevent_default();
        }
    })?;

    let h = handle.clone();
    listen(document, "input", false, move |event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
            return;
        };
        update(&h, |session, _, now| {
            let inside = session
                .state()
                .active_text()
                .map_or(false, |element| element.contains(Some(&target)));
            if inside {
                session.text_input(now);
            }
        });
    })?;

    let h = handle.clone();
    listen(document, "keydown", false, move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let input = KeyInput {
            key: key.key(),
            ctrl: key.ctrl_key(),
            meta: key.meta_key(),
            shift: key.shift_key(),
        };
        let shortcut = update(&h, |session, _, now| {
            let shortcut = session.key_down(&input, now);
            if shortcut == Some(Shortcut::Escape) {
                session.close_seo();
            }
            shortcut
        });
        if let Some(Some(shortcut)) = shortcut {
            if shortcut.prevents_default() {
                event.prevent_default();
            }
        }
    })?;

    for name in ["scroll", "resize"] {
        let h = handle.clone();
        listen(window, name, true, move |_| {
            update(&h, |_, _, _| ());
        })?;
    }
    Ok(())
}

/// Listeners on the overlay's own controls
fn wire_overlay(handle: &Handle) -> Result<(), JsValue> {
    let app = handle.borrow();
    let overlay = &app.overlay;

    let h = handle.clone();
    listen(&overlay.exit_button, "click", false, move |_| exit(&h))?;

    for (button, command) in &overlay.format_buttons {
        let h = handle.clone();
        let command = command.clone();
        // mousedown keeps the text selection alive
        listen(button, "mousedown", false, move |event| {
            event.prevent_default();
            update(&h, |session, _, now| session.format(&command, now));
        })?;
    }

    let h = handle.clone();
    let color = overlay.color_input.clone();
    listen(&overlay.color_input, "input", false, move |_| {
        let command = FormatCommand::ForeColor(color.value());
        update(&h, |session, _, now| session.format(&command, now));
    })?;

    let h = handle.clone();
    let size = overlay.size_select.clone();
    listen(&overlay.size_select, "change", false, move |_| {
        let value = size.value();
        if value.is_empty() {
            return;
        }
        reset_select(&size);
        update(&h, |session, _, now| session.format(&FormatCommand::FontSize(value), now));
    })?;

    let h = handle.clone();
    listen(&overlay.seo_button, "click", false, move |_| {
        update(&h, |session, overlay, _| {
            let values = session.open_seo();
            overlay.seo_fields.fill(&values);
        });
    })?;

    let h = handle.clone();
    listen(&overlay.seo_save, "click", false, move |_| {
        update(&h, |session, overlay, now| {
            let draft = overlay.seo_fields.read();
            session.commit_seo(&draft, now);
        });
    })?;

    for control in [&overlay.seo_close, &overlay.seo_cancel, &overlay.seo_backdrop] {
        let h = handle.clone();
        listen(control, "click", false, move |_| {
            update(&h, |session, _, _| session.close_seo());
        })?;
    }

    let input = overlay.image_input.clone();
    listen(&overlay.image_replace, "click", false, move |_| input.click())?;

    let h = handle.clone();
    listen(&overlay.image_close, "click", false, move |_| {
        update(&h, |session, _, _| session.close_popups());
    })?;

    let h = handle.clone();
    let input = overlay.image_input.clone();
    listen(&overlay.image_input, "change", false, move |_| image_chosen(&h, &input))?;

    let h = handle.clone();
    let input = overlay.link_input.clone();
    listen(&overlay.link_input, "input", false, move |_| {
        let value = input.value();
        update(&h, |session, _, _| session.set_link_input(&value));
    })?;

    let h = handle.clone();
    listen(&overlay.link_input, "keydown", false, move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        // handled here, not by the page shortcuts
        event.stop_propagation();
        if key == "Enter" {
            event.prevent_default();
        }
        if let Some(Err(e)) = update(&h, |session, _, now| session.link_key(&key, now)) {
            warn(&format!("frontecs: {}", e));
        }
    })?;

    let h = handle.clone();
    listen(&overlay.link_save, "click", false, move |_| {
        if let Some(Err(e)) = update(&h, |session, _, now| session.commit_link(now)) {
            warn(&format!("frontecs: {}", e));
        }
    })?;

    let h = handle.clone();
    listen(&overlay.link_close, "click", false, move |_| {
        update(&h, |session, _, _| session.close_popups());
    })?;

    Ok(())
}

fn reset_select(select: &HtmlSelectElement) {
    select.set_selected_index(0);
}

/// Read the chosen file and hand its bytes to the session
fn image_chosen(handle: &Handle, input: &HtmlInputElement) {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return;
    };
    // the same file can be chosen again
    input.set_value("");

    let h = handle.clone();
    spawn_local(async move {
        let bytes = match JsFuture::from(file.array_buffer()).await {
            Ok(buffer) => js_sys::Uint8Array::new(&buffer).to_vec(),
            Err(e) => {
                warn(&format!("frontecs: could not read image: {}", describe(&e)));
                return;
            }
        };
        if let Some(Err(e)) = update(&h, |session, _, now| session.image_file_selected(&bytes, now)) {
            warn(&format!("frontecs: {}", e));
        }
    });
}

/// Confirm, forget the key and reload without it
fn exit(handle: &Handle) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if !window.confirm_with_message(EXIT_PROMPT).unwrap_or(false) {
        return;
    }
    let Some(mut store) = BrowserSessionStore::open(&window) else {
        return;
    };
    let Ok(mut app) = handle.try_borrow_mut() else {
        return;
    };
    let Some(session) = app.session.take() else {
        return;
    };
    if let Some(timer) = app.timer.as_mut() {
        timer.cancel(&window);
    }

    let location = window.location();
    let pathname = location.pathname().unwrap_or_default();
    let (_page, reload_to) = session.exit(&mut store, &pathname);
    if let Err(e) = location.set_href(&reload_to) {
        warn(&format!("frontecs: reload failed: {}", describe(&e)));
    }
}
