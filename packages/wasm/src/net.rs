//! `fetch` helpers and browser session storage

use frontecs_editor::SessionStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, Storage, Window};

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

async fn send(request: &Request) -> Result<String, JsValue> {
    let response: Response = JsFuture::from(window()?.fetch_with_request(request))
        .await?
        .dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

/// GET `url` and return the raw body
pub async fn get_text(url: &str) -> Result<String, JsValue> {
    let request = Request::new_with_str(url)?;
    send(&request).await
}

pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, JsValue> {
    let body = get_text(url).await?;
    serde_json::from_str(&body).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// POST `body` as JSON and decode the JSON answer
pub async fn post_json<B: Serialize, T: DeserializeOwned>(url: &str, body: &B) -> Result<T, JsValue> {
    let json = serde_json::to_string(body).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(&json));
    let request = Request::new_with_str_and_init(url, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let answer = send(&request).await?;
    serde_json::from_str(&answer).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Readable message for a rejected promise
pub fn describe(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{:?}", error))
}

/// `window.sessionStorage`
pub struct BrowserSessionStore {
    storage: Storage,
}

impl BrowserSessionStore {
    pub fn open(window: &Window) -> Option<Self> {
        let storage = window.session_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl SessionStore for BrowserSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        let _ = self.storage.set_item(key, value);
    }

    fn remove(&mut self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}
