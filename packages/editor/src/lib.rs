//! # Frontecs Editor
//!
//! In-page visual editing engine for static sites.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host (wasm / tests): DOM, fetch, timers     │
//! └─────────────────────────────────────────────┘
//!            ↓ events + now_ms       ↑ SavePayload
//! ┌─────────────────────────────────────────────┐
//! │ EditorSession                               │
//! │  - dispatch: click / tap → activation       │
//! │  - edit store: one edit per (selector,type) │
//! │  - history: bounded linear undo / redo      │
//! │  - persistence: debounced save + indicator  │
//! └─────────────────────────────────────────────┘
//!            ↓ Page trait
//! ┌─────────────────────────────────────────────┐
//! │ DomPage (browser) / VirtualPage (headless)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Selectors are the identity**: an edit is addressed by the path of
//!    the element it changed, so it can be replayed on a fresh page load
//! 2. **Collapsed store, linear history**: the store keeps the net change
//!    per element; the history keeps every step for undo
//! 3. **Sans-IO**: the core never sleeps or fetches; the host supplies the
//!    clock and performs requests
//!
//! ## Usage
//!
//! ```rust
//! use frontecs_editor::{EditSet, EditorConfig, EditorSession, Page, VirtualPage};
//!
//! let mut page = VirtualPage::from_html("<main><h1>Hello</h1></main>");
//! frontecs_editor::hydrate(&mut page, &EditSet::default());
//!
//! let config = EditorConfig {
//!     secret_key: "0a1b".to_string(),
//!     site_id: "demo".to_string(),
//! };
//! let mut session = EditorSession::new(page, config, EditSet::default(), 7);
//!
//! let h1 = session.page().query_selector("h1").unwrap().unwrap();
//! session.click(&h1, 0);
//! session.page_mut().set_inner_html(&h1, "Hello World");
//! session.text_input(10);
//! session.save_now(20);
//!
//! let payload = session.poll(20).expect("save due");
//! assert_eq!(payload.edits[0].selector, "main > h1");
//! ```

pub mod auth;
mod dispatch;
mod edits;
mod errors;
mod history;
mod hydration;
pub mod image_upload;
mod keyboard;
pub mod layout;
mod page;
mod persistence;
mod protocol;
pub mod selector;
mod seo;
mod session;
mod vdom;

pub use auth::{authorize, extract_key_from_url, MemorySessionStore, SessionStore, SESSION_KEY};
pub use dispatch::{is_tap, resolve_target, ActiveState, Dispatch, InteractionTarget, Point, TouchTracker, TAP_SLOP};
pub use edits::{Edit, EditIds, EditKind, EditStore};
pub use errors::EditorError;
pub use history::{History, HistoryEntry, MAX_HISTORY};
pub use hydration::{apply_all, hydrate, HydrationReport};
pub use image_upload::ImageOptions;
pub use keyboard::{KeyInput, Shortcut};
pub use layout::{PanelSize, Placement, Rect, Viewport};
pub use page::{
    apply_at_selector, closest, contains, find_text_target, is_editor_ui, read_value, write_value,
    FormatCommand, Page, EDITOR_ROOT_IDS, SKIP_TAGS,
};
pub use persistence::{
    Debounce, PersistenceGateway, SaveFailure, SaveStatus, TaskHandle, SAVED_VISIBLE_MS,
    SAVE_DEBOUNCE_MS,
};
pub use protocol::{
    EditSet, EditorConfig, RegenerateKeyRequest, RegenerateKeyResponse, SavePayload, SaveResponse,
    CONFIG_PATH, EDITS_PATH, REGENERATE_KEY_PATH, SAVE_PATH,
};
pub use selector::{escape_identifier, Selector};
pub use seo::{apply_seo, seo_form_values, SeoMetadata};
pub use session::{EditorOptions, EditorSession};
pub use vdom::{NodeId, VirtualPage};
