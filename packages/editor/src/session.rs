//! # Editor Session
//!
//! The context object owning all editing state for one authorized browser
//! session: the page, the collapsed edit store, the undo history, the
//! activation state machine and the persistence gateway.
//!
//! Every entry point takes the host's millisecond clock. Mutations are
//! synchronous; nothing yields mid-update, so the commit-before-reactivate
//! ordering holds for every event. After handling an event the host calls
//! [`EditorSession::poll`] and sends any payload it returns, then arms a
//! wake-up for [`EditorSession::next_deadline`].

use crate::auth::{self, SessionStore};
use crate::dispatch::{resolve_target, ActiveState, Dispatch, InteractionTarget, Point, TouchTracker, TAP_SLOP};
use crate::edits::{Edit, EditIds, EditKind, EditStore};
use crate::errors::EditorError;
use crate::history::{History, HistoryEntry, MAX_HISTORY};
use crate::image_upload::{self, ImageOptions};
use crate::keyboard::{KeyInput, Shortcut};
use crate::layout::{self, PanelSize, Placement};
use crate::page::{apply_at_selector, contains, is_editor_ui, read_value, FormatCommand, Page};
use crate::persistence::{PersistenceGateway, SaveFailure, SaveStatus, SAVED_VISIBLE_MS, SAVE_DEBOUNCE_MS};
use crate::protocol::{EditSet, EditorConfig, SavePayload, SaveResponse};
use crate::selector;
use crate::seo::{apply_seo, seo_form_values, SeoMetadata};

/// Marks the element currently being edited
const ACTIVE_ATTRIBUTE: &str = "data-fe-active";
/// Markup snapshot taken on activation
const BEFORE_ATTRIBUTE: &str = "data-fe-before";

/// Tunables with production defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorOptions {
    pub debounce_ms: u64,
    pub saved_visible_ms: u64,
    pub history_capacity: usize,
    pub tap_slop: f64,
    pub image: ImageOptions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            debounce_ms: SAVE_DEBOUNCE_MS,
            saved_visible_ms: SAVED_VISIBLE_MS,
            history_capacity: MAX_HISTORY,
            tap_slop: TAP_SLOP,
            image: ImageOptions::default(),
        }
    }
}

/// One operator's editing session over a page
pub struct EditorSession<P: Page> {
    page: P,
    config: EditorConfig,
    options: EditorOptions,
    store: EditStore,
    history: History,
    seo: SeoMetadata,
    state: ActiveState<P::Node>,
    gateway: PersistenceGateway,
    ids: EditIds,
    touch: TouchTracker,
    seo_modal_open: bool,
    toolbar_size: PanelSize,
}

impl<P: Page> EditorSession<P> {
    /// Start editing `page`, which must already be hydrated with `edit_set`
    pub fn new(page: P, config: EditorConfig, edit_set: EditSet, seed: u64) -> Self {
        Self::with_options(page, config, edit_set, EditorOptions::default(), seed)
    }

    pub fn with_options(
        page: P,
        config: EditorConfig,
        edit_set: EditSet,
        options: EditorOptions,
        seed: u64,
    ) -> Self {
        tracing::info!(
            site_id = %config.site_id,
            edits = edit_set.edits.len(),
            "edit mode enabled"
        );
        Self {
            page,
            config,
            options,
            store: EditStore::from_edits(edit_set.edits),
            history: History::with_capacity(options.history_capacity),
            seo: edit_set.seo,
            state: ActiveState::Idle,
            gateway: PersistenceGateway::with_timings(options.debounce_ms, options.saved_visible_ms),
            ids: EditIds::new(seed),
            touch: TouchTracker::default(),
            seo_modal_open: false,
            toolbar_size: PanelSize::default(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn edits(&self) -> &EditStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn seo(&self) -> &SeoMetadata {
        &self.seo
    }

    pub fn state(&self) -> &ActiveState<P::Node> {
        &self.state
    }

    pub fn save_status(&self) -> SaveStatus {
        self.gateway.status()
    }

    pub fn seo_modal_open(&self) -> bool {
        self.seo_modal_open
    }

    // ------------------------------------------------------------------
    // Pointer dispatch
    // ------------------------------------------------------------------

    /// Early pointer-down: commit the active text element when the pointer
    /// lands outside it (and outside the editor UI)
    pub fn pointer_down(&mut self, target: &P::Node, now_ms: u64) {
        let outside = match &self.state {
            ActiveState::TextActive { element, .. } => {
                !is_editor_ui(&self.page, target) && !contains(&self.page, element, target)
            }
            _ => false,
        };
        if outside {
            self.commit_text(now_ms);
        }
    }

    /// Primary click on `target`
    pub fn click(&mut self, target: &P::Node, now_ms: u64) -> Dispatch {
        let resolved = resolve_target(&self.page, target);
        if resolved == InteractionTarget::EditorUi {
            return Dispatch::Ignored;
        }

        self.commit_text(now_ms);
        self.close_popups();

        match resolved {
            InteractionTarget::Image(image) => {
                self.state = ActiveState::ImagePopupOpen { image };
                Dispatch::ImagePopupOpened
            }
            InteractionTarget::Link(anchor) => {
                let input = self.page.link_target(&anchor);
                self.state = ActiveState::LinkPopupOpen { anchor, input };
                Dispatch::LinkPopupOpened
            }
            InteractionTarget::Text(element) => {
                self.activate_text(element);
                Dispatch::TextActivated
            }
            InteractionTarget::EditorUi | InteractionTarget::Nothing => Dispatch::Idle,
        }
    }

    pub fn touch_start(&mut self, point: Point) {
        self.touch.begin(point);
    }

    /// End of a touch. `target` is the element under the end point. Swipes
    /// are ignored; taps dispatch like clicks.
    pub fn touch_end(&mut self, point: Point, target: Option<&P::Node>, now_ms: u64) -> Dispatch {
        if !self.touch.end(point, self.options.tap_slop) {
            return Dispatch::Ignored;
        }
        match target {
            Some(target) => self.click(target, now_ms),
            None => Dispatch::Ignored,
        }
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handle a key press. Returns the shortcut it triggered, if any.
    pub fn key_down(&mut self, input: &KeyInput, now_ms: u64) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(input)?;
        match shortcut {
            Shortcut::Save => self.save_now(now_ms),
            Shortcut::Undo => {
                self.undo(now_ms);
            }
            Shortcut::Redo => {
                self.redo(now_ms);
            }
            Shortcut::Escape => self.escape(now_ms),
        }
        Some(shortcut)
    }

    /// Revert the active text element to its snapshot, commit, close popups
    pub fn escape(&mut self, now_ms: u64) {
        if let ActiveState::TextActive { element, before } = &self.state {
            let (element, before) = (element.clone(), before.clone());
            self.page.set_inner_html(&element, &before);
            self.commit_text(now_ms);
        }
        self.close_popups();
    }

    // ------------------------------------------------------------------
    // Text editing
    // ------------------------------------------------------------------

    fn activate_text(&mut self, element: P::Node) {
        let before = self.page.inner_html(&element);
        self.page.set_attribute(&element, BEFORE_ATTRIBUTE, &before);
        self.page.set_attribute(&element, ACTIVE_ATTRIBUTE, "1");
        self.page.set_editable(&element, true);
        tracing::debug!(selector = %selector::resolve(&self.page, &element), "text activated");
        self.state = ActiveState::TextActive { element, before };
    }

    /// Content of the active element changed
    pub fn text_input(&mut self, now_ms: u64) {
        if self.state.active_text().is_some() {
            self.gateway.schedule_save(now_ms);
        }
    }

    /// Apply a toolbar command to the active element
    pub fn format(&mut self, command: &FormatCommand, now_ms: u64) {
        if let Some(element) = self.state.active_text().cloned() {
            self.page.exec_format(&element, command);
            self.gateway.schedule_save(now_ms);
        }
    }

    /// Leave `TextActive`, recording an edit only if the markup changed
    pub fn commit_text(&mut self, now_ms: u64) {
        if self.state.active_text().is_none() {
            return;
        }
        if let ActiveState::TextActive { element, before } =
            std::mem::replace(&mut self.state, ActiveState::Idle)
        {
            self.page.set_editable(&element, false);
            self.page.remove_attribute(&element, ACTIVE_ATTRIBUTE);
            self.page.remove_attribute(&element, BEFORE_ATTRIBUTE);
            let after = read_value(&self.page, &element, EditKind::Text);
            if before != after {
                self.record(&element, EditKind::Text, before, after, now_ms);
            }
        }
    }

    // ------------------------------------------------------------------
    // Image & link popups
    // ------------------------------------------------------------------

    /// File chosen in the image popup
    pub fn image_file_selected(&mut self, bytes: &[u8], now_ms: u64) -> Result<(), EditorError> {
        if self.state.active_image().is_none() {
            return Err(EditorError::NoActiveImage);
        }
        let data_uri = image_upload::encode_data_uri(bytes, self.options.image)?;
        self.replace_image(&data_uri, now_ms)
    }

    /// Swap the active image's source for `src`
    pub fn replace_image(&mut self, src: &str, now_ms: u64) -> Result<(), EditorError> {
        let image = self
            .state
            .active_image()
            .cloned()
            .ok_or(EditorError::NoActiveImage)?;
        let before = read_value(&self.page, &image, EditKind::Image);
        self.page.set_image_source(&image, src);
        self.record(&image, EditKind::Image, before, src.to_string(), now_ms);
        self.close_popups();
        Ok(())
    }

    pub fn set_link_input(&mut self, value: &str) {
        if let ActiveState::LinkPopupOpen { input, .. } = &mut self.state {
            *input = value.to_string();
        }
    }

    /// Key pressed inside the link input: Enter commits, Escape closes
    pub fn link_key(&mut self, key: &str, now_ms: u64) -> Result<(), EditorError> {
        match key {
            "Enter" => self.commit_link(now_ms),
            "Escape" => {
                self.close_popups();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Write the link input (trimmed) to the anchor and record it
    pub fn commit_link(&mut self, now_ms: u64) -> Result<(), EditorError> {
        let (anchor, input) = match &self.state {
            ActiveState::LinkPopupOpen { anchor, input } => (anchor.clone(), input.trim().to_string()),
            _ => return Err(EditorError::NoActiveLink),
        };
        let before = read_value(&self.page, &anchor, EditKind::Link);
        self.page.set_link_target(&anchor, &input);
        self.record(&anchor, EditKind::Link, before, input, now_ms);
        self.close_popups();
        Ok(())
    }

    /// Close image/link popups without committing
    pub fn close_popups(&mut self) {
        if matches!(
            self.state,
            ActiveState::ImagePopupOpen { .. } | ActiveState::LinkPopupOpen { .. }
        ) {
            self.state = ActiveState::Idle;
        }
    }

    // ------------------------------------------------------------------
    // SEO
    // ------------------------------------------------------------------

    /// Open the SEO modal, returning the values to prefill
    pub fn open_seo(&mut self) -> SeoMetadata {
        self.seo_modal_open = true;
        seo_form_values(&self.page, &self.seo)
    }

    pub fn close_seo(&mut self) {
        self.seo_modal_open = false;
    }

    /// Replace stored SEO wholesale, apply it and schedule a save
    pub fn commit_seo(&mut self, draft: &SeoMetadata, now_ms: u64) {
        self.seo = draft.trimmed();
        apply_seo(&mut self.page, &self.seo);
        self.gateway.schedule_save(now_ms);
        self.seo_modal_open = false;
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Step back one history entry. Returns false when there is nothing to
    /// undo.
    pub fn undo(&mut self, now_ms: u64) -> bool {
        self.commit_text(now_ms);
        match self.history.undo().cloned() {
            Some(entry) => {
                self.apply_history_value(&entry, &entry.before, now_ms);
                true
            }
            None => false,
        }
    }

    /// Step forward one history entry. Returns false when there is nothing
    /// to redo.
    pub fn redo(&mut self, now_ms: u64) -> bool {
        self.commit_text(now_ms);
        match self.history.redo().cloned() {
            Some(entry) => {
                self.apply_history_value(&entry, &entry.after, now_ms);
                true
            }
            None => false,
        }
    }

    fn apply_history_value(&mut self, entry: &HistoryEntry, value: &str, now_ms: u64) {
        apply_at_selector(&mut self.page, &entry.selector, entry.kind, value);
        self.store.sync_after(&entry.selector, entry.kind, value);
        self.gateway.schedule_save(now_ms);
    }

    fn record(&mut self, node: &P::Node, kind: EditKind, before: String, after: String, now_ms: u64) {
        let selector = selector::resolve(&self.page, node);
        tracing::debug!(%selector, ?kind, "edit recorded");
        let edit = self.ids.stamp(Edit::new(selector, kind, before, after), now_ms);
        let stored = self.store.record(edit);
        self.history.push(HistoryEntry::from(stored));
        self.gateway.schedule_save(now_ms);
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Explicit save: commit pending text and send on the next poll
    pub fn save_now(&mut self, now_ms: u64) {
        self.commit_text(now_ms);
        self.gateway.save_now(now_ms);
    }

    /// Advance timers; returns the payload to POST when a save is due
    pub fn poll(&mut self, now_ms: u64) -> Option<SavePayload> {
        self.gateway.poll(now_ms).then(|| self.save_payload())
    }

    pub fn on_save_result(&mut self, result: Result<SaveResponse, SaveFailure>, now_ms: u64) {
        self.gateway.on_save_result(result, now_ms);
    }

    /// When the host must call [`poll`](Self::poll) next
    pub fn next_deadline(&self) -> Option<u64> {
        self.gateway.next_deadline()
    }

    /// Full snapshot sent to the save endpoint
    pub fn save_payload(&self) -> SavePayload {
        SavePayload {
            secret_key: self.config.secret_key.clone(),
            site_id: self.config.site_id.clone(),
            edits: self.store.edits().to_vec(),
            seo: self.seo.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Overlay layout
    // ------------------------------------------------------------------

    /// Report the toolbar's rendered size
    pub fn set_toolbar_size(&mut self, size: PanelSize) {
        self.toolbar_size = size;
    }

    pub fn toolbar_placement(&self) -> Option<Placement> {
        self.state.active_text().map(|element| {
            layout::toolbar_placement(
                self.page.bounding_rect(element),
                self.page.viewport(),
                self.toolbar_size,
            )
        })
    }

    pub fn image_overlay_placement(&self) -> Option<Placement> {
        self.state
            .active_image()
            .map(|image| layout::image_overlay_placement(self.page.bounding_rect(image), self.page.viewport()))
    }

    pub fn link_popup_placement(&self) -> Option<Placement> {
        self.state
            .active_link()
            .map(|anchor| layout::link_popup_placement(self.page.bounding_rect(anchor), self.page.viewport()))
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// End the session: forget the cached key and hand back the page
    /// together with the location to reload. Unsaved edits are dropped.
    pub fn exit<S: SessionStore>(self, store: &mut S, pathname: &str) -> (P, String) {
        tracing::info!("edit mode exited");
        let reload_to = auth::exit(store, pathname);
        (self.page, reload_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::{NodeId, VirtualPage};

    const PAGE: &str = r#"<html><head><title>Walls</title></head><body>
<main><h1>Hello</h1><p>First</p><p>Second</p>
<a href="/contact">Contact</a><img src="/wall.jpg"></main>
</body></html>"#;

    fn session() -> EditorSession<VirtualPage> {
        let config = EditorConfig {
            secret_key: "abc".to_string(),
            site_id: "walls".to_string(),
        };
        EditorSession::new(VirtualPage::from_html(PAGE), config, EditSet::default(), 1)
    }

    fn node(session: &EditorSession<VirtualPage>, selector: &str) -> NodeId {
        session.page().query_selector(selector).unwrap().unwrap()
    }

    fn type_into(session: &mut EditorSession<VirtualPage>, html: &str, now: u64) {
        let element = session.state().active_text().copied().expect("text active");
        session.page_mut().set_inner_html(&element, html);
        session.text_input(now);
    }

    #[test]
    fn test_click_text_activates_and_marks_element() {
        let mut session = session();
        let h1 = node(&session, "h1");

        assert_eq!(session.click(&h1, 0), Dispatch::TextActivated);
        assert_eq!(session.state().active_text(), Some(&h1));
        assert!(session.page().is_editable(h1));
        assert_eq!(session.page().focused(), Some(h1));
        assert_eq!(session.page().attribute(&h1, "data-fe-active").as_deref(), Some("1"));
    }

    #[test]
    fn test_noop_commit_records_nothing() {
        let mut session = session();
        let h1 = node(&session, "h1");
        let body = session.page().body_id();

        session.click(&h1, 0);
        session.pointer_down(&body, 10);

        assert!(session.state().is_idle());
        assert!(session.edits().is_empty());
        assert!(session.history().is_empty());
        assert!(!session.page().is_editable(h1));
        assert_eq!(session.page().attribute(&h1, "data-fe-active"), None);
        assert_eq!(session.page().attribute(&h1, "data-fe-before"), None);
    }

    #[test]
    fn test_clicking_elsewhere_commits_before_activating() {
        let mut session = session();
        let h1 = node(&session, "h1");
        let first = node(&session, "p:nth-of-type(1)");

        session.click(&h1, 0);
        type_into(&mut session, "Hello World", 5);
        session.pointer_down(&first, 10);
        assert_eq!(session.edits().len(), 1);

        assert_eq!(session.click(&first, 10), Dispatch::TextActivated);
        assert_eq!(session.state().active_text(), Some(&first));

        let edit = session.edits().get("main > h1", EditKind::Text).unwrap();
        assert_eq!(edit.before, "Hello");
        assert_eq!(edit.after, "Hello World");
        assert!(edit.id.starts_with("edit_10_"));
    }

    #[test]
    fn test_pointer_down_inside_active_element_keeps_it() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session.click(&h1, 0);
        session.pointer_down(&h1, 1);
        assert_eq!(session.state().active_text(), Some(&h1));
    }

    #[test]
    fn test_image_and_link_clicks_open_popups() {
        let mut session = session();
        let img = node(&session, "img");
        let link = node(&session, "a");

        let dispatch = session.click(&img, 0);
        assert_eq!(dispatch, Dispatch::ImagePopupOpened);
        assert!(dispatch.prevents_default());
        assert_eq!(session.state().active_image(), Some(&img));

        assert_eq!(session.click(&link, 1), Dispatch::LinkPopupOpened);
        assert_eq!(
            session.state(),
            &ActiveState::LinkPopupOpen {
                anchor: link,
                input: "/contact".to_string()
            }
        );
    }

    #[test]
    fn test_link_commit_trims_and_records() {
        let mut session = session();
        let link = node(&session, "a");
        session.click(&link, 0);
        session.set_link_input("  tel:+374000  ");
        session.link_key("Enter", 5).unwrap();

        assert!(session.state().is_idle());
        assert_eq!(session.page().link_target(&link), "tel:+374000");
        let edit = session.edits().get("main > a", EditKind::Link).unwrap();
        assert_eq!(edit.before, "/contact");
        assert_eq!(edit.after, "tel:+374000");
    }

    #[test]
    fn test_link_escape_closes_without_commit() {
        let mut session = session();
        let link = node(&session, "a");
        session.click(&link, 0);
        session.set_link_input("/elsewhere");
        session.link_key("Escape", 5).unwrap();

        assert!(session.state().is_idle());
        assert_eq!(session.page().link_target(&link), "/contact");
        assert!(session.edits().is_empty());
        assert!(matches!(session.commit_link(6), Err(EditorError::NoActiveLink)));
    }

    #[test]
    fn test_replace_image_records_edit() {
        let mut session = session();
        let img = node(&session, "img");
        assert!(matches!(
            session.replace_image("data:image/webp;base64,AAAA", 0),
            Err(EditorError::NoActiveImage)
        ));

        session.click(&img, 0);
        session.replace_image("data:image/webp;base64,AAAA", 1).unwrap();

        assert!(session.state().is_idle());
        assert_eq!(session.page().image_source(&img), "data:image/webp;base64,AAAA");
        let edit = session.edits().get("main > img", EditKind::Image).unwrap();
        assert_eq!(edit.before, "/wall.jpg");
    }

    #[test]
    fn test_escape_reverts_active_text() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session.click(&h1, 0);
        type_into(&mut session, "Goodbye", 1);

        assert_eq!(session.key_down(&KeyInput::new("Escape"), 2), Some(Shortcut::Escape));

        assert!(session.state().is_idle());
        assert_eq!(session.page().inner_html(&h1), "Hello");
        assert!(session.edits().is_empty());
    }

    #[test]
    fn test_undo_commits_active_text_first() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session.click(&h1, 0);
        type_into(&mut session, "Hello World", 1);

        assert!(session.undo(2));
        assert!(session.state().is_idle());
        assert_eq!(session.page().inner_html(&h1), "Hello");
        assert_eq!(session.edits().get("main > h1", EditKind::Text).unwrap().after, "Hello");

        assert!(session.redo(3));
        assert_eq!(session.page().inner_html(&h1), "Hello World");
        assert!(!session.redo(4));
    }

    #[test]
    fn test_format_applies_to_active_text() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session.format(&FormatCommand::Bold, 0);
        assert_eq!(session.save_status(), SaveStatus::Hidden);

        session.click(&h1, 0);
        session.format(&FormatCommand::Italic, 1);
        assert_eq!(session.page().inner_html(&h1), "<i>Hello</i>");
        assert_eq!(session.save_status(), SaveStatus::Saving);

        session.commit_text(2);
        assert_eq!(session.edits().get("main > h1", EditKind::Text).unwrap().after, "<i>Hello</i>");
    }

    #[test]
    fn test_typing_burst_produces_one_payload() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session.click(&h1, 0);
        for (i, text) in ["H", "He", "Hey"].iter().enumerate() {
            type_into(&mut session, text, i as u64 * 100);
            assert!(session.poll(i as u64 * 100).is_none());
        }
        assert_eq!(session.next_deadline(), Some(800));
        assert!(session.poll(799).is_none());

        // the payload carries committed edits only; typing is still live
        let payload = session.poll(800).unwrap();
        assert_eq!(payload.secret_key, "abc");
        assert_eq!(payload.site_id, "walls");
        assert!(payload.edits.is_empty());
    }

    #[test]
    fn test_save_shortcut_commits_and_sends_immediately() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session.click(&h1, 0);
        type_into(&mut session, "Hi", 1);

        let shortcut = session.key_down(&KeyInput::new("s").with_ctrl(), 2);
        assert_eq!(shortcut, Some(Shortcut::Save));

        let payload = session.poll(2).unwrap();
        assert_eq!(payload.edits.len(), 1);
        assert_eq!(payload.edits[0].after, "Hi");

        session.on_save_result(Ok(SaveResponse { ok: true }), 50);
        assert_eq!(session.save_status(), SaveStatus::Saved { hide_at: 2550 });
    }

    #[test]
    fn test_swipe_does_not_dispatch() {
        let mut session = session();
        let h1 = node(&session, "h1");

        session.touch_start(Point::new(10.0, 10.0));
        assert_eq!(session.touch_end(Point::new(10.0, 60.0), Some(&h1), 0), Dispatch::Ignored);
        assert!(session.state().is_idle());

        session.touch_start(Point::new(10.0, 10.0));
        assert_eq!(session.touch_end(Point::new(14.0, 12.0), Some(&h1), 0), Dispatch::TextActivated);
    }

    #[test]
    fn test_seo_commit_applies_and_schedules_save() {
        let mut session = session();
        let prefill = session.open_seo();
        assert!(session.seo_modal_open());
        assert_eq!(prefill.title, "Walls");

        let draft = SeoMetadata {
            title: "  3D Panels  ".to_string(),
            ..SeoMetadata::default()
        };
        session.commit_seo(&draft, 0);

        assert!(!session.seo_modal_open());
        assert_eq!(session.page().title(), "3D Panels");
        assert_eq!(session.poll(600).unwrap().seo.title, "3D Panels");
    }

    #[test]
    fn test_toolbar_follows_active_element() {
        let mut session = session();
        let h1 = node(&session, "h1");
        session
            .page_mut()
            .set_rect(h1, crate::layout::Rect::new(100.0, 300.0, 400.0, 50.0));

        assert_eq!(session.toolbar_placement(), None);
        session.click(&h1, 0);
        assert_eq!(
            session.toolbar_placement(),
            Some(Placement {
                top: 246.0,
                left: 100.0
            })
        );

        session.page_mut().set_viewport(crate::layout::Viewport {
            scroll_y: 1000.0,
            ..crate::layout::Viewport::default()
        });
        assert_eq!(session.toolbar_placement().map(|p| p.top), Some(1246.0));
    }

    #[test]
    fn test_exit_clears_key() {
        let mut store = crate::auth::MemorySessionStore::default();
        store.set(crate::auth::SESSION_KEY, "abc");
        let (_page, reload) = session().exit(&mut store, "/gallery");
        assert_eq!(reload, "/gallery");
        assert_eq!(store.get(crate::auth::SESSION_KEY), None);
    }
}
