//! Integration tests for the editor crate, driven through a virtual page

use frontecs_editor::{
    hydrate, selector, Dispatch, Edit, EditKind, EditSet, EditStore, EditorConfig,
    EditorSession, History, HistoryEntry, KeyInput, NodeId, Page, SaveFailure, SaveResponse,
    SaveStatus, SeoMetadata, VirtualPage,
};

const SITE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>3D Walls</title>
  <meta name="description" content="Decorative panels">
  <meta property="og:title" content="3D Walls">
  <meta property="og:description" content="Panels for every room">
</head>
<body>
  <header id="banner"><h1>Hello</h1><nav><a href="/about">About</a><a href="/contact">Contact</a></nav></header>
  <main>
    <section><h2>Catalog</h2><p>First</p><p>Second</p><img src="/a.jpg"></section>
    <section><h2>Prices</h2><p>Cheap</p></section>
  </main>
</body>
</html>"#;

fn config() -> EditorConfig {
    EditorConfig {
        secret_key: "c0ffee".to_string(),
        site_id: "walls".to_string(),
    }
}

fn session_with(edit_set: EditSet) -> EditorSession<VirtualPage> {
    let mut page = VirtualPage::from_html(SITE);
    hydrate(&mut page, &edit_set);
    EditorSession::new(page, config(), edit_set, 42)
}

fn find(session: &EditorSession<VirtualPage>, selector: &str) -> NodeId {
    session
        .page()
        .query_selector(selector)
        .expect("valid selector")
        .expect("element present")
}

/// Activate `selector`, replace its markup and commit by clicking the body
fn edit_text(session: &mut EditorSession<VirtualPage>, selector: &str, html: &str, now: u64) {
    let element = find(session, selector);
    assert_eq!(session.click(&element, now), Dispatch::TextActivated);
    session.page_mut().set_inner_html(&element, html);
    session.text_input(now);
    let body = session.page().body_id();
    session.pointer_down(&body, now);
}

#[test]
fn test_upsert_idempotence() {
    let mut store = EditStore::new();
    store.record(Edit::new("header#banner > h1", EditKind::Text, "Hello", "Hello W"));
    store.record(Edit::new("header#banner > h1", EditKind::Text, "Hello W", "Hello World"));

    assert_eq!(store.len(), 1);
    let edit = store.get("header#banner > h1", EditKind::Text).unwrap();
    assert_eq!(edit.before, "Hello");
    assert_eq!(edit.after, "Hello World");
}

#[test]
fn test_upsert_through_session_keeps_original_before() {
    let mut session = session_with(EditSet::default());
    edit_text(&mut session, "h1", "Hello W", 0);
    edit_text(&mut session, "h1", "Hello World", 100);

    assert_eq!(session.edits().len(), 1);
    let edit = session.edits().get("header#banner > h1", EditKind::Text).unwrap();
    assert_eq!(edit.before, "Hello");
    assert_eq!(edit.after, "Hello World");
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_history_linearity() {
    let mut session = session_with(EditSet::default());
    edit_text(&mut session, "h1", "A", 0);
    edit_text(&mut session, "h2", "B", 10);
    assert!(session.undo(20));
    edit_text(&mut session, "main > section:nth-of-type(2) > p", "C", 30);

    let afters: Vec<&str> = session.history().entries().map(|e| e.after.as_str()).collect();
    assert_eq!(afters, vec!["A", "C"]);
    assert!(!session.history().can_redo());
}

#[test]
fn test_undo_redo_round_trip() {
    let mut session = session_with(EditSet::default());
    let h1 = find(&session, "h1");
    edit_text(&mut session, "h1", "Hello World", 0);

    assert!(session.undo(10));
    assert_eq!(session.page().inner_html(&h1), "Hello");
    assert_eq!(session.edits().get("header#banner > h1", EditKind::Text).unwrap().after, "Hello");

    assert!(session.redo(20));
    assert_eq!(session.page().inner_html(&h1), "Hello World");
    assert_eq!(
        session.edits().get("header#banner > h1", EditKind::Text).unwrap().after,
        "Hello World"
    );

    assert!(!session.redo(30));
    assert!(session.undo(40));
    assert!(!session.undo(50));
}

#[test]
fn test_undo_redo_schedule_saves() {
    let mut session = session_with(EditSet::default());
    edit_text(&mut session, "h1", "Hello World", 0);
    assert!(session.poll(600).is_some());

    session.undo(1000);
    assert_eq!(session.save_status(), SaveStatus::Saving);
    let payload = session.poll(1600).expect("undo triggers a save");
    assert_eq!(payload.edits[0].after, "Hello");
}

#[test]
fn test_noop_commit() {
    let mut session = session_with(EditSet::default());
    let p = find(&session, "p");
    session.click(&p, 0);
    let body = session.page().body_id();
    session.pointer_down(&body, 5);

    assert!(session.edits().is_empty());
    assert!(session.history().is_empty());
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn test_selector_round_trip_stops_at_id() {
    let page = VirtualPage::from_html(SITE);
    let banner = page.query_selector("#banner").unwrap().unwrap();
    assert_eq!(selector::resolve(&page, &banner), "header#banner");

    let link = page.query_selector("a[href=\"/contact\"]").unwrap().unwrap();
    let path = selector::resolve(&page, &link);
    assert_eq!(path, "header#banner > nav > a:nth-of-type(2)");
    assert_eq!(page.query_selector(&path).unwrap(), Some(link));
}

#[test]
fn test_every_element_round_trips() {
    let page = VirtualPage::from_html(SITE);
    let mut stack = vec![page.body_id()];
    while let Some(node) = stack.pop() {
        for child in page.children(&node) {
            let path = selector::resolve(&page, &child);
            assert_eq!(page.query_selector(&path).unwrap(), Some(child), "{}", path);
            stack.push(child);
        }
    }
}

#[test]
fn test_capacity_eviction() {
    let mut history = History::new();
    for i in 0..51 {
        history.push(HistoryEntry::new("h1", EditKind::Text, format!("v{}", i), format!("v{}", i + 1)));
    }
    assert_eq!(history.len(), 50);
    assert_eq!(history.cursor(), Some(49));
    assert_eq!(history.entries().next().unwrap().after, "v2");
    assert_eq!(history.entries().last().unwrap().after, "v51");
}

#[test]
fn test_capacity_eviction_through_session() {
    let mut session = session_with(EditSet::default());
    for i in 0..51u64 {
        edit_text(&mut session, "h1", &format!("Hello {}", i), i);
    }
    assert_eq!(session.history().len(), 50);
    assert_eq!(session.history().cursor(), Some(49));
    assert_eq!(session.edits().len(), 1);
}

#[test]
fn test_hydration_isolation() {
    let edit_set = EditSet {
        edits: vec![
            Edit::new("header#banner > h1", EditKind::Text, "Hello", "Welcome"),
            Edit::new("aside > p:nth-of-type(9)", EditKind::Text, "x", "gone"),
            Edit::new("main > section:nth-of-type(1) > img", EditKind::Image, "/a.jpg", "/b.webp"),
            Edit::new("div[[", EditKind::Text, "", "broken"),
            Edit::new("header#banner > nav > a:nth-of-type(1)", EditKind::Link, "/about", "/team"),
        ],
        seo: SeoMetadata::default(),
    };
    let mut page = VirtualPage::from_html(SITE);
    let report = hydrate(&mut page, &edit_set);

    assert_eq!(report.applied, 3);
    assert_eq!(report.skipped, vec!["aside > p:nth-of-type(9)".to_string(), "div[[".to_string()]);

    let h1 = page.query_selector("h1").unwrap().unwrap();
    let img = page.query_selector("img").unwrap().unwrap();
    let about = page.query_selector("nav > a").unwrap().unwrap();
    assert_eq!(page.inner_html(&h1), "Welcome");
    assert_eq!(page.image_source(&img), "/b.webp");
    assert_eq!(page.link_target(&about), "/team");
}

#[test]
fn test_malformed_stored_entry_keeps_the_rest() {
    let body = r#"{
        "edits": [
            {"id":"1","selector":"header#banner > h1","type":"text","before":"Hello","after":"Welcome","timestamp":1},
            {"id":"2","selector":"main > section:nth-of-type(1) > p:nth-of-type(1)","type":"style","after":"x"},
            {"id":"3","selector":null,"type":"text","after":"y"},
            {"id":"4","selector":"header#banner > nav > a:nth-of-type(1)","type":"link","before":"/about","after":"/team","timestamp":2}
        ],
        "seo": {"title":"Walls and Panels"}
    }"#;
    let mut session = session_with(EditSet::from_json_lossy(body));

    assert_eq!(session.page().title(), "Walls and Panels");
    let h1 = find(&session, "h1");
    assert_eq!(session.page().inner_html(&h1), "Welcome");

    // the next save still carries every well-formed stored edit
    edit_text(&mut session, "main > section:nth-of-type(2) > p", "Affordable", 0);
    let payload = session.poll(600).expect("debounced save");
    let selectors: Vec<&str> = payload.edits.iter().map(|e| e.selector.as_str()).collect();
    assert_eq!(
        selectors,
        vec![
            "header#banner > h1",
            "header#banner > nav > a:nth-of-type(1)",
            "main > section:nth-of-type(2) > p",
        ]
    );
}

#[test]
fn test_seo_partial_overwrite() {
    let mut session = session_with(EditSet::default());
    let draft = SeoMetadata {
        title: "New title".to_string(),
        ..SeoMetadata::default()
    };
    session.commit_seo(&draft, 0);

    let page = session.page();
    assert_eq!(page.title(), "New title");
    let description = page.query_selector("meta[name=\"description\"]").unwrap().unwrap();
    assert_eq!(page.attribute(&description, "content").as_deref(), Some("Decorative panels"));
    let og = page.query_selector("meta[property=\"og:description\"]").unwrap().unwrap();
    assert_eq!(page.attribute(&og, "content").as_deref(), Some("Panels for every room"));
}

#[test]
fn test_saved_edits_replay_on_next_load() {
    let mut session = session_with(EditSet::default());
    edit_text(&mut session, "main > section:nth-of-type(2) > p", "Affordable", 0);
    let link = find(&session, "nav > a:nth-of-type(2)");
    session.click(&link, 10);
    session.set_link_input(" tel:+37400 ");
    session.link_key("Enter", 10).unwrap();
    session.commit_seo(
        &SeoMetadata {
            description: "Panels".to_string(),
            ..SeoMetadata::default()
        },
        20,
    );

    let payload = session.poll(620).expect("debounced save");
    assert_eq!(payload.secret_key, "c0ffee");
    let wire = serde_json::to_string(&payload).unwrap();
    let stored: EditSet = EditSet::from_json_lossy(&wire);

    let reloaded = session_with(stored);
    let cheap = find(&reloaded, "main > section:nth-of-type(2) > p");
    let contact = find(&reloaded, "nav > a:nth-of-type(2)");
    assert_eq!(reloaded.page().inner_html(&cheap), "Affordable");
    assert_eq!(reloaded.page().link_target(&contact), "tel:+37400");
    let meta = find(&reloaded, "meta[name=\"description\"]");
    assert_eq!(reloaded.page().attribute(&meta, "content").as_deref(), Some("Panels"));
    assert_eq!(reloaded.edits().len(), 2);
}

#[test]
fn test_escape_does_not_record_spurious_edit() {
    let mut session = session_with(EditSet::default());
    let h2 = find(&session, "h2");
    session.click(&h2, 0);
    session.page_mut().set_inner_html(&h2, "Typo");
    session.text_input(1);
    session.key_down(&KeyInput::new("Escape"), 2);

    assert_eq!(session.page().inner_html(&h2), "Catalog");
    assert!(session.edits().is_empty());
    assert!(session.history().is_empty());
}

#[test]
fn test_save_failure_then_retry() {
    let mut session = session_with(EditSet::default());
    edit_text(&mut session, "h1", "Hi", 0);
    assert!(session.poll(600).is_some());
    session.on_save_result(Err(SaveFailure::Transport("connection refused".into())), 650);
    assert_eq!(session.save_status(), SaveStatus::Failed);
    assert_eq!(session.poll(10_000), None);
    assert_eq!(session.save_status(), SaveStatus::Failed);

    session.key_down(&KeyInput::new("s").with_meta(), 11_000);
    let retry = session.poll(11_000).expect("explicit save retries");
    assert_eq!(retry.edits.len(), 1);
    session.on_save_result(Ok(SaveResponse { ok: true }), 11_100);
    assert_eq!(session.save_status(), SaveStatus::Saved { hide_at: 13_600 });
    session.poll(13_600);
    assert_eq!(session.save_status(), SaveStatus::Hidden);
}

#[test]
fn test_editor_ui_clicks_keep_activation() {
    let mut session = session_with(EditSet::default());
    let body = session.page().body_id();
    let toolbar = session.page_mut().append_element(body, "div");
    session.page_mut().set_attribute(&toolbar, "id", "__fe_toolbar__");
    let button = session.page_mut().append_element(toolbar, "button");

    let h1 = find(&session, "h1");
    session.click(&h1, 0);
    session.pointer_down(&button, 1);
    assert_eq!(session.click(&button, 1), Dispatch::Ignored);
    assert_eq!(session.state().active_text(), Some(&h1));
}
