//! # Authorization Bootstrap
//!
//! Edit mode is offered only when the operator proved knowledge of the
//! configured key during this browser session. The key arrives once via
//! `/__edit__/<key>` or `?__edit__=<key>` and is then cached in session
//! storage. Failures are silent: visitors never learn an editor exists.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Session-storage slot holding the cached key
pub const SESSION_KEY: &str = "__fe_key__";

/// Browser session storage (or a stand-in)
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory [`SessionStore`]
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

fn path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/__edit__/([a-f0-9]+)").expect("valid key path pattern"))
}

fn query_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[?&]__edit__=([a-f0-9]+)").expect("valid key query pattern"))
}

/// Key supplied in the URL path or query string, path taking precedence
pub fn extract_key_from_url(pathname: &str, search: &str) -> Option<String> {
    path_pattern()
        .captures(pathname)
        .or_else(|| query_pattern().captures(search))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decide whether this session may edit, caching a matching URL key
pub fn authorize<S: SessionStore>(
    store: &mut S,
    configured_key: &str,
    pathname: &str,
    search: &str,
) -> bool {
    if configured_key.is_empty() {
        tracing::debug!("no editor key configured");
        return false;
    }
    if let Some(url_key) = extract_key_from_url(pathname, search) {
        if url_key != configured_key {
            tracing::debug!("editor key in url does not match");
            return false;
        }
        store.set(SESSION_KEY, configured_key);
    }
    store.get(SESSION_KEY).as_deref() == Some(configured_key)
}

/// Drop edit rights. Returns the location to reload: the bare path with
/// any `/__edit__/<key>` segment removed.
pub fn exit<S: SessionStore>(store: &mut S, pathname: &str) -> String {
    store.remove(SESSION_KEY);
    let bare = path_pattern().replace(pathname, "");
    if bare.is_empty() {
        "/".to_string()
    } else {
        bare.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0a1b2c3d";

    #[test]
    fn test_extract_key() {
        assert_eq!(extract_key_from_url("/__edit__/0a1b2c3d", ""), Some(KEY.to_string()));
        assert_eq!(extract_key_from_url("/", "?__edit__=0a1b2c3d"), Some(KEY.to_string()));
        assert_eq!(
            extract_key_from_url("/gallery", "?lang=hy&__edit__=0a1b2c3d"),
            Some(KEY.to_string())
        );
        assert_eq!(extract_key_from_url("/", "?x__edit__=0a1b"), None);
        assert_eq!(extract_key_from_url("/__edit__/", ""), None);
        assert_eq!(extract_key_from_url("/__edit__/XYZ", ""), None);
    }

    #[test]
    fn test_matching_url_key_is_cached() {
        let mut store = MemorySessionStore::default();
        assert!(authorize(&mut store, KEY, "/__edit__/0a1b2c3d", ""));
        assert_eq!(store.get(SESSION_KEY).as_deref(), Some(KEY));

        // later navigation without the key stays authorized
        assert!(authorize(&mut store, KEY, "/about", ""));
    }

    #[test]
    fn test_mismatched_url_key_is_rejected() {
        let mut store = MemorySessionStore::default();
        store.set(SESSION_KEY, KEY);
        assert!(!authorize(&mut store, KEY, "/", "?__edit__=ffff"));
    }

    #[test]
    fn test_absent_key_is_read_only() {
        let mut store = MemorySessionStore::default();
        assert!(!authorize(&mut store, KEY, "/", ""));
        store.set(SESSION_KEY, "stale");
        assert!(!authorize(&mut store, KEY, "/", ""));
        assert!(!authorize(&mut store, "", "/", ""));
    }

    #[test]
    fn test_exit_clears_cached_key() {
        let mut store = MemorySessionStore::default();
        store.set(SESSION_KEY, KEY);
        assert_eq!(exit(&mut store, "/pricing"), "/pricing");
        assert!(!authorize(&mut store, KEY, "/pricing", ""));

        assert_eq!(exit(&mut store, "/__edit__/0a1b2c3d"), "/");
        assert_eq!(exit(&mut store, "/gallery/__edit__/0a1b2c3d"), "/gallery");
    }
}
