//! On-disk site state
//!
//! The site root holds three things the service cares about:
//!
//! ```text
//! <root>/
//!   dist/                    built site, served as-is
//!   __editor__/config.json   { secretKey, siteId } read by the editor
//!   edits.json               last saved payload
//! ```
//!
//! Every write goes through one async mutex and lands via a temp file plus
//! rename, so readers never observe a half-written file. There is no
//! versioning: the last saved payload wins.

use std::path::{Path, PathBuf};

use frontecs_editor::{EditSet, EditorConfig, SavePayload};
use rand::RngCore;
use serde::Serialize;
use tokio::sync::Mutex;

pub const EDITS_FILE: &str = "edits.json";
pub const EDITOR_DIR: &str = "__editor__";
pub const CONFIG_FILE: &str = "config.json";
pub const DIST_DIR: &str = "dist";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Editor key does not match")]
    KeyMismatch,
}

pub struct SiteStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl SiteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn edits_path(&self) -> PathBuf {
        self.root.join(EDITS_FILE)
    }

    pub fn editor_dir(&self) -> PathBuf {
        self.root.join(EDITOR_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.editor_dir().join(CONFIG_FILE)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(DIST_DIR)
    }

    /// Public part of the last saved payload. A missing file is an empty
    /// set.
    pub async fn edit_set(&self) -> Result<EditSet, StoreError> {
        Ok(self
            .read_payload()
            .await?
            .map(|payload| payload.edit_set())
            .unwrap_or_default())
    }

    pub async fn editor_config(&self) -> Result<EditorConfig, StoreError> {
        let path = self.config_path();
        match read_json::<EditorConfig>(&path).await? {
            Some(config) => Ok(config),
            None => Ok(EditorConfig::default()),
        }
    }

    /// Persist a full payload if its key matches the configured one
    pub async fn save(&self, payload: &SavePayload) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_key(&payload.secret_key).await?;
        write_json_atomic(&self.edits_path(), payload).await?;
        tracing::info!(
            site_id = %payload.site_id,
            edits = payload.edits.len(),
            "edits saved"
        );
        Ok(())
    }

    /// Replace the editor key everywhere it is stored. Returns the new key.
    pub async fn regenerate_key(&self, current_key: &str) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.check_key(current_key).await?;

        let new_key = generate_key();

        let config_path = self.config_path();
        let mut config = read_json::<serde_json::Value>(&config_path)
            .await?
            .unwrap_or_else(|| serde_json::json!({}));
        config["secretKey"] = serde_json::Value::String(new_key.clone());
        write_json_atomic(&config_path, &config).await?;

        let edits_path = self.edits_path();
        if let Some(mut edits) = read_json::<serde_json::Value>(&edits_path).await? {
            edits["secretKey"] = serde_json::Value::String(new_key.clone());
            write_json_atomic(&edits_path, &edits).await?;
        }

        tracing::info!("editor key regenerated");
        Ok(new_key)
    }

    async fn read_payload(&self) -> Result<Option<SavePayload>, StoreError> {
        read_json(&self.edits_path()).await
    }

    async fn check_key(&self, key: &str) -> Result<(), StoreError> {
        let config = self.editor_config().await?;
        if config.secret_key.is_empty() || config.secret_key != key {
            tracing::warn!("rejected write with a wrong editor key");
            return Err(StoreError::KeyMismatch);
        }
        Ok(())
    }
}

/// 16 random bytes, lowercase hex
pub fn generate_key() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontecs_editor::{Edit, EditKind, SeoMetadata};

    fn site(key: &str) -> (tempfile::TempDir, SiteStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(EDITOR_DIR)).unwrap();
        std::fs::write(
            dir.path().join(EDITOR_DIR).join(CONFIG_FILE),
            format!(r#"{{"secretKey":"{}","siteId":"walls","theme":"dark"}}"#, key),
        )
        .unwrap();
        let store = SiteStore::new(dir.path());
        (dir, store)
    }

    fn payload(key: &str) -> SavePayload {
        SavePayload {
            secret_key: key.to_string(),
            site_id: "walls".to_string(),
            edits: vec![Edit::new("main > h1", EditKind::Text, "Hello", "Hi")],
            seo: SeoMetadata {
                title: "Walls".to_string(),
                ..SeoMetadata::default()
            },
        }
    }

    #[tokio::test]
    async fn test_missing_edits_file_is_empty_set() {
        let (_dir, store) = site("abc");
        assert_eq!(store.edit_set().await.unwrap(), EditSet::default());
    }

    #[tokio::test]
    async fn test_save_then_read_back() {
        let (dir, store) = site("abc");
        store.save(&payload("abc")).await.unwrap();

        let set = store.edit_set().await.unwrap();
        assert_eq!(set.edits.len(), 1);
        assert_eq!(set.seo.title, "Walls");

        let raw = std::fs::read_to_string(dir.path().join(EDITS_FILE)).unwrap();
        assert!(raw.contains("\n  \"secretKey\": \"abc\""));
        assert!(!dir.path().join("edits.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_with_wrong_key_is_rejected() {
        let (dir, store) = site("abc");
        let err = store.save(&payload("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::KeyMismatch));
        assert!(!dir.path().join(EDITS_FILE).exists());
    }

    #[tokio::test]
    async fn test_save_without_configured_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SiteStore::new(dir.path());
        assert!(matches!(
            store.save(&payload("")).await,
            Err(StoreError::KeyMismatch)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_edits_file_is_an_error() {
        let (dir, store) = site("abc");
        std::fs::write(dir.path().join(EDITS_FILE), "{not json").unwrap();
        assert!(matches!(store.edit_set().await, Err(StoreError::Json { .. })));
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_hide_the_rest() {
        let (dir, store) = site("abc");
        std::fs::write(
            dir.path().join(EDITS_FILE),
            r#"{
                "secretKey": "abc",
                "edits": [
                    {"selector": "main > h1", "type": "text", "before": "Hello", "after": "Hi"},
                    {"selector": "main > p", "type": "style", "after": "color: red"},
                    {"selector": "a#cta", "type": "link", "before": "/", "after": "/join"}
                ],
                "seo": {"title": "Walls"}
            }"#,
        )
        .unwrap();

        let set = store.edit_set().await.unwrap();
        let selectors: Vec<&str> = set.edits.iter().map(|e| e.selector.as_str()).collect();
        assert_eq!(selectors, vec!["main > h1", "a#cta"]);
        assert_eq!(set.seo.title, "Walls");
    }

    #[tokio::test]
    async fn test_regenerate_key_updates_both_files() {
        let (dir, store) = site("abc");
        store.save(&payload("abc")).await.unwrap();

        let new_key = store.regenerate_key("abc").await.unwrap();
        assert_eq!(new_key.len(), 32);
        assert!(new_key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let config = store.editor_config().await.unwrap();
        assert_eq!(config.secret_key, new_key);
        assert_eq!(config.site_id, "walls");
        let raw_config = std::fs::read_to_string(dir.path().join(EDITOR_DIR).join(CONFIG_FILE)).unwrap();
        assert!(raw_config.contains("\"theme\": \"dark\""));

        let raw: SavePayload =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(EDITS_FILE)).unwrap()).unwrap();
        assert_eq!(raw.secret_key, new_key);
        assert_eq!(raw.edits.len(), 1);

        assert!(matches!(
            store.regenerate_key("abc").await,
            Err(StoreError::KeyMismatch)
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }
}
