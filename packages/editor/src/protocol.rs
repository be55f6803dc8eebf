//! Wire types shared by the editor and the persistence service

use serde::{Deserialize, Deserializer, Serialize};

use crate::edits::Edit;
use crate::seo::SeoMetadata;

/// Path of the editor config resource
pub const CONFIG_PATH: &str = "/__editor__/config.json";
/// Edit-set endpoint
pub const EDITS_PATH: &str = "/api/edits";
/// Save endpoint
pub const SAVE_PATH: &str = "/api/save";
/// Key rotation endpoint
pub const REGENERATE_KEY_PATH: &str = "/api/regenerate-key";

/// Editor config resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub site_id: String,
}

/// Persisted edits and SEO metadata as returned by the edit-set endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditSet {
    #[serde(default, deserialize_with = "valid_edits")]
    pub edits: Vec<Edit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seo: SeoMetadata,
}

impl EditSet {
    /// Parse a response body, degrading to an empty set when the body is not
    /// a JSON object. Malformed entries inside `edits` are dropped one by one.
    pub fn from_json_lossy(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(error = %e, "edit set could not be parsed, starting empty");
                Self::default()
            }
        }
    }
}

/// Body of the save endpoint (also the on-disk format)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub secret_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_id: String,
    #[serde(default, deserialize_with = "valid_edits")]
    pub edits: Vec<Edit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seo: SeoMetadata,
}

impl SavePayload {
    /// The public part of a stored payload
    pub fn edit_set(&self) -> EditSet {
        EditSet {
            edits: self.edits.clone(),
            seo: self.seo.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateKeyRequest {
    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateKeyResponse {
    pub new_key: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep every well-formed edit, dropping (and logging) the rest
fn valid_edits<'de, D>(deserializer: D) -> Result<Vec<Edit>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<serde_json::Value> = null_as_default(deserializer)?;
    let total = raw.len();
    let edits: Vec<Edit> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(edit) => Some(edit),
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping malformed edit");
                None
            }
        })
        .collect();
    if edits.len() < total {
        tracing::warn!(kept = edits.len(), total, "edit set contained malformed entries");
    }
    Ok(edits)
}
