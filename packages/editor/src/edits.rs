//! # Edit Store
//!
//! Collapsed "latest wins" view of everything the operator changed: at most
//! one [`Edit`] per `(selector, kind)`. An upsert keeps the stored `before`
//! so each entry always describes original page state → current state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Which element property an edit changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    /// Element markup (`innerHTML`)
    Text,
    /// Image `src`
    Image,
    /// Anchor `href`
    Link,
}

/// One recorded change to one page element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    #[serde(default)]
    pub id: String,
    pub selector: String,
    #[serde(rename = "type")]
    pub kind: EditKind,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
    #[serde(default)]
    pub timestamp: u64,
}

impl Edit {
    pub fn new(
        selector: impl Into<String>,
        kind: EditKind,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            selector: selector.into(),
            kind,
            before: before.into(),
            after: after.into(),
            timestamp: 0,
        }
    }

    fn same_key(&self, selector: &str, kind: EditKind) -> bool {
        self.selector == selector && self.kind == kind
    }
}

/// Ordered collection of the latest edit per `(selector, kind)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditStore {
    edits: Vec<Edit>,
}

impl EditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a persisted edit set as-is
    pub fn from_edits(edits: Vec<Edit>) -> Self {
        Self { edits }
    }

    /// Upsert `edit`, inheriting `before` from an existing entry for the
    /// same key. Returns the entry as stored.
    pub fn record(&mut self, mut edit: Edit) -> &Edit {
        match self
            .edits
            .iter()
            .position(|e| e.same_key(&edit.selector, edit.kind))
        {
            Some(index) => {
                edit.before = std::mem::take(&mut self.edits[index].before);
                self.edits[index] = edit;
                &self.edits[index]
            }
            None => {
                self.edits.push(edit);
                &self.edits[self.edits.len() - 1]
            }
        }
    }

    /// Overwrite `after` for the matching key (undo/redo resync). Returns
    /// false when there is no such entry.
    pub fn sync_after(&mut self, selector: &str, kind: EditKind, value: &str) -> bool {
        match self.edits.iter_mut().find(|e| e.same_key(selector, kind)) {
            Some(edit) => {
                edit.after = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, selector: &str, kind: EditKind) -> Option<&Edit> {
        self.edits.iter().find(|e| e.same_key(selector, kind))
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Generates `edit_<ms>_<suffix>` identifiers
#[derive(Debug)]
pub struct EditIds {
    rng: SmallRng,
}

impl EditIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn next_id(&mut self, now_ms: u64) -> String {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let suffix: String = (0..4)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        format!("edit_{}_{}", now_ms, suffix)
    }

    /// Stamp id and timestamp onto a fresh edit
    pub fn stamp(&mut self, mut edit: Edit, now_ms: u64) -> Edit {
        edit.id = self.next_id(now_ms);
        edit.timestamp = now_ms;
        edit
    }
}
