//! # SEO Metadata
//!
//! Flat record applied to the document title and the description / Open
//! Graph meta tags. Empty fields never overwrite existing markup.

use serde::{Deserialize, Serialize};

use crate::page::Page;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
}

impl SeoMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.og_title.is_empty()
            && self.og_description.is_empty()
    }

    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            og_title: self.og_title.trim().to_string(),
            og_description: self.og_description.trim().to_string(),
        }
    }
}

const DESCRIPTION: (&str, &str) = ("name", "description");
const OG_TITLE: (&str, &str) = ("property", "og:title");
const OG_DESCRIPTION: (&str, &str) = ("property", "og:description");

fn meta_selector((attr, value): (&str, &str)) -> String {
    format!("meta[{}=\"{}\"]", attr, value)
}

fn set_meta_content<P: Page>(page: &mut P, meta: (&str, &str), content: &str) {
    if content.is_empty() {
        return;
    }
    if let Ok(Some(node)) = page.query_selector(&meta_selector(meta)) {
        page.set_attribute(&node, "content", content);
    }
}

fn meta_content<P: Page>(page: &P, meta: (&str, &str)) -> String {
    match page.query_selector(&meta_selector(meta)) {
        Ok(Some(node)) => page.attribute(&node, "content").unwrap_or_default(),
        _ => String::new(),
    }
}

/// Write non-empty SEO fields onto the page
pub fn apply_seo<P: Page>(page: &mut P, seo: &SeoMetadata) {
    if !seo.title.is_empty() {
        page.set_title(&seo.title);
    }
    set_meta_content(page, DESCRIPTION, &seo.description);
    set_meta_content(page, OG_TITLE, &seo.og_title);
    set_meta_content(page, OG_DESCRIPTION, &seo.og_description);
}

/// Values shown when the SEO modal opens: stored fields, falling back to
/// what the page currently carries
pub fn seo_form_values<P: Page>(page: &P, stored: &SeoMetadata) -> SeoMetadata {
    fn or_else(value: &str, fallback: impl FnOnce() -> String) -> String {
        if value.is_empty() {
            fallback()
        } else {
            value.to_string()
        }
    }

    SeoMetadata {
        title: or_else(&stored.title, || page.title()),
        description: or_else(&stored.description, || meta_content(page, DESCRIPTION)),
        og_title: or_else(&stored.og_title, || meta_content(page, OG_TITLE)),
        og_description: or_else(&stored.og_description, || meta_content(page, OG_DESCRIPTION)),
    }
}
