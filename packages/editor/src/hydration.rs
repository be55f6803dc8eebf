//! # Page Hydration
//!
//! Re-applies a persisted edit set onto a freshly loaded page. Runs for
//! every visitor, before edit mode is offered. Stored selectors that no
//! longer match anything are expected (markup changes between deploys) and
//! are skipped one by one without affecting the rest of the batch.

use crate::edits::Edit;
use crate::page::{apply_at_selector, Page};
use crate::protocol::EditSet;
use crate::seo::apply_seo;

/// Outcome of a hydration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub applied: usize,
    /// Selectors that matched nothing or could not be parsed
    pub skipped: Vec<String>,
}

/// Apply each edit's `after` value to its element
pub fn apply_all<P: Page>(page: &mut P, edits: &[Edit]) -> HydrationReport {
    let mut report = HydrationReport::default();
    for edit in edits {
        if apply_at_selector(page, &edit.selector, edit.kind, &edit.after) {
            report.applied += 1;
        } else {
            report.skipped.push(edit.selector.clone());
        }
    }
    report
}

/// Apply a whole edit set: element edits first, then SEO metadata
pub fn hydrate<P: Page>(page: &mut P, set: &EditSet) -> HydrationReport {
    let report = apply_all(page, &set.edits);
    if !set.seo.is_empty() {
        apply_seo(page, &set.seo);
    }
    tracing::debug!(
        applied = report.applied,
        skipped = report.skipped.len(),
        "page hydrated"
    );
    report
}
