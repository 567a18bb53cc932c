//! Site adapter trait and the built-in eduscol adapter.
//!
//! An adapter owns every "locate this heading/class/block" rule for one
//! site. The harvest engine only sees disciplines, program entries and
//! document links, so a markup change on the source site is absorbed here.

mod eduscol;

use eduscol_shared::{Discipline, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::links::LinkSet;

pub use eduscol::EduscolAdapter;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A program entry as listed on a discipline page, before title filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEntry {
    /// Entry title (nested title element, else the link text).
    pub title: String,
    /// Absolute program page URL.
    pub url: String,
}

/// Markup-specific extraction for one source site.
pub trait SiteAdapter: Send + Sync {
    /// Locate the discipline navigation list on the site root.
    ///
    /// Fails with `StructureNotFound` when the list marker is absent.
    fn find_discipline_list(&self, doc: &Html, base: &Url) -> Result<Vec<Discipline>>;

    /// Locate the program entries of a discipline page.
    ///
    /// Fails with `StructureNotFound` when the program block is absent or empty.
    fn find_program_entries(&self, doc: &Html, base: &Url) -> Result<Vec<ProgramEntry>>;

    /// Collect the downloadable document links of a program page.
    ///
    /// A page without any recognised block yields an empty set.
    fn find_program_links(&self, doc: &Html, base: &Url) -> LinkSet;

    /// Human-readable adapter name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Markup helpers
// ---------------------------------------------------------------------------

/// Parse a selector literal. Callers only pass compile-time constants.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector {css:?}: {e:?}"))
}

/// Visible text of an element with whitespace runs collapsed to one space.
pub(crate) fn text_of(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element matching `css` whose visible text contains `needle`.
pub(crate) fn find_with_text<'a>(
    doc: &'a Html,
    css: &'static str,
    needle: &str,
) -> Option<ElementRef<'a>> {
    let sel = selector(css);
    doc.select(&sel).find(|el| text_of(el).contains(needle))
}

/// First following sibling `tag` element carrying every class in `classes`.
pub(crate) fn next_sibling_with_classes<'a>(
    el: &ElementRef<'a>,
    tag: &str,
    classes: &[&str],
) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| {
            sib.value().name() == tag
                && classes
                    .iter()
                    .all(|wanted| sib.value().classes().any(|c| c == *wanted))
        })
}

/// Resolve an `href` against `base` into an absolute URL string.
pub(crate) fn resolve_href(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}
