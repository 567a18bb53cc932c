//! Adapter for the eduscol curriculum portal.

use eduscol_shared::{Discipline, DocumentLink, EduscolError, Result};
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::{
    ProgramEntry, SiteAdapter, find_with_text, next_sibling_with_classes, resolve_href, selector,
    text_of,
};
use crate::links::LinkSet;

/// Navigation list holding one entry per discipline.
const DISCIPLINE_LIST: &str = "ul.main-menu__third-level__list.lvl-2";

/// Heading of the program block on a discipline page.
const PROGRAM_HEADING_TEXT: &str = "Programmes et ressources";

/// Heading introducing the document block of pattern A.
const PROGRAMME_HEADING_TEXT: &str = "Le programme";

/// Block title introducing the document block of pattern B.
const DOWNLOAD_BLOCK_TEXT: &str = "Télécharger les programmes";

/// Extracts disciplines, program entries and document links from eduscol pages.
pub struct EduscolAdapter;

impl SiteAdapter for EduscolAdapter {
    fn find_discipline_list(&self, doc: &Html, base: &Url) -> Result<Vec<Discipline>> {
        let list_sel = selector(DISCIPLINE_LIST);
        let list = doc
            .select(&list_sel)
            .next()
            .ok_or_else(|| EduscolError::structure(DISCIPLINE_LIST))?;

        let item_sel = selector("li");
        let link_sel = selector("a[href]");
        let mut disciplines = Vec::new();

        for item in list.select(&item_sel) {
            let Some(link) = item.select(&link_sel).next() else {
                continue;
            };
            let Some(url) = link.value().attr("href").and_then(|h| resolve_href(base, h)) else {
                debug!(href = ?link.value().attr("href"), "unresolvable discipline link");
                continue;
            };
            disciplines.push(Discipline {
                name: text_of(&link),
                url,
            });
        }

        Ok(disciplines)
    }

    fn find_program_entries(&self, doc: &Html, base: &Url) -> Result<Vec<ProgramEntry>> {
        let heading = find_with_text(doc, "h2.block-title", PROGRAM_HEADING_TEXT)
            .ok_or_else(|| EduscolError::structure(format!("h2 '{PROGRAM_HEADING_TEXT}'")))?;

        let block = next_sibling_with_classes(
            &heading,
            "div",
            &["block-content", "three-items-per-line"],
        )
        .ok_or_else(|| EduscolError::structure("div.block-content.three-items-per-line"))?;

        let item_sel = selector("div.item-block.block-folder-item");
        let link_sel = selector("a[href]");
        let title_sel = selector("span.block-title");

        let items: Vec<ElementRef<'_>> = block.select(&item_sel).collect();
        if items.is_empty() {
            return Err(EduscolError::structure("div.item-block.block-folder-item"));
        }

        let mut entries = Vec::new();
        for item in items {
            let Some(link) = item.select(&link_sel).next() else {
                continue;
            };
            let title = link
                .select(&title_sel)
                .next()
                .map(|span| text_of(&span))
                .unwrap_or_else(|| text_of(&link));
            let Some(url) = link.value().attr("href").and_then(|h| resolve_href(base, h)) else {
                continue;
            };
            entries.push(ProgramEntry { title, url });
        }

        Ok(entries)
    }

    fn find_program_links(&self, doc: &Html, base: &Url) -> LinkSet {
        let mut links = LinkSet::new();

        // Pattern A: "Le programme" heading followed by a rich-text block.
        if let Some(block) = find_with_text(doc, "h2", PROGRAMME_HEADING_TEXT).and_then(|h| {
            next_sibling_with_classes(&h, "div", &["rich-text", "ckeditor-text", "clearfix"])
        }) {
            collect_document_links(&block, base, &mut links);
        }

        // Pattern B: "Télécharger les programmes" block title followed by a description.
        if let Some(block) = find_with_text(doc, "span.block-title", DOWNLOAD_BLOCK_TEXT)
            .and_then(|s| {
                next_sibling_with_classes(&s, "div", &["ckeditor-text", "block-description"])
            })
        {
            collect_document_links(&block, base, &mut links);
        }

        links
    }

    fn name(&self) -> &str {
        "eduscol"
    }
}

/// Whether an href points at a downloadable document.
fn is_document_href(href: &str) -> bool {
    href.contains("/document/") && href.contains("/download")
}

/// Add every document link under `block` to `links`.
fn collect_document_links(block: &ElementRef<'_>, base: &Url, links: &mut LinkSet) {
    let link_sel = selector("a[href]");
    for a in block.select(&link_sel) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if !is_document_href(href) {
            continue;
        }
        if let Some(url) = resolve_href(base, href) {
            links.insert(DocumentLink {
                url,
                label: text_of(&a),
            });
        }
    }
}
