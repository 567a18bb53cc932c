//! Curriculum portal crawler, extraction adapter, and downloader.
//!
//! This crate provides:
//! - [`adapters`]: markup-specific extraction behind the [`SiteAdapter`] trait
//! - [`policy`]: the ordered program title rules
//! - [`LinkSet`]: order-preserving deduplication of document links
//! - [`Downloader`]: timeout-bound document downloads
//! - [`engine`]: the sequential [`Harvester`] and its [`HarvestReport`]

pub mod adapters;
pub mod download;
pub mod engine;
pub mod links;
pub mod policy;

use scraper::Html;
use url::Url;

pub use adapters::{EduscolAdapter, ProgramEntry, SiteAdapter};
pub use download::{Downloader, filename_from_url};
pub use engine::{HarvestReport, Harvester};
pub use links::LinkSet;
pub use policy::{RuleAction, TitleDecision, TitleMatcher, TitlePolicy, TitleRule};

/// Extract the document links of a program page with the eduscol adapter.
pub fn extract_links(program_page_html: &str, base_url: &Url) -> LinkSet {
    let doc = Html::parse_document(program_page_html);
    EduscolAdapter.find_program_links(&doc, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://eduscol.education.fr/1723/programmes-et-ressources-en-mathematiques")
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Discipline list
    // -----------------------------------------------------------------------

    #[test]
    fn discipline_list_in_document_order() {
        let html = r#"<html><body>
            <ul class="main-menu__third-level__list lvl-2">
                <li><a href="/2207/arts-plastiques">  Arts
                    plastiques </a></li>
                <li><a href="https://eduscol.education.fr/2230/francais">Français</a></li>
                <li>Intertitre</li>
                <li><a href="/2207/arts-plastiques">Arts plastiques</a></li>
            </ul>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let disciplines = EduscolAdapter.find_discipline_list(&doc, &base()).unwrap();

        let names: Vec<&str> = disciplines.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Arts plastiques", "Français", "Arts plastiques"]);
        assert_eq!(disciplines[0].url, "https://eduscol.education.fr/2207/arts-plastiques");
    }

    #[test]
    fn missing_discipline_list_is_structural_error() {
        let doc = Html::parse_document("<ul class=\"main-menu\"><li><a href=\"/x\">X</a></li></ul>");
        let err = EduscolAdapter.find_discipline_list(&doc, &base()).unwrap_err();
        assert!(err.is_structural());
    }

    // -----------------------------------------------------------------------
    // Program entries
    // -----------------------------------------------------------------------

    #[test]
    fn program_entries_prefer_nested_title() {
        let html = r#"<html><body>
            <h2 class="block-title">Programmes et ressources</h2>
            <p>Introduction</p>
            <div class="block-content three-items-per-line">
                <div class="item-block block-folder-item">
                    <a href="/1723/maths"><span class="block-title">Maths - cycles 2 et 3</span><span>Voir</span></a>
                </div>
                <div class="item-block block-folder-item">
                    <a href="/1724/maths-c4">Maths - cycle 4</a>
                </div>
                <div class="item-block block-folder-item"><span>pas de lien</span></div>
            </div>
        </body></html>"#;
        let doc = Html::parse_document(html);
        let entries = EduscolAdapter.find_program_entries(&doc, &base()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Maths - cycles 2 et 3");
        assert_eq!(entries[0].url, "https://eduscol.education.fr/1723/maths");
        assert_eq!(entries[1].title, "Maths - cycle 4");
    }

    #[test]
    fn program_block_without_heading_is_structural_error() {
        let html = r#"<div class="block-content three-items-per-line">
            <div class="item-block block-folder-item"><a href="/a">A - cycles 2</a></div>
        </div>"#;
        let doc = Html::parse_document(html);
        let err = EduscolAdapter.find_program_entries(&doc, &base()).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn program_heading_without_items_is_structural_error() {
        let html = r#"<h2 class="block-title">Programmes et ressources</h2>
            <div class="block-content three-items-per-line"></div>"#;
        let doc = Html::parse_document(html);
        assert!(EduscolAdapter.find_program_entries(&doc, &base()).is_err());
    }

    // -----------------------------------------------------------------------
    // Document links
    // -----------------------------------------------------------------------

    const BOTH_PATTERNS: &str = r#"<html><body>
        <h2>Le programme</h2>
        <div class="rich-text ckeditor-text clearfix">
            <a href="/document/1/download">Programme du cycle 2</a>
            <a href="/document/2/download?attachment">Annexe</a>
            <a href="/document/3">Fiche sans téléchargement</a>
        </div>
        <div>
            <span class="block-title">Télécharger les programmes</span>
            <div class="ckeditor-text block-description">
                <a href="/document/1/download">Programme du cycle 2</a>
                <a href="/document/1/download">Programme cycle 2 (version longue)</a>
                <a href="https://cache.eduscol.education.fr/document/9/download">Repères</a>
            </div>
        </div>
    </body></html>"#;

    #[test]
    fn both_patterns_are_merged_and_deduplicated() {
        let links = extract_links(BOTH_PATTERNS, &base());

        let pairs: Vec<(&str, &str)> = links
            .iter()
            .map(|l| (l.url.as_str(), l.label.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("https://eduscol.education.fr/document/1/download", "Programme du cycle 2"),
                ("https://eduscol.education.fr/document/2/download?attachment", "Annexe"),
                (
                    "https://eduscol.education.fr/document/1/download",
                    "Programme cycle 2 (version longue)"
                ),
                ("https://cache.eduscol.education.fr/document/9/download", "Repères"),
            ]
        );
    }

    #[test]
    fn pattern_b_alone_is_enough() {
        let html = r#"<div>
            <span class="block-title">Télécharger les programmes</span>
            <div class="ckeditor-text block-description">
                <a href="/document/5/download">Programme</a>
            </div>
        </div>"#;
        let links = extract_links(html, &base());
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn page_without_blocks_yields_empty_set() {
        let html = r#"<html><body>
            <h2>Ressources</h2>
            <div class="rich-text ckeditor-text clearfix">
                <a href="/document/1/download">Orphelin</a>
            </div>
        </body></html>"#;
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn heading_without_matching_sibling_yields_empty_set() {
        let html = r#"<h2>Le programme</h2>
            <div class="other"><a href="/document/1/download">X</a></div>"#;
        assert!(extract_links(html, &base()).is_empty());
    }

    #[test]
    fn adapter_name() {
        assert_eq!(EduscolAdapter.name(), "eduscol");
    }
}
