//! Core domain types for crawling and classifying curriculum documents.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Crawl-scoped values
// ---------------------------------------------------------------------------

/// One entry of the site's discipline navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    /// Link text, used as the download folder name after sanitization.
    pub name: String,
    /// Absolute URL of the discipline page.
    pub url: String,
}

/// A program entry found on a discipline page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCandidate {
    /// Full entry title, e.g. `Programmes et ressources en histoire - cycles 2 et 3`.
    pub title: String,
    /// Absolute URL of the program page.
    pub url: String,
    /// Owning discipline.
    pub discipline: Discipline,
}

/// A downloadable document referenced by a program page.
///
/// Equality and hashing cover the full `(url, label)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLink {
    /// Absolute document URL.
    pub url: String,
    /// Visible link text.
    pub label: String,
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Top-level schooling stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Niveau {
    Primaire,
    College,
    Lycee,
    Unknown,
}

impl Niveau {
    /// Directory name used in the organized tree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primaire => "primaire",
            Self::College => "college",
            Self::Lycee => "lycee",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Niveau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of one file in the curriculum taxonomy.
///
/// Every field is always populated; unknown parts carry the literals
/// `"unknown"`, `"all"` or `"na"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub niveau: Niveau,
    pub cycle: String,
    pub classe: String,
    pub filiere: String,
    pub matiere: String,
}
