//! Rule-table taxonomy classifier.
//!
//! Folder names reliably identify primary and middle-school cycles; high
//! school files share one folder per subject and carry grade and track as
//! free text in the file name. Two ordered tables capture this:
//!
//! 1. [`LevelRule`]s match the folder name and fix the niveau and cycle.
//! 2. For levels whose placement comes from the file name, [`GradeRule`]s
//!    match keywords in the lower-cased file name and fix the classe, then
//!    a [`TrackPolicy`] picks the filiere.
//!
//! Both tables are first-match-wins. Keyword sets include the variants left
//! by filename sanitization, where every accented letter became `_`.

use std::sync::LazyLock;

use eduscol_shared::{Niveau, TaxonomyRecord};

/// Placeholder for a field with no meaningful value.
pub const UNKNOWN: &str = "unknown";
/// Placeholder for "every grade" / "every track".
pub const ALL: &str = "all";
/// Cycle value for lycee records.
pub const NOT_APPLICABLE: &str = "na";

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// Predicate over a folder name or a file name.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Matches every input.
    Always,
    /// Folder rules: exact name. Grade and track rules: lower-cased substring.
    AnyOf(&'static [&'static str]),
}

impl Matcher {
    fn matches_exact(&self, value: &str) -> bool {
        match self {
            Self::Always => true,
            Self::AnyOf(options) => options.iter().any(|o| *o == value),
        }
    }

    fn matches_within(&self, haystack: &str) -> bool {
        match self {
            Self::Always => true,
            Self::AnyOf(needles) => needles.iter().any(|n| haystack.contains(n)),
        }
    }
}

/// Where a record's cycle comes from.
#[derive(Debug, Clone, Copy)]
pub enum CycleSource {
    /// The folder name itself (`cycle1` … `cycle4`).
    Folder,
    Literal(&'static str),
}

/// How classe and filiere are filled in for a level.
#[derive(Debug, Clone, Copy)]
pub enum Placement {
    Fixed {
        classe: &'static str,
        filiere: &'static str,
    },
    /// Evaluate the grade table against the file name.
    FromFileName,
}

/// One row of the level table.
#[derive(Debug, Clone, Copy)]
pub struct LevelRule {
    pub name: &'static str,
    pub folder: Matcher,
    pub niveau: Niveau,
    pub cycle: CycleSource,
    pub placement: Placement,
}

/// One row of a track table.
#[derive(Debug, Clone, Copy)]
pub struct TrackRule {
    pub keywords: Matcher,
    pub filiere: &'static str,
}

/// How the filiere of a grade is chosen.
#[derive(Debug, Clone, Copy)]
pub enum TrackPolicy {
    Fixed(&'static str),
    /// First matching track rule, else `fallback`.
    FirstMatch {
        rules: &'static [TrackRule],
        fallback: &'static str,
    },
}

impl TrackPolicy {
    fn resolve(&self, file_name: &str) -> &'static str {
        match self {
            Self::Fixed(filiere) => *filiere,
            Self::FirstMatch { rules, fallback } => rules
                .iter()
                .find(|rule| rule.keywords.matches_within(file_name))
                .map(|rule| rule.filiere)
                .unwrap_or(*fallback),
        }
    }
}

/// One row of the grade table.
#[derive(Debug, Clone, Copy)]
pub struct GradeRule {
    pub name: &'static str,
    pub keywords: Matcher,
    pub classe: &'static str,
    pub track: TrackPolicy,
}

// ---------------------------------------------------------------------------
// Standard tables
// ---------------------------------------------------------------------------

/// Tracks shared by premiere and terminale, in priority order.
const GENERAL_TRACKS: &[TrackRule] = &[
    TrackRule {
        keywords: Matcher::AnyOf(&["technologique"]),
        filiere: "technologique",
    },
    TrackRule {
        keywords: Matcher::AnyOf(&["generale", "g_n_rale"]),
        filiere: "generale",
    },
    TrackRule {
        keywords: Matcher::AnyOf(&["professionnelle"]),
        filiere: "professionnel",
    },
];

const SECONDE_TRACKS: &[TrackRule] = &[TrackRule {
    keywords: Matcher::AnyOf(&["professionnelle"]),
    filiere: "professionnel",
}];

/// Level table, in priority order.
pub const LEVEL_RULES: &[LevelRule] = &[
    LevelRule {
        name: "primary-cycle",
        folder: Matcher::AnyOf(&["cycle1", "cycle2", "cycle3"]),
        niveau: Niveau::Primaire,
        cycle: CycleSource::Folder,
        placement: Placement::Fixed {
            classe: ALL,
            filiere: UNKNOWN,
        },
    },
    LevelRule {
        name: "middle-school-cycle",
        folder: Matcher::AnyOf(&["cycle4"]),
        niveau: Niveau::College,
        cycle: CycleSource::Folder,
        placement: Placement::Fixed {
            classe: "5-4-3",
            filiere: UNKNOWN,
        },
    },
    LevelRule {
        name: "high-school-subject",
        folder: Matcher::Always,
        niveau: Niveau::Lycee,
        cycle: CycleSource::Literal(NOT_APPLICABLE),
        placement: Placement::FromFileName,
    },
];

/// Grade table, in priority order.
pub const GRADE_RULES: &[GradeRule] = &[
    GradeRule {
        name: "seconde",
        keywords: Matcher::AnyOf(&["seconde"]),
        classe: "seconde",
        track: TrackPolicy::FirstMatch {
            rules: SECONDE_TRACKS,
            fallback: "general-techno",
        },
    },
    GradeRule {
        name: "premiere",
        keywords: Matcher::AnyOf(&["premiere", "premi_re"]),
        classe: "premiere",
        track: TrackPolicy::FirstMatch {
            rules: GENERAL_TRACKS,
            fallback: ALL,
        },
    },
    GradeRule {
        name: "terminale",
        keywords: Matcher::AnyOf(&["terminale"]),
        classe: "terminale",
        track: TrackPolicy::FirstMatch {
            rules: GENERAL_TRACKS,
            fallback: ALL,
        },
    },
    GradeRule {
        name: "cap",
        keywords: Matcher::AnyOf(&["cap"]),
        classe: "cap",
        track: TrackPolicy::Fixed("professionnel"),
    },
    GradeRule {
        name: "bac-pro",
        keywords: Matcher::AnyOf(&["baccalaur_at_professionnel"]),
        classe: "terminale",
        track: TrackPolicy::Fixed("professionnel"),
    },
    GradeRule {
        name: "any-grade",
        keywords: Matcher::Always,
        classe: ALL,
        track: TrackPolicy::Fixed(ALL),
    },
];

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Ordered level and grade tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    levels: Vec<LevelRule>,
    grades: Vec<GradeRule>,
}

static STANDARD: LazyLock<Classifier> = LazyLock::new(Classifier::standard);

impl Classifier {
    /// Build a classifier from explicit tables.
    pub fn new(levels: Vec<LevelRule>, grades: Vec<GradeRule>) -> Self {
        Self { levels, grades }
    }

    /// The standard eduscol tables.
    pub fn standard() -> Self {
        Self::new(LEVEL_RULES.to_vec(), GRADE_RULES.to_vec())
    }

    /// Insert a grade rule at `priority` (0 = evaluated first).
    ///
    /// Priorities past the end append the rule.
    pub fn insert_grade_rule(&mut self, priority: usize, rule: GradeRule) {
        let at = priority.min(self.grades.len());
        self.grades.insert(at, rule);
    }

    pub fn levels(&self) -> &[LevelRule] {
        &self.levels
    }

    pub fn grades(&self) -> &[GradeRule] {
        &self.grades
    }

    /// Classify a file from its folder name and file name.
    ///
    /// Total: every input produces a fully populated record.
    pub fn classify(&self, folder_name: &str, file_name: &str) -> TaxonomyRecord {
        let Some(level) = self.levels.iter().find(|r| r.folder.matches_exact(folder_name)) else {
            return unknown_record(folder_name);
        };

        let cycle = match level.cycle {
            CycleSource::Folder => folder_name.to_string(),
            CycleSource::Literal(value) => value.to_string(),
        };

        let (classe, filiere) = match level.placement {
            Placement::Fixed { classe, filiere } => (classe, filiere),
            Placement::FromFileName => self.grade_of(file_name),
        };

        TaxonomyRecord {
            niveau: level.niveau,
            cycle,
            classe: classe.to_string(),
            filiere: filiere.to_string(),
            matiere: folder_name.to_string(),
        }
    }

    fn grade_of(&self, file_name: &str) -> (&'static str, &'static str) {
        let lowered = file_name.to_lowercase();
        self.grades
            .iter()
            .find(|rule| rule.keywords.matches_within(&lowered))
            .map(|rule| (rule.classe, rule.track.resolve(&lowered)))
            .unwrap_or((ALL, ALL))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

/// Record for a folder no level rule accepts (only reachable with custom tables).
fn unknown_record(folder_name: &str) -> TaxonomyRecord {
    TaxonomyRecord {
        niveau: Niveau::Unknown,
        cycle: UNKNOWN.to_string(),
        classe: UNKNOWN.to_string(),
        filiere: UNKNOWN.to_string(),
        matiere: folder_name.to_string(),
    }
}

/// Classify with the standard tables.
pub fn classify(folder_name: &str, file_name: &str) -> TaxonomyRecord {
    STANDARD.classify(folder_name, file_name)
}
