//! Taxonomy classification and the structured output tree.
//!
//! - [`classifier`]: maps a (folder, file) pair to a [`TaxonomyRecord`]
//! - [`organizer`]: copies extracted text files into the niveau/classe tree
//!
//! [`TaxonomyRecord`]: eduscol_shared::TaxonomyRecord

pub mod classifier;
pub mod organizer;

pub use classifier::{
    ALL, CycleSource, Classifier, GradeRule, LevelRule, Matcher, NOT_APPLICABLE, Placement,
    GRADE_RULES, LEVEL_RULES, TrackPolicy, TrackRule, UNKNOWN, classify,
};
pub use organizer::{OrganizeReport, OrganizedFile, Organizer};
