//! Program title policy.
//!
//! Discipline pages list the same curriculum several times: once on an
//! aggregate multi-cycle page and once per cycle. Only aggregate pages are
//! crawled. The policy is an ordered table of explicit title rules; a title
//! that no rule recognises is reported as ambiguous instead of silently
//! dropped.

use regex::Regex;

/// Separator every well-formed program title contains.
const TITLE_SEPARATOR: &str = " - ";

/// What a rule does with a matching title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Include,
    Exclude,
}

/// How a rule recognises a title (applied to the lower-cased, trimmed title).
#[derive(Debug, Clone)]
pub enum TitleMatcher {
    Prefix(&'static str),
    Pattern(Regex),
}

impl TitleMatcher {
    fn matches(&self, title: &str) -> bool {
        match self {
            Self::Prefix(prefix) => title.starts_with(prefix),
            Self::Pattern(re) => re.is_match(title),
        }
    }
}

/// One row of the policy table.
#[derive(Debug, Clone)]
pub struct TitleRule {
    pub name: &'static str,
    pub matcher: TitleMatcher,
    pub action: RuleAction,
}

/// Outcome of evaluating a program title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleDecision {
    /// Aggregate program page: crawl it.
    Include { rule: &'static str },
    /// Cycle-specific duplicate view: skip it.
    Exclude { rule: &'static str },
    /// Well-formed title that no rule recognises; needs manual review.
    Ambiguous,
    /// Title lacks the `" - "` separator.
    Malformed,
}

impl TitleDecision {
    pub fn is_included(&self) -> bool {
        matches!(self, Self::Include { .. })
    }
}

/// Ordered, first-match-wins table of title rules.
#[derive(Debug, Clone)]
pub struct TitlePolicy {
    rules: Vec<TitleRule>,
}

impl TitlePolicy {
    /// Build a policy from an explicit rule list.
    pub fn new(rules: Vec<TitleRule>) -> Self {
        Self { rules }
    }

    /// The rules used for eduscol discipline pages.
    pub fn standard() -> Self {
        Self::new(vec![
            TitleRule {
                name: "resources-prefix",
                matcher: TitleMatcher::Prefix("programmes et ressources"),
                action: RuleAction::Include,
            },
            TitleRule {
                name: "multi-cycle",
                matcher: TitleMatcher::Pattern(static_regex(r"-\s*cycles\s+")),
                action: RuleAction::Include,
            },
            TitleRule {
                name: "single-cycle",
                matcher: TitleMatcher::Pattern(static_regex(r"-\s*cycle\s+\d+$")),
                action: RuleAction::Exclude,
            },
        ])
    }

    pub fn rules(&self) -> &[TitleRule] {
        &self.rules
    }

    /// Evaluate a program title against the table.
    pub fn decide(&self, title: &str) -> TitleDecision {
        if !title.contains(TITLE_SEPARATOR) {
            return TitleDecision::Malformed;
        }

        let normalized = title.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&normalized))
            .map(|rule| match rule.action {
                RuleAction::Include => TitleDecision::Include { rule: rule.name },
                RuleAction::Exclude => TitleDecision::Exclude { rule: rule.name },
            })
            .unwrap_or(TitleDecision::Ambiguous)
    }
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Compile a pattern literal. Callers only pass compile-time constants.
fn static_regex(pattern: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static pattern {pattern:?}: {e}"))
}
