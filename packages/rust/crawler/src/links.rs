//! Order-preserving, deduplicated set of document links.

use std::collections::HashSet;

use eduscol_shared::DocumentLink;

/// Document links keyed by the full `(url, label)` pair, in first-seen order.
///
/// Iteration order is the extraction order, so two runs over the same page
/// produce the same download sequence.
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    seen: HashSet<DocumentLink>,
    links: Vec<DocumentLink>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link. Returns `false` if the same `(url, label)` pair was already present.
    pub fn insert(&mut self, link: DocumentLink) -> bool {
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.links.push(link);
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentLink> {
        self.links.iter()
    }
}

impl Extend<DocumentLink> for LinkSet {
    fn extend<I: IntoIterator<Item = DocumentLink>>(&mut self, iter: I) {
        for link in iter {
            self.insert(link);
        }
    }
}

impl FromIterator<DocumentLink> for LinkSet {
    fn from_iter<I: IntoIterator<Item = DocumentLink>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for LinkSet {
    type Item = DocumentLink;
    type IntoIter = std::vec::IntoIter<DocumentLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a DocumentLink;
    type IntoIter = std::slice::Iter<'a, DocumentLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
