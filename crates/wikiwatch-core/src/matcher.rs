//! Entity matching: page title → canonical watch-list entry.

use std::collections::HashMap;

/// Return the first entry of `watchlist` equal to `title` ignoring case.
///
/// The returned string is the entry as written in the watch-list, not the
/// casing seen on the feed. Absent or empty titles never match.
pub fn match_entity<'w>(title: Option<&str>, watchlist: &'w [String]) -> Option<&'w str> {
    let title = title.filter(|t| !t.is_empty())?.to_lowercase();
    watchlist
        .iter()
        .find(|entry| entry.to_lowercase() == title)
        .map(String::as_str)
}

/// An ordered, immutable set of tracked page titles.
///
/// Lookups go through a lower-cased index, so resolving a title costs one
/// hash lookup regardless of the list length. When two entries differ only
/// by case the earlier one wins, same as [`match_entity`].
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

impl Watchlist {
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.to_lowercase()).or_insert(i);
        }
        Self { entries, index }
    }

    /// Canonical name for `title`, if tracked.
    pub fn resolve(&self, title: Option<&str>) -> Option<&str> {
        let title = title.filter(|t| !t.is_empty())?;
        self.index
            .get(&title.to_lowercase())
            .map(|&i| self.entries[i].as_str())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
