// SPDX-License-Identifier: MPL-2.0

//! Ordered tag list and tag filters
//!
//! The list always starts with the two sentinel tags, `all` and `untagged`.
//! They cannot be added, deleted or moved; user tags follow in the order
//! the user chose.

use super::entry::JournalEntry;
use crate::constants::{SENTINEL_TAGS, TAG_ALL, TAG_UNTAGGED};
use crate::errors::TagError;
use tracing::debug;

/// Ordered, duplicate-free tag list headed by the sentinels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    names: Vec<String>,
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TagSet {
    /// Tag list holding only the sentinels
    pub fn new() -> Self {
        Self {
            names: SENTINEL_TAGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Rebuild a tag list from stored names
    ///
    /// Sentinels are put back in front, blanks and duplicates are dropped and
    /// the remaining order is kept.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            // Invalid stored names are skipped, not fatal
            let _ = set.add(name.as_ref());
        }
        set
    }

    pub fn is_sentinel(name: &str) -> bool {
        SENTINEL_TAGS.contains(&name)
    }

    /// Every name, sentinels first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// User-defined tags in display order
    pub fn user_tags(&self) -> &[String] {
        &self.names[SENTINEL_TAGS.len()..]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Append a user tag
    ///
    /// Returns `Ok(false)` if the tag already exists.
    pub fn add(&mut self, name: &str) -> Result<bool, TagError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::Empty);
        }
        if Self::is_sentinel(name) {
            return Err(TagError::Reserved(name.to_string()));
        }
        if self.contains(name) {
            return Ok(false);
        }

        self.names.push(name.to_string());
        debug!(tag = name, "Tag added");
        Ok(true)
    }

    /// Remove a user tag
    ///
    /// Sentinels and unknown names are left alone and return `false`.
    pub fn delete(&mut self, name: &str) -> bool {
        if Self::is_sentinel(name) {
            return false;
        }
        let before = self.names.len();
        self.names.retain(|n| n != name);
        let removed = self.names.len() != before;
        if removed {
            debug!(tag = name, "Tag deleted");
        }
        removed
    }

    /// Move a user tag from one position to another
    ///
    /// Positions index [`Self::user_tags`]; the sentinels never move.
    pub fn move_tag(&mut self, from: usize, to: usize) -> Result<(), TagError> {
        let count = self.user_tags().len();
        if count == 0 {
            return Err(TagError::OutOfRange { index: from, max: 0 });
        }
        for index in [from, to] {
            if index >= count {
                return Err(TagError::OutOfRange {
                    index,
                    max: count - 1,
                });
            }
        }

        let offset = SENTINEL_TAGS.len();
        let tag = self.names.remove(offset + from);
        self.names.insert(offset + to, tag);
        Ok(())
    }

    /// Position of a user tag within [`Self::user_tags`]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.user_tags().iter().position(|n| n == name)
    }
}

/// Which entries a listing shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Untagged,
    Tag(String),
}

impl TagFilter {
    /// Filter for a tag name, honoring the sentinels
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            TAG_ALL => TagFilter::All,
            TAG_UNTAGGED => TagFilter::Untagged,
            tag => TagFilter::Tag(tag.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TagFilter::All => TAG_ALL,
            TagFilter::Untagged => TAG_UNTAGGED,
            TagFilter::Tag(tag) => tag,
        }
    }

    /// Whether an entry passes the filter under the current tag list
    pub fn matches(&self, entry: &JournalEntry, tags: &TagSet) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Untagged => entry.effective_tag(tags).is_none(),
            TagFilter::Tag(tag) => entry.effective_tag(tags) == Some(tag.as_str()),
        }
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::NewEntry;

    fn travel_food_work() -> TagSet {
        TagSet::from_names(["travel", "food", "work"])
    }

    #[test]
    fn new_set_holds_only_sentinels() {
        let tags = TagSet::new();
        assert_eq!(tags.names(), &["all", "untagged"]);
        assert!(tags.user_tags().is_empty());
    }

    #[test]
    fn add_trims_and_rejects_reserved_names() {
        let mut tags = TagSet::new();
        assert_eq!(tags.add("  travel "), Ok(true));
        assert_eq!(tags.add("travel"), Ok(false));
        assert_eq!(tags.add("   "), Err(TagError::Empty));
        assert_eq!(tags.add("all"), Err(TagError::Reserved("all".into())));
        assert_eq!(
            tags.add("untagged"),
            Err(TagError::Reserved("untagged".into()))
        );
        assert_eq!(tags.names(), &["all", "untagged", "travel"]);
    }

    #[test]
    fn sentinels_cannot_be_deleted() {
        let mut tags = travel_food_work();
        assert!(!tags.delete("all"));
        assert!(!tags.delete("untagged"));
        assert!(!tags.delete("missing"));
        assert!(tags.delete("food"));
        assert_eq!(tags.names(), &["all", "untagged", "travel", "work"]);
    }

    #[test]
    fn move_reorders_user_tags_only() {
        let mut tags = travel_food_work();
        tags.move_tag(2, 0).unwrap();
        assert_eq!(tags.names(), &["all", "untagged", "work", "travel", "food"]);

        tags.move_tag(0, 2).unwrap();
        assert_eq!(tags.names(), &["all", "untagged", "travel", "food", "work"]);

        assert_eq!(
            tags.move_tag(0, 3),
            Err(TagError::OutOfRange { index: 3, max: 2 })
        );
    }

    #[test]
    fn from_names_restores_sentinels_and_drops_duplicates() {
        let tags = TagSet::from_names(["food", "all", "food", "", "untagged", "travel"]);
        assert_eq!(tags.names(), &["all", "untagged", "food", "travel"]);
    }

    #[test]
    fn filters_follow_effective_tag() {
        let tags = travel_food_work();
        let food = NewEntry::new().tag("food").into_entry();
        let bare = NewEntry::new().into_entry();
        let orphan = NewEntry::new().tag("gone").into_entry();

        assert!(TagFilter::All.matches(&orphan, &tags));
        assert!(TagFilter::from_name("untagged").matches(&bare, &tags));
        assert!(TagFilter::Untagged.matches(&orphan, &tags));
        assert!(!TagFilter::Untagged.matches(&food, &tags));
        assert!(TagFilter::from_name("food").matches(&food, &tags));
        assert!(!TagFilter::Tag("gone".into()).matches(&orphan, &tags));
    }
}
