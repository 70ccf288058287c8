// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Entity layout.
//!
//! Specify the layout of the records cmdbox persists: a __command__ is one
//! reusable shell snippet with its metadata, and a __space__ is a named
//! collection that owns an ordered sequence of commands. Both carry their
//! address twice: as a structured [`Selector`] for in-memory use, and as the
//! selector's canonical string in the `id` field for persistence.
//!
//! Only the `id` is serialized. The structured selector is re-derived from it
//! at load time, and the `id` itself is recomputed from the selector at
//! persistence time, so neither copy is ever trusted to be stale-free on its
//! own. File I/O is left to the caller to figure out.

use crate::selector::{Namespace, Selector};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reusable shell snippet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Command {
    /// Canonical string of [`Command::selector`]. Recomputed at persistence
    /// time, never trusted from memory.
    pub id: String,

    /// Structured address of this command. Derived from `id` at load time.
    #[serde(skip)]
    pub selector: Selector,

    /// Label the command is addressed by inside its space.
    pub label: String,

    /// Short description of what the snippet does.
    pub description: String,

    /// The snippet body itself.
    pub code: String,

    /// Optional reference link for the snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Lowercase tags, deduplicated, in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,

    /// When the command was created.
    pub created_at: DateTime<Utc>,

    /// When the command was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Command {
    /// Construct new command with fresh timestamps.
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            selector: Selector::default(),
            label: label.into(),
            description: description.into(),
            code: code.into(),
            url: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a tag.
    ///
    /// Tags are normalized to lowercase and deduplicated. Empty input and
    /// tags already present are ignored without touching the modification
    /// timestamp.
    pub fn tag_add(&mut self, tag: impl AsRef<str>) {
        let tag = tag.as_ref().to_lowercase();
        if tag.is_empty() || self.tags.contains(&tag) {
            return;
        }

        self.tags.push(tag);
        self.updated_at = Utc::now();
    }

    /// Remove a tag.
    ///
    /// Removing a tag that is not present is a no-op.
    pub fn tag_delete(&mut self, tag: impl AsRef<str>) {
        let tag = tag.as_ref();
        if let Some(position) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(position);
            self.updated_at = Utc::now();
        }
    }

    /// Whether the command carries the given tag.
    pub fn tagged(&self, tag: impl AsRef<str>) -> bool {
        self.tags.iter().any(|t| t == tag.as_ref())
    }

    /// Case-insensitive substring match over label, description, and code.
    pub fn matches(&self, criteria: impl AsRef<str>) -> bool {
        let criteria = criteria.as_ref().to_lowercase();
        self.label.to_lowercase().contains(&criteria)
            || self.description.to_lowercase().contains(&criteria)
            || self.code.to_lowercase().contains(&criteria)
    }
}

/// A named collection of commands.
///
/// A space owns its entries exclusively. Nothing else holds on to a command
/// longer than the space that contains it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Space {
    /// Canonical string of [`Space::selector`]. Recomputed at persistence
    /// time, never trusted from memory.
    pub id: String,

    /// Structured address of this space. Derived from `id` at load time.
    #[serde(skip)]
    pub selector: Selector,

    /// Label the space is addressed by.
    pub label: String,

    /// Short description of what the space collects.
    pub description: String,

    /// Commands owned by this space, in insertion order.
    #[serde(default)]
    pub entries: Vec<Command>,

    /// When the space was created.
    pub created_at: DateTime<Utc>,

    /// When the space was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Space {
    /// Construct new local space with fresh timestamps.
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        let label = label.into();
        let now = Utc::now();
        Self {
            id: String::new(),
            selector: Selector::space(Namespace::None, label.clone()),
            label,
            description: description.into(),
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a command by label.
    pub fn find_command(&self, label: impl AsRef<str>) -> Option<&Command> {
        self.entries.iter().find(|c| c.label == label.as_ref())
    }

    /// Find a command by label for mutation.
    pub fn find_command_mut(&mut self, label: impl AsRef<str>) -> Option<&mut Command> {
        self.entries.iter_mut().find(|c| c.label == label.as_ref())
    }

    /// Clone out every command with the given label.
    ///
    /// The result is a structural copy referencing none of the space's own
    /// storage, so callers may filter or reshape it freely without touching
    /// the entry sequence the space keeps persisting.
    pub fn commands_labelled(&self, label: impl AsRef<str>) -> Vec<Command> {
        self.entries
            .iter()
            .filter(|c| c.label == label.as_ref())
            .cloned()
            .collect()
    }

    /// Commands whose label, description, or code match the criteria.
    pub fn search(&self, criteria: impl AsRef<str>) -> Vec<&Command> {
        self.entries
            .iter()
            .filter(|c| c.matches(criteria.as_ref()))
            .collect()
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Rewrite every address in the space from its current label and
    /// namespace.
    ///
    /// The space's selector and `id` are recomputed from its label, and every
    /// contained command's selector and `id` are recomputed from the owning
    /// space. Addresses are always rewritten this way before leaving memory,
    /// never assumed to still agree.
    pub fn rebind_addresses(&mut self) {
        self.selector.space = self.label.clone();
        self.selector.item = None;
        self.id = self.selector.to_string();

        for command in &mut self.entries {
            command.selector = Selector::command(
                self.selector.namespace.clone(),
                self.label.clone(),
                command.label.clone(),
            );
            command.id = command.selector.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tag_add_normalizes_and_deduplicates() {
        let mut command = Command::new("deploy", "ship it", "./deploy.sh");

        command.tag_add("Ops");
        command.tag_add("ops");
        command.tag_add("");
        command.tag_add("release");

        assert_eq!(command.tags, vec!["ops".to_string(), "release".to_string()]);
        assert!(command.tagged("ops"));
        assert!(!command.tagged("Ops"));
    }

    #[test]
    fn tag_delete_absent_tag_is_noop() {
        let mut command = Command::new("deploy", "ship it", "./deploy.sh");
        command.tag_add("ops");
        let stamped = command.updated_at;

        command.tag_delete("release");
        assert_eq!(command.tags, vec!["ops".to_string()]);
        assert_eq!(command.updated_at, stamped);

        command.tag_delete("ops");
        assert!(command.tags.is_empty());
    }

    #[test]
    fn matches_is_case_insensitive_over_all_fields() {
        let mut command = Command::new("deploy", "Ship the Release", "./deploy.sh --prod");
        command.url = Some("https://example.com/runbook".into());

        assert!(command.matches("DEPLOY"));
        assert!(command.matches("release"));
        assert!(command.matches("--prod"));
        assert!(!command.matches("rollback"));
    }

    #[test]
    fn commands_labelled_filters_by_exact_label() {
        let mut space = Space::new("shell", "daily drivers");
        space.entries.push(Command::new("deploy", "", "./deploy.sh"));
        space.entries.push(Command::new("deploy-all", "", "./all.sh"));

        let matched = space.commands_labelled("deploy");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].label, "deploy");

        // The copy is structural. Reshaping it leaves the space intact.
        let mut matched = matched;
        matched.clear();
        assert_eq!(space.entries.len(), 2);
    }

    #[test]
    fn search_matches_any_field() {
        let mut space = Space::new("shell", "daily drivers");
        space.entries.push(Command::new("deploy", "ship it", "./deploy.sh"));
        space.entries.push(Command::new("ls-big", "find big files", "du -sh * | sort -h"));

        let hits = space.search("big");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "ls-big");
    }
}
