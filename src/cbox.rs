// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command box aggregate.
//!
//! The __command box__ is the in-memory root that owns every local space, and
//! transitively every command. All mutation of local data flows through it,
//! so the two uniqueness rules of the data model are checked in exactly one
//! place:
//!
//! - no two spaces share one `(namespace, label)` pair, and
//! - no two commands inside one space share a label.
//!
//! The command box lives for a single invocation. A caller loads it from the
//! repository, acts on it, and saves it back, instead of sharing one mutable
//! instance across the whole process.
//!
//! Nothing here touches the file system directly. Loading and saving go
//! through [`Repository`], and deletions of on-disk files stay the explicit
//! responsibility of the call site driving the operation.

use crate::{
    model::{Command, Space},
    repository::{Repository, StorageError},
    selector::{Namespace, Selector},
};

use tracing::{debug, instrument, warn};

/// In-memory aggregate of all local spaces.
#[derive(Debug, Default)]
pub struct CommandBox {
    spaces: Vec<Space>,
}

impl CommandBox {
    /// Load every space the repository knows about.
    ///
    /// Duplicate addresses inside the store can only come from files copied
    /// around by hand. The first file scanned wins and the rest are skipped
    /// with a warning, so a damaged store still loads.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::Storage`] if the repository fails to load.
    #[instrument(skip(repository), level = "debug")]
    pub fn load(repository: &Repository) -> Result<Self> {
        let mut cbox = Self::default();
        for space in repository.load_all()? {
            if let Err(err) = cbox.add_space(space) {
                warn!("skipping space from store: {err}");
            }
        }

        debug!("loaded {} spaces", cbox.spaces.len());

        Ok(cbox)
    }

    /// Every space in the box.
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Every space in the box, for mutation during save.
    pub(crate) fn spaces_mut(&mut self) -> &mut [Space] {
        &mut self.spaces
    }

    /// Find the space addressed by the selector.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::SpaceNotFound`] if no space matches the
    ///   selector's namespace and space label.
    pub fn find_space(&self, selector: &Selector) -> Result<&Space> {
        self.spaces
            .iter()
            .find(|space| space.selector.namespace == selector.namespace && space.label == selector.space)
            .ok_or_else(|| CboxError::SpaceNotFound {
                selector: selector.space_level(),
            })
    }

    /// Find the space addressed by the selector, for mutation.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::SpaceNotFound`] if no space matches.
    pub fn find_space_mut(&mut self, selector: &Selector) -> Result<&mut Space> {
        self.spaces
            .iter_mut()
            .find(|space| space.selector.namespace == selector.namespace && space.label == selector.space)
            .ok_or_else(|| CboxError::SpaceNotFound {
                selector: selector.space_level(),
            })
    }

    /// Register a new space.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::DuplicateSpace`] if a space with the same
    ///   namespace and label already exists. The box is left unchanged.
    pub fn add_space(&mut self, space: Space) -> Result<()> {
        if self.holds(&space.selector.namespace, &space.label) {
            return Err(CboxError::DuplicateSpace {
                label: space.label,
            });
        }

        self.spaces.push(space);

        Ok(())
    }

    /// Register a space arriving from a clone.
    ///
    /// Same duplicate semantics as [`CommandBox::add_space`].
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::DuplicateSpace`] if the address is taken.
    pub fn create_space(&mut self, space: Space) -> Result<()> {
        self.add_space(space)
    }

    /// Apply a new label and description to the space at the previous
    /// address.
    ///
    /// The caller stays responsible for completing the on-disk rename through
    /// the repository when the label changed.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::DuplicateSpace`] if the new label collides with
    ///   another space under the same namespace. The space's own previous
    ///   identity is ignored by the check.
    /// - Return [`CboxError::SpaceNotFound`] if the previous address matches
    ///   nothing.
    pub fn edit_space(
        &mut self,
        previous: &Selector,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<&mut Space> {
        let label = label.into();
        if label != previous.space && self.holds(&previous.namespace, &label) {
            return Err(CboxError::DuplicateSpace { label });
        }

        let space = self.find_space_mut(previous)?;
        space.label = label.clone();
        space.selector.space = label;
        space.description = description.into();
        space.touch();

        Ok(space)
    }

    /// Remove the space addressed by the selector.
    ///
    /// Identity is captured by value before anything moves, because removing
    /// an element relocates the rest of the sequence. The removed space is
    /// handed back so the call site can drive the matching file deletion.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::SpaceNotFound`] if no space matches.
    pub fn delete_space(&mut self, selector: &Selector) -> Result<Space> {
        let identity = selector.space_level();
        let position = self
            .spaces
            .iter()
            .position(|space| {
                space.selector.namespace == identity.namespace && space.label == identity.space
            })
            .ok_or(CboxError::SpaceNotFound { selector: identity })?;

        Ok(self.spaces.remove(position))
    }

    /// Add a command to the space addressed by the selector.
    ///
    /// The command's own address is rewritten from the owning space before
    /// insertion.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::SpaceNotFound`] if no space matches.
    /// - Return [`CboxError::DuplicateCommand`] if the space already holds a
    ///   command with that label. The space is left unchanged.
    pub fn add_command(&mut self, selector: &Selector, mut command: Command) -> Result<()> {
        let space = self.find_space_mut(selector)?;
        if space.find_command(&command.label).is_some() {
            return Err(CboxError::DuplicateCommand {
                label: command.label,
                space: space.label.clone(),
            });
        }

        command.selector = Selector::command(
            space.selector.namespace.clone(),
            space.label.clone(),
            command.label.clone(),
        );
        command.id = command.selector.to_string();
        space.entries.push(command);
        space.touch();

        Ok(())
    }

    /// Apply new content to the command at the previous address.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::SpaceNotFound`] or [`CboxError::CommandNotFound`]
    ///   if the previous address matches nothing.
    /// - Return [`CboxError::DuplicateCommand`] if renaming the command would
    ///   collide with another label in the space.
    pub fn edit_command(
        &mut self,
        previous: &Selector,
        label: impl Into<String>,
        description: impl Into<String>,
        code: impl Into<String>,
        url: Option<String>,
    ) -> Result<&mut Command> {
        let label = label.into();
        let item = previous.item.clone().ok_or_else(|| CboxError::CommandNotFound {
            selector: previous.clone(),
        })?;

        let space = self.find_space_mut(previous)?;
        if label != item && space.find_command(&label).is_some() {
            return Err(CboxError::DuplicateCommand {
                label,
                space: space.label.clone(),
            });
        }

        let command = space
            .find_command_mut(&item)
            .ok_or_else(|| CboxError::CommandNotFound {
                selector: previous.clone(),
            })?;
        command.label = label;
        command.description = description.into();
        command.code = code.into();
        command.url = url;
        command.updated_at = chrono::Utc::now();

        Ok(command)
    }

    /// Remove the command addressed by the selector.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::SpaceNotFound`] or [`CboxError::CommandNotFound`]
    ///   if the address matches nothing.
    pub fn delete_command(&mut self, selector: &Selector) -> Result<Command> {
        let item = selector.item.clone().ok_or_else(|| CboxError::CommandNotFound {
            selector: selector.clone(),
        })?;

        let space = self.find_space_mut(selector)?;
        let position = space
            .entries
            .iter()
            .position(|command| command.label == item)
            .ok_or_else(|| CboxError::CommandNotFound {
                selector: selector.clone(),
            })?;

        let removed = space.entries.remove(position);
        space.touch();

        Ok(removed)
    }

    /// Commands across every space matching the criteria.
    pub fn search(&self, criteria: impl AsRef<str>) -> Vec<&Command> {
        self.spaces
            .iter()
            .flat_map(|space| space.search(criteria.as_ref()))
            .collect()
    }

    /// Sorted unique tags across every command in the box.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .spaces
            .iter()
            .flat_map(|space| space.entries.iter())
            .flat_map(|command| command.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    /// Persist every space through the repository.
    ///
    /// Not transactional across spaces. A failure partway through leaves
    /// earlier spaces durably written and later ones not, and surfaces the
    /// failing space instead of retrying.
    ///
    /// # Errors
    ///
    /// - Return [`CboxError::Storage`] with the first persistence failure.
    #[instrument(skip(self, repository), level = "debug")]
    pub fn save(&mut self, repository: &Repository) -> Result<()> {
        for space in self.spaces_mut() {
            repository.persist(space)?;
        }

        Ok(())
    }

    fn holds(&self, namespace: &Namespace, label: &str) -> bool {
        self.spaces
            .iter()
            .any(|space| &space.selector.namespace == namespace && space.label == label)
    }
}

/// Command box error types.
#[derive(Debug, thiserror::Error)]
pub enum CboxError {
    /// No space matches the requested selector.
    #[error("space '{selector}' not found in your cmdbox")]
    SpaceNotFound { selector: Selector },

    /// No command matches the requested selector.
    #[error("command '{selector}' not found in your cmdbox")]
    CommandNotFound { selector: Selector },

    /// A space with the same namespace and label already exists.
    #[error("space '{label}' already found in your cmdbox")]
    DuplicateSpace { label: String },

    /// A command with the same label already exists in the space.
    #[error("command '{label}' already exists in space '{space}'")]
    DuplicateCommand { label: String, space: String },

    /// Persistence failed underneath the aggregate.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Friendly result alias :3
pub type Result<T, E = CboxError> = std::result::Result<T, E>;
