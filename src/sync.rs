// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Local and remote reconciliation.
//!
//! The synchronization engine reconciles the local command box with the
//! remote snippet service. Five flows exist:
//!
//! - __publish__ pushes a local space to the remote service under a user or
//!   organization namespace, adopting that namespace locally.
//! - __unpublish__ removes a space from the remote service without touching
//!   local data.
//! - __clone__ creates a local space from a published one, re-prompting for a
//!   fresh label as long as the address is already taken locally.
//! - __pull__ refreshes a local space's content from its published
//!   counterpart, deliberately keeping the local label so a local rename
//!   never desyncs the address used to reach the remote.
//! - __copy__ brings individual published commands into an existing local
//!   space, skipping duplicates without aborting the batch.
//!
//! # Publishing Changes the Local Address
//!
//! A space published for the first time has no namespace yet, so publishing
//! assigns one: the logged-in user's by default, or an organization when
//! asked for. Changing the namespace changes the space's address, and with
//! it the name of its file in the store. The engine completes that rename
//! the safe way around: the space is written under its new address first,
//! and only then is the file under the old address removed.
//!
//! # Partial Publish Never Touches the Box
//!
//! Publishing a single command sends a payload whose entry sequence was
//! filtered down on a structural copy of the space. The command box's own
//! space is never aliased by the payload, so a partial publish can never
//! truncate the locally persisted entry list.

pub mod remote;

use crate::{
    cbox::{CboxError, CommandBox},
    console::Interact,
    model::{Command, Space},
    repository::{Repository, StorageError},
    selector::{Namespace, ParseError, Selector},
    sync::remote::{Remote, RemoteError},
};

use tracing::{info, instrument, warn};

/// Who the engine acts for.
///
/// Login and token handling happen elsewhere. The engine only needs to know
/// which user namespace unpublished spaces default to.
#[derive(Clone, Debug, Default)]
pub struct Session {
    /// Name of the logged-in user, when there is one.
    pub login: Option<String>,
}

/// How an interactive flow ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The flow ran through.
    Completed,

    /// The user declined or aborted, and nothing was changed.
    Cancelled,
}

/// Summary of one batch command copy.
#[derive(Debug, PartialEq, Eq)]
pub struct CopyReport {
    /// How the flow ended.
    pub outcome: Outcome,

    /// Labels of the commands stored into the local space.
    pub copied: Vec<String>,

    /// Labels of the commands skipped over as duplicates.
    pub skipped: Vec<String>,
}

impl CopyReport {
    fn cancelled() -> Self {
        Self {
            outcome: Outcome::Cancelled,
            copied: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Whether every listed command made it into the local space.
    pub fn fully_copied(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Reconciles the local command box with the remote snippet service.
pub struct SyncEngine<'ctx, R, I>
where
    R: Remote,
    I: Interact,
{
    cbox: &'ctx mut CommandBox,
    repository: &'ctx Repository,
    session: Session,
    remote: R,
    console: I,
}

impl<'ctx, R, I> SyncEngine<'ctx, R, I>
where
    R: Remote,
    I: Interact,
{
    /// Construct new synchronization engine over a loaded command box.
    pub fn new(
        cbox: &'ctx mut CommandBox,
        repository: &'ctx Repository,
        session: Session,
        remote: R,
        console: I,
    ) -> Self {
        Self {
            cbox,
            repository,
            session,
            remote,
            console,
        }
    }

    /// Publish a local space, or a single command of it.
    ///
    /// A space without a namespace adopts the logged-in user's namespace.
    /// With `organization` given, the space switches to that organization
    /// namespace instead, with a warning when that differs from where the
    /// space was published before. An item selector narrows the published
    /// payload to the matching commands, filtered on a structural copy.
    ///
    /// On success the local file moves to the space's new address and the
    /// command box is saved, so the adopted namespace is durable.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Cbox`] if the space does not exist locally.
    /// - Return [`SyncError::NotLoggedIn`] if the space needs a default
    ///   namespace and nobody is logged in.
    /// - Return [`SyncError::NoMatchingCommands`] if an item selector
    ///   matches nothing.
    /// - Return [`SyncError::Remote`] if the remote service fails.
    /// - Return [`SyncError::Storage`] if persisting the result fails.
    #[instrument(skip(self), level = "debug")]
    pub fn publish(
        &mut self,
        selector: &Selector,
        organization: Option<String>,
    ) -> Result<Outcome> {
        let login = self.session.login.clone();
        let space = self.cbox.find_space_mut(selector)?;
        let previous = space.selector.space_level();

        // Filter before anything mutates, on a copy that shares no storage
        // with the entry sequence the box keeps persisting.
        let filtered = match &selector.item {
            Some(item) => {
                let commands = space.commands_labelled(item);
                if commands.is_empty() {
                    return Err(SyncError::NoMatchingCommands {
                        selector: selector.clone(),
                    });
                }
                Some(commands)
            }
            None => None,
        };

        if space.selector.namespace.is_none() {
            let login = login.ok_or(SyncError::NotLoggedIn)?;
            space.selector.namespace = Namespace::User(login);
        }

        if let Some(organization) = organization {
            let target = Namespace::Organization(organization);
            if space.selector.namespace != target {
                warn!(
                    "you're about to publish space '{}' under a different organization '{}'",
                    space.label,
                    target.name().unwrap_or_default()
                );
            }
            space.selector.namespace = target;
        }

        let mut payload = space.clone();
        if let Some(entries) = filtered {
            payload.entries = entries;
        }
        payload.rebind_addresses();

        if !self.console.confirm(&format!("Publish '{}'?", payload.id)) {
            space.selector.namespace = previous.namespace.clone();
            return Ok(Outcome::Cancelled);
        }

        info!("publishing space '{}'", payload.id);
        if let Err(err) = self.remote.space_publish(&payload) {
            space.selector.namespace = previous.namespace.clone();
            return Err(err.into());
        }

        // The address may have changed. Write the new file first, then
        // remove the one left under the previous address.
        let stale = self.repository.rename(space, &previous)?;
        if let Some(stale) = stale {
            info!("removing stale space file for '{}'", stale.selector());
            self.repository.remove_stale(stale)?;
        }
        self.cbox.save(self.repository)?;

        Ok(Outcome::Completed)
    }

    /// Remove a published space from the remote service.
    ///
    /// Local data is never touched. The existence of a local copy is only
    /// reported for the user's orientation.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Remote`] if the remote service fails.
    #[instrument(skip(self), level = "debug")]
    pub fn unpublish(&mut self, selector: &Selector) -> Result<Outcome> {
        match self.cbox.find_space(selector) {
            Ok(_) => info!("local copy of '{}' won't be deleted", selector),
            Err(_) => warn!("you don't have a local copy of '{}'", selector),
        }

        if !self.console.confirm(&format!("Unpublish '{}'?", selector)) {
            return Ok(Outcome::Cancelled);
        }

        info!("unpublishing space '{}'", selector);
        self.remote.space_unpublish(selector)?;

        Ok(Outcome::Completed)
    }

    /// Create a local space from a published one.
    ///
    /// Retrieves the space and its commands, then registers the result into
    /// the command box. As long as the address is already taken locally, the
    /// user is asked for a fresh label and the registration is retried,
    /// until it succeeds or the user aborts.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Remote`] if the remote service fails.
    /// - Return [`SyncError::Parse`] if the retrieved space carries a
    ///   malformed `id`.
    /// - Return [`SyncError::Storage`] if persisting the result fails.
    #[instrument(skip(self), level = "debug")]
    pub fn clone_space(&mut self, selector: &Selector) -> Result<Outcome> {
        let mut space = self.retrieve(selector)?;
        space.entries = self.remote.command_list(selector)?;
        info!(
            "cloning space '{}' holding {} commands",
            space.id,
            space.entries.len()
        );

        if !self.console.confirm(&format!("Clone '{}'?", space.id)) {
            return Ok(Outcome::Cancelled);
        }

        loop {
            match self.cbox.create_space(space.clone()) {
                Ok(()) => break,
                Err(err @ CboxError::DuplicateSpace { .. }) => {
                    warn!("{err}; try a different one");
                    let Some(label) = self.console.read_label("Label") else {
                        return Ok(Outcome::Cancelled);
                    };
                    space.label = label.clone();
                    space.selector.space = label;
                }
                Err(err) => return Err(err.into()),
            }
        }
        self.cbox.save(self.repository)?;

        Ok(Outcome::Completed)
    }

    /// Refresh a local space from its published counterpart.
    ///
    /// Entries, description, and modification timestamp are overwritten with
    /// the remote values. The local label is deliberately preserved, because
    /// the user may have renamed their local copy without wanting that to
    /// desync the address used to reach the remote.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Cbox`] if the space does not exist locally.
    /// - Return [`SyncError::Remote`] if the remote service fails.
    /// - Return [`SyncError::Storage`] if persisting the result fails.
    #[instrument(skip(self), level = "debug")]
    pub fn pull(&mut self, selector: &Selector) -> Result<Outcome> {
        self.cbox.find_space(selector)?;

        let remote_space = self.retrieve(selector)?;
        let commands = self.remote.command_list(selector)?;

        let space = self.cbox.find_space_mut(selector)?;
        space.entries = commands;
        space.updated_at = remote_space.updated_at;
        space.description = remote_space.description;

        info!("pulled space '{}'", selector);
        self.cbox.save(self.repository)?;

        Ok(Outcome::Completed)
    }

    /// Copy published commands into an existing local space.
    ///
    /// Every command the remote lists under the source selector is offered
    /// to the local space. Duplicate labels are skipped without aborting the
    /// rest of the batch. Whatever was stored is persisted, and the report
    /// states exactly what was and was not copied.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Cbox`] if the target space does not exist
    ///   locally.
    /// - Return [`SyncError::NoMatchingCommands`] if the remote lists
    ///   nothing under the source selector.
    /// - Return [`SyncError::Remote`] if the remote service fails.
    /// - Return [`SyncError::Storage`] if persisting the result fails.
    #[instrument(skip(self), level = "debug")]
    pub fn copy_commands(&mut self, source: &Selector, target: &Selector) -> Result<CopyReport> {
        self.cbox.find_space(target)?;

        let commands = self.remote.command_list(source)?;
        if commands.is_empty() {
            return Err(SyncError::NoMatchingCommands {
                selector: source.clone(),
            });
        }

        let question = format!("Copy {} commands into '{}'?", commands.len(), target);
        if !self.console.confirm(&question) {
            return Ok(CopyReport::cancelled());
        }

        let mut report = CopyReport {
            outcome: Outcome::Completed,
            copied: Vec::new(),
            skipped: Vec::new(),
        };
        for command in commands {
            let label = command.label.clone();
            match self.cbox.add_command(target, command) {
                Ok(()) => report.copied.push(label),
                Err(err @ CboxError::DuplicateCommand { .. }) => {
                    warn!("{err}");
                    report.skipped.push(label);
                }
                Err(err) => return Err(err.into()),
            }
        }
        self.cbox.save(self.repository)?;

        Ok(report)
    }

    /// Look up a published space's metadata.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Remote`] if the remote service fails.
    pub fn space_info(&self, selector: &Selector) -> Result<Space> {
        let mut space = self.remote.space_find(selector)?;
        rederive_selector(&mut space)?;

        Ok(space)
    }

    /// List published commands matching the selector.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Remote`] if the remote service fails.
    pub fn command_list(&self, selector: &Selector) -> Result<Vec<Command>> {
        Ok(self.remote.command_list(selector)?)
    }

    fn retrieve(&self, selector: &Selector) -> Result<Space> {
        let mut space = self.remote.space_retrieve(selector)?;
        rederive_selector(&mut space)?;

        Ok(space)
    }
}

/// Re-derive the structured selector of a space arriving over the wire.
///
/// Remote payloads carry the address only as the `id` string, exactly like
/// persisted files do.
fn rederive_selector(space: &mut Space) -> Result<()> {
    if !space.id.is_empty() {
        space.selector = Selector::parse_mandatory_space(&space.id)?;
    }

    Ok(())
}

/// Synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Local command box lookup or mutation failed.
    #[error(transparent)]
    Cbox(#[from] CboxError),

    /// Local persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The remote service failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A payload arriving from the remote carried a malformed address.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No commands matched the requested selector.
    #[error("no commands matched selector '{selector}'")]
    NoMatchingCommands { selector: Selector },

    /// The operation needs a logged-in user to act for.
    #[error("you are not logged in to the remote service")]
    NotLoggedIn,
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{
        cell::RefCell,
        collections::{HashMap, VecDeque},
        path::Path,
    };

    #[derive(Default)]
    struct Script {
        confirms: VecDeque<bool>,
        labels: VecDeque<String>,
    }

    impl Script {
        fn confirming() -> Self {
            Self {
                confirms: VecDeque::from([true]),
                labels: VecDeque::new(),
            }
        }

        fn declining() -> Self {
            Self {
                confirms: VecDeque::from([false]),
                labels: VecDeque::new(),
            }
        }
    }

    impl Interact for Script {
        fn confirm(&mut self, _message: &str) -> bool {
            self.confirms.pop_front().unwrap_or(false)
        }

        fn read_label(&mut self, _message: &str) -> Option<String> {
            self.labels.pop_front()
        }
    }

    #[derive(Default)]
    struct FakeRemote {
        spaces: HashMap<String, Space>,
        commands: HashMap<String, Vec<Command>>,
        published: RefCell<Vec<Space>>,
        unpublished: RefCell<Vec<Selector>>,
    }

    impl FakeRemote {
        fn holding(space: Space, commands: Vec<Command>) -> Self {
            let mut remote = Self::default();
            remote.commands.insert(space.id.clone(), commands);
            remote.spaces.insert(space.id.clone(), space);
            remote
        }
    }

    impl Remote for FakeRemote {
        fn space_find(&self, selector: &Selector) -> remote::Result<Space> {
            self.space_retrieve(selector)
        }

        fn space_publish(&self, space: &Space) -> remote::Result<()> {
            self.published.borrow_mut().push(space.clone());
            Ok(())
        }

        fn space_unpublish(&self, selector: &Selector) -> remote::Result<()> {
            self.unpublished.borrow_mut().push(selector.clone());
            Ok(())
        }

        fn space_retrieve(&self, selector: &Selector) -> remote::Result<Space> {
            self.spaces
                .get(&selector.space_level().to_string())
                .cloned()
                .ok_or_else(|| RemoteError::NotFound {
                    selector: selector.clone(),
                })
        }

        fn command_list(&self, selector: &Selector) -> remote::Result<Vec<Command>> {
            let commands = self
                .commands
                .get(&selector.space_level().to_string())
                .cloned()
                .ok_or_else(|| RemoteError::NotFound {
                    selector: selector.clone(),
                })?;

            Ok(match &selector.item {
                Some(item) => commands.into_iter().filter(|c| &c.label == item).collect(),
                None => commands,
            })
        }
    }

    fn session(login: &str) -> Session {
        Session {
            login: Some(login.into()),
        }
    }

    fn local_space(cbox: &mut CommandBox, label: &str, commands: &[&str]) {
        let mut space = Space::new(label, "local space");
        for command in commands {
            space
                .entries
                .push(Command::new(*command, "", format!("./{command}.sh")));
        }
        space.rebind_addresses();
        cbox.add_space(space).unwrap();
    }

    fn remote_space(id: &str, label: &str, description: &str) -> Space {
        let mut space = Space::new(label, description);
        space.id = id.into();
        space
    }

    #[sealed_test]
    fn publish_adopts_user_namespace_and_moves_file() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "shell", &["deploy"]);
        cbox.save(&repository)?;
        assert!(Path::new("store/spaces/shell.json").exists());

        let fake = FakeRemote::default();
        let selector = Selector::parse_mandatory_space("shell")?;
        let outcome = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .publish(&selector, None)?;

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(fake.published.borrow()[0].id, "awkless:shell");
        assert!(Path::new("store/spaces/awkless:shell.json").exists());
        assert!(!Path::new("store/spaces/shell.json").exists());

        let published = Selector::parse_mandatory_space("awkless:shell")?;
        assert!(cbox.find_space(&published).is_ok());

        Ok(())
    }

    #[sealed_test]
    fn publish_with_item_filters_structural_copy_only() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "shell", &["deploy", "rollback"]);
        cbox.save(&repository)?;

        let fake = FakeRemote::default();
        let selector = Selector::parse_mandatory_space("deploy@shell")?;
        SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .publish(&selector, None)?;

        let payload = &fake.published.borrow()[0];
        assert_eq!(payload.entries.len(), 1);
        assert_eq!(payload.entries[0].id, "deploy@awkless:shell");

        // The box's own space keeps its full entry list, durably.
        let published = Selector::parse_mandatory_space("awkless:shell")?;
        assert_eq!(cbox.find_space(&published)?.entries.len(), 2);
        let reloaded = CommandBox::load(&repository)?;
        assert_eq!(reloaded.find_space(&published)?.entries.len(), 2);

        Ok(())
    }

    #[sealed_test]
    fn publish_with_organization_override_switches_namespace() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "shell", &["deploy"]);
        cbox.save(&repository)?;

        let fake = FakeRemote::default();
        let selector = Selector::parse_mandatory_space("shell")?;
        SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .publish(&selector, Some("dplabs".into()))?;

        assert_eq!(fake.published.borrow()[0].id, "dplabs/shell");
        assert!(Path::new("store/spaces/dplabs=shell.json").exists());
        assert!(!Path::new("store/spaces/shell.json").exists());

        Ok(())
    }

    #[sealed_test]
    fn publish_declined_changes_nothing() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "shell", &["deploy"]);
        cbox.save(&repository)?;

        let fake = FakeRemote::default();
        let selector = Selector::parse_mandatory_space("shell")?;
        let outcome = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::declining(),
        )
        .publish(&selector, None)?;

        assert_eq!(outcome, Outcome::Cancelled);
        assert!(fake.published.borrow().is_empty());
        assert!(cbox.find_space(&selector).is_ok());
        assert!(Path::new("store/spaces/shell.json").exists());
        assert!(!Path::new("store/spaces/awkless:shell.json").exists());

        Ok(())
    }

    #[sealed_test]
    fn publish_without_matching_item_fails() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "shell", &["deploy"]);

        let fake = FakeRemote::default();
        let selector = Selector::parse_mandatory_space("ghost@shell")?;
        let result = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .publish(&selector, None);

        assert!(matches!(
            result,
            Err(SyncError::NoMatchingCommands { .. })
        ));
        assert!(fake.published.borrow().is_empty());

        Ok(())
    }

    #[sealed_test]
    fn unpublish_never_touches_local_data() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "shell", &["deploy"]);
        cbox.save(&repository)?;

        let fake = FakeRemote::default();
        let selector = Selector::parse_remote("awkless:shell")?;
        let outcome = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .unpublish(&selector)?;

        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(fake.unpublished.borrow().as_slice(), &[selector]);
        assert!(Path::new("store/spaces/shell.json").exists());
        assert_eq!(cbox.spaces().len(), 1);

        Ok(())
    }

    #[sealed_test]
    fn clone_retries_duplicate_labels_until_free() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();

        let mut taken = remote_space("awkless:scripts", "scripts", "already here");
        taken.selector = Selector::parse_mandatory_space("awkless:scripts")?;
        cbox.add_space(taken)?;

        let fake = FakeRemote::holding(
            remote_space("awkless:scripts", "scripts", "published"),
            vec![Command::new("deploy", "", "./deploy.sh")],
        );

        let selector = Selector::parse_remote("awkless:scripts")?;
        let console = Script {
            confirms: VecDeque::from([true]),
            labels: VecDeque::from(["scripts2".to_string()]),
        };
        let outcome = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            console,
        )
        .clone_space(&selector)?;

        assert_eq!(outcome, Outcome::Completed);
        let renamed = Selector::parse_mandatory_space("awkless:scripts2")?;
        let cloned = cbox.find_space(&renamed)?;
        assert_eq!(cloned.entries.len(), 1);
        assert!(Path::new("store/spaces/awkless:scripts2.json").exists());

        Ok(())
    }

    #[sealed_test]
    fn clone_aborted_at_label_prompt_is_cancelled() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();

        let mut taken = remote_space("awkless:scripts", "scripts", "already here");
        taken.selector = Selector::parse_mandatory_space("awkless:scripts")?;
        cbox.add_space(taken)?;

        let fake = FakeRemote::holding(
            remote_space("awkless:scripts", "scripts", "published"),
            Vec::new(),
        );

        let selector = Selector::parse_remote("awkless:scripts")?;
        let outcome = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .clone_space(&selector)?;

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(cbox.spaces().len(), 1);

        Ok(())
    }

    #[sealed_test]
    fn pull_preserves_local_label() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();

        let mut mine = Space::new("mine", "old");
        mine.selector = Selector::parse_mandatory_space("awkless:mine")?;
        mine.entries.push(Command::new("a", "", "./a.sh"));
        cbox.add_space(mine)?;

        let mut theirs = remote_space("awkless:mine", "theirs", "new");
        theirs.touch();
        let fake = FakeRemote::holding(theirs, vec![Command::new("b", "", "./b.sh")]);

        let selector = Selector::parse_mandatory_space("awkless:mine")?;
        let outcome = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::default(),
        )
        .pull(&selector)?;

        assert_eq!(outcome, Outcome::Completed);
        let pulled = cbox.find_space(&selector)?;
        assert_eq!(pulled.label, "mine");
        assert_eq!(pulled.description, "new");
        assert_eq!(pulled.entries.len(), 1);
        assert_eq!(pulled.entries[0].id, "b@awkless:mine");

        Ok(())
    }

    #[sealed_test]
    fn copy_commands_skips_duplicates_without_aborting() -> anyhow::Result<()> {
        let repository = Repository::open("store")?;
        let mut cbox = CommandBox::default();
        local_space(&mut cbox, "scripts", &["deploy"]);

        let fake = FakeRemote::holding(
            remote_space("awkless:shell", "shell", "published"),
            vec![
                Command::new("deploy", "", "./deploy.sh"),
                Command::new("undo", "", "./rollback.sh"),
            ],
        );

        let source = Selector::parse_remote("awkless:shell")?;
        let target = Selector::parse_mandatory_space("scripts")?;
        let report = SyncEngine::new(
            &mut cbox,
            &repository,
            session("awkless"),
            &fake,
            Script::confirming(),
        )
        .copy_commands(&source, &target)?;

        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!(report.copied, vec!["undo".to_string()]);
        assert_eq!(report.skipped, vec!["deploy".to_string()]);
        assert!(!report.fully_copied());

        // Successes are durable despite the partial failure.
        let reloaded = CommandBox::load(&repository)?;
        assert_eq!(reloaded.find_space(&target)?.entries.len(), 2);

        Ok(())
    }
}
