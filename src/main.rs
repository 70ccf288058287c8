// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use cmdbox::{
    cbox::{CboxError, CommandBox},
    config::Config,
    console::{Interact, Terminal},
    model,
    path::{default_config_file, default_store_dir},
    repository::Repository,
    selector::Selector,
    sync::{remote::Disconnected, Outcome, Session, SyncEngine},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::exit;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "cmdbox [options] <cmdbox-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Space(command) => command.run(),
            Command::Cmd(command) => command.run(),
            Command::Search(opts) => run_search(opts),
            Command::Tags => run_tags(),
            Command::Cloud(command) => command.run(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Manage spaces in your cmdbox.
    #[command(subcommand)]
    Space(SpaceCommand),

    /// Manage commands inside a space.
    #[command(subcommand, name = "command")]
    Cmd(CmdCommand),

    /// Search for commands across your cmdbox.
    #[command(override_usage = "cmdbox search [options] <criteria>")]
    Search(SearchOptions),

    /// List the tags available in your cmdbox.
    Tags,

    /// Synchronize spaces with the remote snippet service.
    #[command(subcommand)]
    Cloud(CloudCommand),
}

#[derive(Debug, Clone, Subcommand)]
enum SpaceCommand {
    /// Create a new space.
    #[command(override_usage = "cmdbox space add [options] <label>")]
    Add(SpaceAddOptions),

    /// Edit an existing space.
    #[command(override_usage = "cmdbox space edit [options] <selector>")]
    Edit(SpaceEditOptions),

    /// Delete a space and its commands.
    #[command(override_usage = "cmdbox space delete <selector>")]
    Delete(SpaceDeleteOptions),

    /// List every space in your cmdbox.
    List,
}

impl SpaceCommand {
    fn run(self) -> Result<()> {
        match self {
            Self::Add(opts) => run_space_add(opts),
            Self::Edit(opts) => run_space_edit(opts),
            Self::Delete(opts) => run_space_delete(opts),
            Self::List => run_space_list(),
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SpaceAddOptions {
    /// Label of the new space.
    #[arg(value_name = "label")]
    pub label: String,

    /// Brief description of what the space collects.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SpaceEditOptions {
    /// Selector of the space to edit.
    #[arg(value_name = "selector")]
    pub selector: String,

    /// New label for the space.
    #[arg(short, long, value_name = "label")]
    pub label: Option<String>,

    /// New description for the space.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SpaceDeleteOptions {
    /// Selector of the space to delete.
    #[arg(value_name = "selector")]
    pub selector: String,
}

#[derive(Debug, Clone, Subcommand)]
enum CmdCommand {
    /// Store a new command into a space.
    #[command(override_usage = "cmdbox command add [options] <space> <label> <code>")]
    Add(CommandAddOptions),

    /// Edit a stored command.
    #[command(override_usage = "cmdbox command edit [options] <selector>")]
    Edit(CommandEditOptions),

    /// Delete a stored command.
    #[command(override_usage = "cmdbox command delete <selector>")]
    Delete(CommandDeleteOptions),

    /// Add or remove tags of a stored command.
    #[command(override_usage = "cmdbox command tag [options] <selector>")]
    Tag(CommandTagOptions),
}

impl CmdCommand {
    fn run(self) -> Result<()> {
        match self {
            Self::Add(opts) => run_command_add(opts),
            Self::Edit(opts) => run_command_edit(opts),
            Self::Delete(opts) => run_command_delete(opts),
            Self::Tag(opts) => run_command_tag(opts),
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CommandAddOptions {
    /// Selector of the space to store the command into.
    #[arg(value_name = "space")]
    pub space: String,

    /// Label of the new command.
    #[arg(value_name = "label")]
    pub label: String,

    /// The snippet body itself.
    #[arg(value_name = "code")]
    pub code: String,

    /// Brief description of what the snippet does.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,

    /// Reference link for the snippet.
    #[arg(short, long, value_name = "url")]
    pub url: Option<String>,

    /// Tags to attach to the command.
    #[arg(short, long, value_name = "tag")]
    pub tags: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CommandEditOptions {
    /// Selector of the command to edit.
    #[arg(value_name = "selector")]
    pub selector: String,

    /// New label for the command.
    #[arg(short, long, value_name = "label")]
    pub label: Option<String>,

    /// New description for the command.
    #[arg(short, long, value_name = "summary")]
    pub description: Option<String>,

    /// New snippet body for the command.
    #[arg(short, long, value_name = "code")]
    pub code: Option<String>,

    /// New reference link for the command.
    #[arg(short, long, value_name = "url")]
    pub url: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CommandDeleteOptions {
    /// Selector of the command to delete.
    #[arg(value_name = "selector")]
    pub selector: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CommandTagOptions {
    /// Selector of the command to tag.
    #[arg(value_name = "selector")]
    pub selector: String,

    /// Tags to add.
    #[arg(short, long, value_name = "tag")]
    pub add: Vec<String>,

    /// Tags to remove.
    #[arg(short, long, value_name = "tag")]
    pub delete: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SearchOptions {
    /// Text to look for in labels, descriptions, and snippet bodies.
    #[arg(value_name = "criteria")]
    pub criteria: String,

    /// Restrict the search to one space.
    #[arg(short, long, value_name = "selector")]
    pub space: Option<String>,

    /// Show the snippet body of each match.
    #[arg(short, long)]
    pub view: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum CloudCommand {
    /// Show info of a published space.
    #[command(override_usage = "cmdbox cloud info <selector>")]
    Info(CloudSelectorOptions),

    /// Publish a space, or one command of it.
    #[command(override_usage = "cmdbox cloud publish [options] <selector>")]
    Publish(CloudPublishOptions),

    /// Remove a published space from the remote service.
    #[command(override_usage = "cmdbox cloud unpublish <selector>")]
    Unpublish(CloudSelectorOptions),

    /// Create a local space from a published one.
    #[command(override_usage = "cmdbox cloud clone <selector>")]
    Clone(CloudSelectorOptions),

    /// Refresh a local space from its published counterpart.
    #[command(override_usage = "cmdbox cloud pull <selector>")]
    Pull(CloudSelectorOptions),

    /// Copy published commands into a local space.
    #[command(override_usage = "cmdbox cloud copy <source> <target>")]
    Copy(CloudCopyOptions),

    /// List published commands matching a selector.
    #[command(override_usage = "cmdbox cloud list <selector>")]
    List(CloudSelectorOptions),
}

impl CloudCommand {
    fn run(self) -> Result<()> {
        match self {
            Self::Info(opts) => run_cloud_info(opts),
            Self::Publish(opts) => run_cloud_publish(opts),
            Self::Unpublish(opts) => run_cloud_unpublish(opts),
            Self::Clone(opts) => run_cloud_clone(opts),
            Self::Pull(opts) => run_cloud_pull(opts),
            Self::Copy(opts) => run_cloud_copy(opts),
            Self::List(opts) => run_cloud_list(opts),
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CloudSelectorOptions {
    /// Selector of the target space or command.
    #[arg(value_name = "selector")]
    pub selector: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CloudPublishOptions {
    /// Selector of the space or command to publish.
    #[arg(value_name = "selector")]
    pub selector: String,

    /// Publish under an organization namespace instead of your own.
    #[arg(short, long, value_name = "organization")]
    pub organization: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CloudCopyOptions {
    /// Selector of the published commands to copy.
    #[arg(value_name = "source")]
    pub source: String,

    /// Selector of the local space to copy into.
    #[arg(value_name = "target")]
    pub target: String,
}

fn main() {
    let layer = fmt::layer().compact().with_target(false).without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_config() -> Result<Config> {
    let path = default_config_file()?;
    match std::fs::read_to_string(&path) {
        Ok(data) => Ok(data.parse()?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to read {:?}", path.display()))
        }
    }
}

fn open_repository(config: &Config) -> Result<Repository> {
    let store = match &config.store.path {
        Some(path) => path.as_path().to_path_buf(),
        None => default_store_dir()?,
    };

    let repository = Repository::open(store)?;
    if repository.is_first_run() {
        info!("initialized a fresh cmdbox store");
    }

    Ok(repository)
}

fn run_space_add(opts: SpaceAddOptions) -> Result<()> {
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;
    let mut console = Terminal;

    let mut space = model::Space::new(opts.label, opts.description.unwrap_or_default());
    loop {
        match cbox.add_space(space.clone()) {
            Ok(()) => break,
            Err(err @ CboxError::DuplicateSpace { .. }) => {
                warn!("{err}; try a different one");
                let Some(label) = console.read_label("Label") else {
                    warn!("space creation cancelled");
                    return Ok(());
                };
                space.label = label.clone();
                space.selector.space = label;
            }
            Err(err) => return Err(err.into()),
        }
    }
    cbox.save(&repository)?;

    info!("space successfully created");

    Ok(())
}

fn run_space_edit(opts: SpaceEditOptions) -> Result<()> {
    let previous = Selector::parse_mandatory_space(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;
    let mut console = Terminal;

    let current = cbox.find_space(&previous)?;
    let mut label = opts.label.unwrap_or_else(|| current.label.clone());
    let description = opts
        .description
        .unwrap_or_else(|| current.description.clone());

    if !console.confirm("Update?") {
        warn!("edition cancelled");
        return Ok(());
    }

    loop {
        match cbox.edit_space(&previous, label.clone(), description.clone()) {
            Ok(space) => {
                let stale = repository.rename(space, &previous)?;
                if let Some(stale) = stale {
                    repository.remove_stale(stale)?;
                }
                break;
            }
            Err(err @ CboxError::DuplicateSpace { .. }) => {
                warn!("{err}; try a different one");
                let Some(input) = console.read_label("Label") else {
                    warn!("edition cancelled");
                    return Ok(());
                };
                label = input;
            }
            Err(err) => return Err(err.into()),
        }
    }
    cbox.save(&repository)?;

    info!("space updated successfully");

    Ok(())
}

fn run_space_delete(opts: SpaceDeleteOptions) -> Result<()> {
    let selector = Selector::parse_mandatory_space(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;
    let mut console = Terminal;

    let space = cbox.find_space(&selector)?;
    info!("deleting space '{}' with {} commands", space.id, space.entries.len());

    if !console.confirm("Are you sure you want to delete this space?") {
        warn!("deletion cancelled");
        return Ok(());
    }

    cbox.delete_space(&selector)?;
    repository.delete(&selector)?;

    info!("space deleted successfully");

    Ok(())
}

fn run_space_list() -> Result<()> {
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let cbox = CommandBox::load(&repository)?;

    for space in cbox.spaces() {
        println!(
            "{}: {} ({} commands)",
            space.id,
            space.description,
            space.entries.len()
        );
    }

    Ok(())
}

fn run_command_add(opts: CommandAddOptions) -> Result<()> {
    let selector = Selector::parse_mandatory_space(&opts.space)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;
    let mut console = Terminal;

    let mut command =
        model::Command::new(opts.label, opts.description.unwrap_or_default(), opts.code);
    command.url = opts.url;
    for tag in opts.tags {
        command.tag_add(tag);
    }

    loop {
        match cbox.add_command(&selector, command.clone()) {
            Ok(()) => break,
            Err(err @ CboxError::DuplicateCommand { .. }) => {
                warn!("{err}; try a different one");
                let Some(label) = console.read_label("Label") else {
                    warn!("command creation cancelled");
                    return Ok(());
                };
                command.label = label;
            }
            Err(err) => return Err(err.into()),
        }
    }
    cbox.save(&repository)?;

    info!("command successfully stored");

    Ok(())
}

fn run_command_edit(opts: CommandEditOptions) -> Result<()> {
    let previous = Selector::parse_mandatory_item(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let item = previous.item.clone().unwrap_or_default();
    let current = cbox
        .find_space(&previous)?
        .find_command(&item)
        .ok_or_else(|| CboxError::CommandNotFound {
            selector: previous.clone(),
        })?
        .clone();

    cbox.edit_command(
        &previous,
        opts.label.unwrap_or(current.label),
        opts.description.unwrap_or(current.description),
        opts.code.unwrap_or(current.code),
        opts.url.or(current.url),
    )?;
    cbox.save(&repository)?;

    info!("command updated successfully");

    Ok(())
}

fn run_command_delete(opts: CommandDeleteOptions) -> Result<()> {
    let selector = Selector::parse_mandatory_item(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;
    let mut console = Terminal;

    if !console.confirm("Are you sure you want to delete this command?") {
        warn!("deletion cancelled");
        return Ok(());
    }

    cbox.delete_command(&selector)?;
    cbox.save(&repository)?;

    info!("command deleted successfully");

    Ok(())
}

fn run_command_tag(opts: CommandTagOptions) -> Result<()> {
    let selector = Selector::parse_mandatory_item(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let item = selector.item.clone().ok_or_else(|| CboxError::CommandNotFound {
        selector: selector.clone(),
    })?;
    let space = cbox.find_space_mut(&selector)?;
    let command = space
        .find_command_mut(&item)
        .ok_or_else(|| CboxError::CommandNotFound {
            selector: selector.clone(),
        })?;

    for tag in opts.add {
        command.tag_add(tag);
    }
    for tag in opts.delete {
        command.tag_delete(tag);
    }
    cbox.save(&repository)?;

    info!("tags updated successfully");

    Ok(())
}

fn run_search(opts: SearchOptions) -> Result<()> {
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let cbox = CommandBox::load(&repository)?;

    let hits: Vec<model::Command> = match &opts.space {
        Some(space) => {
            let selector = Selector::parse_mandatory_space(space)?;
            cbox.find_space(&selector)?
                .search(&opts.criteria)
                .into_iter()
                .cloned()
                .collect()
        }
        None => cbox
            .search(&opts.criteria)
            .into_iter()
            .cloned()
            .collect(),
    };

    for command in hits {
        if opts.view {
            println!("{}: {}", command.id, command.code);
        } else {
            println!("{}: {}", command.id, command.description);
        }
    }

    Ok(())
}

fn run_tags() -> Result<()> {
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let cbox = CommandBox::load(&repository)?;

    for tag in cbox.tags() {
        println!("{tag}");
    }

    Ok(())
}

fn session(config: &Config) -> Session {
    Session {
        login: config.remote.login.clone(),
    }
}

fn run_cloud_info(opts: CloudSelectorOptions) -> Result<()> {
    let selector = Selector::parse_remote(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let engine = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    );
    let space = engine.space_info(&selector)?;
    println!(
        "{}: {} (updated {})",
        space.id, space.description, space.updated_at
    );

    Ok(())
}

fn run_cloud_publish(opts: CloudPublishOptions) -> Result<()> {
    let selector = Selector::parse_mandatory_space(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let outcome = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    )
    .publish(&selector, opts.organization)?;

    match outcome {
        Outcome::Completed => info!("space published successfully"),
        Outcome::Cancelled => warn!("publishing cancelled"),
    }

    Ok(())
}

fn run_cloud_unpublish(opts: CloudSelectorOptions) -> Result<()> {
    let selector = Selector::parse_remote(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let outcome = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    )
    .unpublish(&selector)?;

    match outcome {
        Outcome::Completed => info!("space unpublished successfully"),
        Outcome::Cancelled => warn!("unpublishing cancelled"),
    }

    Ok(())
}

fn run_cloud_clone(opts: CloudSelectorOptions) -> Result<()> {
    let selector = Selector::parse_remote(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let outcome = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    )
    .clone_space(&selector)?;

    match outcome {
        Outcome::Completed => info!("space cloned successfully"),
        Outcome::Cancelled => warn!("clone cancelled"),
    }

    Ok(())
}

fn run_cloud_pull(opts: CloudSelectorOptions) -> Result<()> {
    let selector = Selector::parse_mandatory_space(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let outcome = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    )
    .pull(&selector)?;

    match outcome {
        Outcome::Completed => info!("space pulled successfully"),
        Outcome::Cancelled => warn!("pull cancelled"),
    }

    Ok(())
}

fn run_cloud_copy(opts: CloudCopyOptions) -> Result<()> {
    let source = Selector::parse_remote(&opts.source)?;
    let target = Selector::parse_mandatory_space(&opts.target)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let report = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    )
    .copy_commands(&source, &target)?;

    match report.outcome {
        Outcome::Cancelled => warn!("copy cancelled"),
        Outcome::Completed if report.fully_copied() => {
            info!("commands copied successfully")
        }
        Outcome::Completed => warn!(
            "some commands could not be stored: copied {}, skipped {}",
            report.copied.len(),
            report.skipped.len()
        ),
    }

    Ok(())
}

fn run_cloud_list(opts: CloudSelectorOptions) -> Result<()> {
    let selector = Selector::parse_remote(&opts.selector)?;
    let config = load_config()?;
    let repository = open_repository(&config)?;
    let mut cbox = CommandBox::load(&repository)?;

    let engine = SyncEngine::new(
        &mut cbox,
        &repository,
        session(&config),
        Disconnected,
        Terminal,
    );
    for command in engine.command_list(&selector)? {
        println!("{}: {}", command.id, command.description);
    }

    Ok(())
}
