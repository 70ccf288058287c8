// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use cmdbox::{
    cbox::{CboxError, CommandBox},
    model::{Command, Space},
    repository::Repository,
    selector::Selector,
};

use pretty_assertions::assert_eq;
use sealed_test::prelude::*;

#[sealed_test]
fn create_persist_reload_find() -> anyhow::Result<()> {
    let repository = Repository::open("store")?;
    assert!(repository.is_first_run());
    let mut cbox = CommandBox::load(&repository)?;

    cbox.add_space(Space::new("scripts", "deployment scripts"))?;
    let selector = Selector::parse_mandatory_space("scripts")?;
    cbox.add_command(&selector, Command::new("deploy", "ship it", "./deploy.sh"))?;
    cbox.save(&repository)?;

    let repository = Repository::open("store")?;
    assert!(!repository.is_first_run());
    let reloaded = CommandBox::load(&repository)?;

    let space = reloaded.find_space(&selector)?;
    let command = space
        .find_command("deploy")
        .expect("command survives the round trip");
    assert_eq!(command.code, "./deploy.sh");
    assert_eq!(command.id, "deploy@scripts");

    Ok(())
}

#[sealed_test]
fn duplicate_space_creation_recovers_with_fresh_label() -> anyhow::Result<()> {
    let repository = Repository::open("store")?;
    let mut cbox = CommandBox::load(&repository)?;
    cbox.add_space(Space::new("scripts", ""))?;
    cbox.save(&repository)?;

    let result = cbox.create_space(Space::new("scripts", "incoming clone"));
    assert!(matches!(result, Err(CboxError::DuplicateSpace { .. })));
    assert_eq!(cbox.spaces().len(), 1);

    cbox.create_space(Space::new("scripts2", "incoming clone"))?;
    cbox.save(&repository)?;

    let reloaded = CommandBox::load(&repository)?;
    assert_eq!(reloaded.spaces().len(), 2);

    Ok(())
}

#[sealed_test]
fn interrupted_rename_leaves_valid_orphan() -> anyhow::Result<()> {
    let repository = Repository::open("store")?;
    let mut space = Space::new("shell", "daily drivers");
    repository.persist(&mut space)?;

    let previous = space.selector.clone();
    space.label = "tools".into();
    // First rename phase only. The stale token is dropped, as if the process
    // died before the old file was removed.
    let _stale = repository.rename(&mut space, &previous)?;

    let reloaded = CommandBox::load(&repository)?;
    assert_eq!(reloaded.spaces().len(), 2);
    assert!(reloaded
        .find_space(&Selector::parse_mandatory_space("shell")?)
        .is_ok());
    assert!(reloaded
        .find_space(&Selector::parse_mandatory_space("tools")?)
        .is_ok());

    Ok(())
}
