// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Organize your shell command snippets into shareable spaces.
//!
//! Cmdbox keeps reusable shell commands as __commands__ grouped into named
//! collections called __spaces__, stored as one JSON file per space in a
//! local store. Spaces can be tagged, searched, and optionally synchronized
//! with a remote snippet service under a user or organization namespace.
//!
//! The crate splits into a handful of layers, leaf first:
//!
//! - [`selector`]: the addressing scheme everything else speaks.
//! - [`model`]: the command and space records that get persisted.
//! - [`repository`]: JSON-per-space file storage.
//! - [`cbox`]: the in-memory aggregate owning all local spaces.
//! - [`sync`]: reconciliation against the remote service seam.
//!
//! [`config`], [`console`], and [`path`] carry the ambient concerns of the
//! command-line front end: settings layout, interactive prompting, and XDG
//! path resolution.

pub mod cbox;
pub mod config;
pub mod console;
pub mod model;
pub mod path;
pub mod repository;
pub mod selector;
pub mod sync;
