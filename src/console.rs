// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive prompting seam.
//!
//! The synchronization flows stop for user input in two places: yes/no
//! confirmation before anything irreversible, and re-prompting for a fresh
//! label when a clone collides with an existing space. Both go through the
//! [`Interact`] trait so the flows stay testable with scripted answers, and
//! so the terminal machinery stays out of the core entirely.

use crate::selector::valid_label;

use inquire::{Confirm, Text};
use tracing::warn;

/// Blocking user interaction points.
pub trait Interact {
    /// Ask a yes/no question. Declining is the safe default.
    fn confirm(&mut self, message: &str) -> bool;

    /// Read a label, re-prompting until it fits the selector charset.
    ///
    /// Returns [`None`] when the user aborts instead of answering.
    fn read_label(&mut self, message: &str) -> Option<String>;
}

/// Terminal-backed interaction through inquire prompts.
#[derive(Debug, Default)]
pub struct Terminal;

impl Interact for Terminal {
    fn confirm(&mut self, message: &str) -> bool {
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }

    fn read_label(&mut self, message: &str) -> Option<String> {
        loop {
            let input = Text::new(message).prompt().ok()?;
            let input = input.trim().to_lowercase();
            if valid_label(&input) {
                return Some(input);
            }

            warn!("labels may only contain lowercase letters, digits, and hyphens");
        }
    }
}
