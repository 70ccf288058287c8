// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Snippet addressing scheme.
//!
//! Every space and command in cmdbox is reachable through a __selector__, a
//! small structured address with up to three levels: an optional namespace
//! (the user or organization a space is published under), the label of the
//! space itself, and optionally the label of one command inside that space.
//!
//! # Canonical Form
//!
//! The canonical textual form of a selector is what users type on the command
//! line, and what gets stored as the `id` field of persisted entities:
//!
//! ```text
//! deploy@awkless:shell    command "deploy" in user awkless's space "shell"
//! deploy@dplabs/shell     same, but under organization "dplabs"
//! deploy@shell            command "deploy" in the local-only space "shell"
//! awkless:shell           user awkless's space "shell"
//! shell                   the local-only space "shell"
//! ```
//!
//! The user separator is `:`, the organization separator is `/`, and the item
//! prefix separator is `@`. Labels and namespace names may only contain
//! lowercase letters, digits, and hyphens. That charset excludes every
//! separator character, which is what keeps parsing unambiguous without any
//! form of escaping.
//!
//! # Filename Form
//!
//! Each space is stored as one file on disk, and the filename is derived from
//! the space-level part of its selector. The only difference from the
//! canonical form is the organization separator: `/` cannot appear in a
//! filename, so it becomes `=` instead. The `:` of user namespaces is
//! filesystem-legal and kept as-is.
//!
//! Filenames are a derived, best-effort cache for directory scanning. The
//! `id` embedded in file content is always the authoritative address, and
//! wins whenever a file was renamed out-of-band.

use std::fmt::{Display, Formatter, Result as FmtResult};

const SEPARATOR_ITEM: char = '@';
const SEPARATOR_USER: char = ':';
const SEPARATOR_ORGANIZATION: char = '/';
const SEPARATOR_ORGANIZATION_FILENAME: char = '=';

/// Namespace a space is published under.
///
/// Carries the namespace name together with its kind, so nothing ever has to
/// guess the kind back from the shape of a string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Namespace {
    /// Space only exists locally, or was never published anywhere.
    #[default]
    None,

    /// Space belongs to a personal user account.
    User(String),

    /// Space belongs to a shared organization.
    Organization(String),
}

impl Namespace {
    /// Name of the namespace, if there is one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::User(name) | Self::Organization(name) => Some(name.as_str()),
        }
    }

    /// Whether the namespace is absent.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Structured address of a space, or of one command inside a space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    /// Namespace the space lives under.
    pub namespace: Namespace,

    /// Label of the space. Only empty for a selector that denotes a space
    /// still being created, which has no canonical form yet.
    pub space: String,

    /// Label of a command inside the space, when the selector addresses a
    /// single command rather than the space itself.
    pub item: Option<String>,
}

impl Selector {
    /// Construct a space-level selector.
    pub fn space(namespace: Namespace, label: impl Into<String>) -> Self {
        Self {
            namespace,
            space: label.into(),
            item: None,
        }
    }

    /// Construct a command-level selector.
    pub fn command(namespace: Namespace, space: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            namespace,
            space: space.into(),
            item: Some(item.into()),
        }
    }

    /// Parse canonical textual form.
    ///
    /// # Errors
    ///
    /// - Return [`ParseError::Empty`] for empty input.
    /// - Return [`ParseError::InvalidLabel`] if any part is empty or carries
    ///   a character outside lowercase letters, digits, and hyphens. A
    ///   duplicated separator always trips this, because the second
    ///   separator ends up inside a part where its character is not allowed.
    pub fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let (item, rest) = match input.split_once(SEPARATOR_ITEM) {
            Some((item, rest)) => (Some(check_label(item)?), rest),
            None => (None, input),
        };

        let (namespace, space) = if let Some((name, label)) = rest.split_once(SEPARATOR_USER) {
            (Namespace::User(check_label(name)?), check_label(label)?)
        } else if let Some((name, label)) = rest.split_once(SEPARATOR_ORGANIZATION) {
            (
                Namespace::Organization(check_label(name)?),
                check_label(label)?,
            )
        } else {
            (Namespace::None, check_label(rest)?)
        };

        Ok(Self {
            namespace,
            space,
            item,
        })
    }

    /// Parse canonical form, requiring the space part.
    ///
    /// # Errors
    ///
    /// - Return [`ParseError::MissingSpace`] if the parsed selector has no
    ///   space label.
    /// - Same failures as [`Selector::parse`] otherwise.
    pub fn parse_mandatory_space(input: impl AsRef<str>) -> Result<Self> {
        let selector = Self::parse(input.as_ref())?;
        if selector.space.is_empty() {
            return Err(ParseError::MissingSpace {
                input: input.as_ref().into(),
            });
        }

        Ok(selector)
    }

    /// Parse canonical form, requiring the item part.
    ///
    /// Persisted command IDs must address one command, never a whole space.
    ///
    /// # Errors
    ///
    /// - Return [`ParseError::MissingItem`] if the input denotes a space.
    /// - Same failures as [`Selector::parse`] otherwise.
    pub fn parse_mandatory_item(input: impl AsRef<str>) -> Result<Self> {
        let selector = Self::parse(input.as_ref())?;
        if selector.item.is_none() {
            return Err(ParseError::MissingItem {
                input: input.as_ref().into(),
            });
        }

        Ok(selector)
    }

    /// Parse canonical form, requiring an explicit namespace.
    ///
    /// Selectors addressing the remote service must spell out whose space
    /// they mean.
    ///
    /// # Errors
    ///
    /// - Return [`ParseError::MissingNamespace`] if the input has no user or
    ///   organization part.
    /// - Same failures as [`Selector::parse`] otherwise.
    pub fn parse_remote(input: impl AsRef<str>) -> Result<Self> {
        let selector = Self::parse(input.as_ref())?;
        if selector.namespace.is_none() {
            return Err(ParseError::MissingNamespace {
                input: input.as_ref().into(),
            });
        }

        Ok(selector)
    }

    /// Space-level part of this selector, with any item stripped.
    pub fn space_level(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            space: self.space.clone(),
            item: None,
        }
    }

    /// Filesystem-safe encoding of the space-level part.
    ///
    /// Identical to the canonical form except the organization separator,
    /// which is illegal in a filename and becomes `=`. Any item part is
    /// ignored, because storage is one file per space.
    pub fn filename(&self) -> String {
        match &self.namespace {
            Namespace::None => self.space.clone(),
            Namespace::User(name) => format!("{}{}{}", name, SEPARATOR_USER, self.space),
            Namespace::Organization(name) => format!(
                "{}{}{}",
                name, SEPARATOR_ORGANIZATION_FILENAME, self.space
            ),
        }
    }

    /// Decode a bare filename stem back into a provisional selector.
    ///
    /// Inverse of [`Selector::filename`], used when scanning the storage
    /// directory. The result only locates the file. The authoritative
    /// selector is always re-derived from the `id` stored inside the file's
    /// content, and wins on disagreement.
    ///
    /// # Errors
    ///
    /// - Return [`ParseError::Empty`] for an empty stem.
    /// - Return [`ParseError::InvalidLabel`] if any part carries a character
    ///   outside the allowed charset.
    pub fn from_filename_stem(stem: impl AsRef<str>) -> Result<Self> {
        let stem = stem.as_ref();
        if stem.is_empty() {
            return Err(ParseError::Empty);
        }

        let (namespace, space) = if let Some((name, label)) = stem.split_once(SEPARATOR_USER) {
            (Namespace::User(check_label(name)?), check_label(label)?)
        } else if let Some((name, label)) = stem.split_once(SEPARATOR_ORGANIZATION_FILENAME) {
            (
                Namespace::Organization(check_label(name)?),
                check_label(label)?,
            )
        } else {
            (Namespace::None, check_label(stem)?)
        };

        Ok(Self::space(namespace, space))
    }
}

impl Display for Selector {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        if let Some(item) = &self.item {
            write!(fmt, "{}{}", item, SEPARATOR_ITEM)?;
        }

        match &self.namespace {
            Namespace::None => write!(fmt, "{}", self.space),
            Namespace::User(name) => {
                write!(fmt, "{}{}{}", name, SEPARATOR_USER, self.space)
            }
            Namespace::Organization(name) => {
                write!(fmt, "{}{}{}", name, SEPARATOR_ORGANIZATION, self.space)
            }
        }
    }
}

/// Whether a label is usable as one part of a selector.
///
/// Labels are restricted to lowercase letters, digits, and hyphens, so no
/// label can ever contain a separator character.
pub fn valid_label(label: impl AsRef<str>) -> bool {
    let label = label.as_ref();
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_label(label: &str) -> Result<String> {
    if !valid_label(label) {
        return Err(ParseError::InvalidLabel {
            label: label.into(),
        });
    }

    Ok(label.into())
}

/// Selector parsing error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input was empty.
    #[error("selector is empty")]
    Empty,

    /// A label part was empty or carried a disallowed character.
    #[error("invalid label {label:?}: only lowercase letters, digits, and hyphens are allowed")]
    InvalidLabel { label: String },

    /// Selector has no space part where one is required.
    #[error("selector {input:?} does not address a space")]
    MissingSpace { input: String },

    /// Selector has no item part where one is required.
    #[error("selector {input:?} does not address a command")]
    MissingItem { input: String },

    /// Selector has no namespace part where one is required.
    #[error("selector {input:?} does not carry a user or organization namespace")]
    MissingNamespace { input: String },
}

/// Friendly result alias :3
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("shell", Namespace::None, "shell", None; "bare space")]
    #[test_case("awkless:shell", Namespace::User("awkless".into()), "shell", None; "user space")]
    #[test_case("dplabs/shell", Namespace::Organization("dplabs".into()), "shell", None; "organization space")]
    #[test_case("deploy@shell", Namespace::None, "shell", Some("deploy"); "bare command")]
    #[test_case("deploy@awkless:shell", Namespace::User("awkless".into()), "shell", Some("deploy"); "user command")]
    #[test_case("deploy@dplabs/shell", Namespace::Organization("dplabs".into()), "shell", Some("deploy"); "organization command")]
    #[test]
    fn parse_canonical_form(input: &str, namespace: Namespace, space: &str, item: Option<&str>) {
        let result = Selector::parse(input).unwrap();
        let expect = Selector {
            namespace,
            space: space.into(),
            item: item.map(Into::into),
        };
        assert_eq!(result, expect);
    }

    #[test_case("shell"; "bare space")]
    #[test_case("awkless:shell"; "user space")]
    #[test_case("dplabs/shell"; "organization space")]
    #[test_case("deploy@shell"; "bare command")]
    #[test_case("deploy@awkless:shell"; "user command")]
    #[test_case("deploy@dplabs/shell"; "organization command")]
    #[test]
    fn parse_round_trips_display(input: &str) {
        let selector = Selector::parse(input).unwrap();
        assert_eq!(selector.to_string(), input);
        assert_eq!(Selector::parse(selector.to_string()).unwrap(), selector);
    }

    #[test_case(""; "empty input")]
    #[test_case("Shell"; "uppercase label")]
    #[test_case("my shell"; "whitespace in label")]
    #[test_case("@shell"; "empty item")]
    #[test_case("deploy@"; "empty space")]
    #[test_case(":shell"; "empty user namespace")]
    #[test_case("a:b:c"; "duplicated user separator")]
    #[test_case("a@b@c"; "duplicated item separator")]
    #[test_case("a:b/c"; "mixed separators")]
    #[test]
    fn parse_rejects_malformed_input(input: &str) {
        assert!(Selector::parse(input).is_err());
    }

    #[test]
    fn parse_mandatory_item_rejects_space_selector() {
        assert_eq!(
            Selector::parse_mandatory_item("awkless:shell"),
            Err(ParseError::MissingItem {
                input: "awkless:shell".into()
            })
        );
    }

    #[test]
    fn parse_remote_rejects_bare_selector() {
        assert_eq!(
            Selector::parse_remote("shell"),
            Err(ParseError::MissingNamespace {
                input: "shell".into()
            })
        );
    }

    #[test_case(Namespace::None, "shell", "shell"; "bare space")]
    #[test_case(Namespace::User("awkless".into()), "shell", "awkless:shell"; "user space")]
    #[test_case(Namespace::Organization("dplabs".into()), "shell", "dplabs=shell"; "organization space")]
    #[test]
    fn filename_round_trips_stem_decoding(namespace: Namespace, label: &str, stem: &str) {
        let selector = Selector::space(namespace, label);
        assert_eq!(selector.filename(), stem);
        assert_eq!(Selector::from_filename_stem(stem).unwrap(), selector);
    }

    #[test]
    fn filename_ignores_item_part() {
        let selector = Selector::command(Namespace::User("awkless".into()), "shell", "deploy");
        assert_eq!(selector.filename(), "awkless:shell");
    }

    #[test]
    fn space_level_strips_item() {
        let selector = Selector::command(Namespace::None, "shell", "deploy");
        assert_eq!(
            selector.space_level(),
            Selector::space(Namespace::None, "shell")
        );
    }
}
