// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Remote service seam.
//!
//! The synchronization engine talks to the remote snippet service through the
//! [`Remote`] trait, which exchanges the same space and command shapes as the
//! local store. That keeps local and remote data uniform, and keeps the
//! actual transport out of the core. Every call is synchronous and
//! single-attempt. There is no retry layer, and no timeout beyond whatever
//! the transport itself enforces.

use crate::{
    model::{Command, Space},
    selector::Selector,
};

/// Operations the remote snippet service exposes.
pub trait Remote {
    /// Look up a published space's metadata.
    ///
    /// # Errors
    ///
    /// - Return [`RemoteError::NotFound`] if nothing is published under the
    ///   selector.
    /// - Return [`RemoteError::Service`] on any other remote failure.
    fn space_find(&self, selector: &Selector) -> Result<Space>;

    /// Publish a space, replacing whatever was published under its address.
    ///
    /// # Errors
    ///
    /// - Return [`RemoteError::Service`] on any remote failure.
    fn space_publish(&self, space: &Space) -> Result<()>;

    /// Remove a published space from the service.
    ///
    /// # Errors
    ///
    /// - Return [`RemoteError::NotFound`] if nothing is published under the
    ///   selector.
    /// - Return [`RemoteError::Service`] on any other remote failure.
    fn space_unpublish(&self, selector: &Selector) -> Result<()>;

    /// Retrieve the full record of a published space.
    ///
    /// # Errors
    ///
    /// - Return [`RemoteError::NotFound`] if nothing is published under the
    ///   selector.
    /// - Return [`RemoteError::Service`] on any other remote failure.
    fn space_retrieve(&self, selector: &Selector) -> Result<Space>;

    /// List published commands matching the selector.
    ///
    /// A space-level selector matches every command in the space. An item
    /// selector matches commands with that label.
    ///
    /// # Errors
    ///
    /// - Return [`RemoteError::NotFound`] if nothing is published under the
    ///   selector.
    /// - Return [`RemoteError::Service`] on any other remote failure.
    fn command_list(&self, selector: &Selector) -> Result<Vec<Command>>;
}

/// Placeholder service used when no transport is wired in.
///
/// Actual transports plug in through the [`Remote`] trait from outside this
/// crate. Every call fails with a [`RemoteError::Service`] pointing that out.
#[derive(Debug, Default)]
pub struct Disconnected;

impl Disconnected {
    fn unavailable<T>(&self) -> Result<T> {
        Err(RemoteError::Service {
            message: "no remote transport is configured".into(),
        })
    }
}

impl Remote for Disconnected {
    fn space_find(&self, _selector: &Selector) -> Result<Space> {
        self.unavailable()
    }

    fn space_publish(&self, _space: &Space) -> Result<()> {
        self.unavailable()
    }

    fn space_unpublish(&self, _selector: &Selector) -> Result<()> {
        self.unavailable()
    }

    fn space_retrieve(&self, _selector: &Selector) -> Result<Space> {
        self.unavailable()
    }

    fn command_list(&self, _selector: &Selector) -> Result<Vec<Command>> {
        self.unavailable()
    }
}

impl<R> Remote for &R
where
    R: Remote + ?Sized,
{
    fn space_find(&self, selector: &Selector) -> Result<Space> {
        (**self).space_find(selector)
    }

    fn space_publish(&self, space: &Space) -> Result<()> {
        (**self).space_publish(space)
    }

    fn space_unpublish(&self, selector: &Selector) -> Result<()> {
        (**self).space_unpublish(selector)
    }

    fn space_retrieve(&self, selector: &Selector) -> Result<Space> {
        (**self).space_retrieve(selector)
    }

    fn command_list(&self, selector: &Selector) -> Result<Vec<Command>> {
        (**self).command_list(selector)
    }
}

/// Remote service error types.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Nothing is published under the requested selector.
    #[error("'{selector}' not found on the remote service")]
    NotFound { selector: Selector },

    /// The remote service failed in some other way.
    #[error("remote service failure: {message}")]
    Service { message: String },
}

/// Friendly result alias :3
pub type Result<T, E = RemoteError> = std::result::Result<T, E>;
