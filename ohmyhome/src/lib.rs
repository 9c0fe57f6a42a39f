//! Optimistic settings sync for the OhMyHome control panel
//!
//! Changes made through [`SyncController::apply`] are visible immediately in the
//! [`SettingCache`] and written to a [`Store`], then committed to a remote
//! [`Authority`]. A rejected commit rolls both back and is reported to every
//! [`SyncController::on_sync_error`] listener.

use ohmyhome_common::{OutOfDomain, ParseError, Setting};

pub mod authority;
pub mod cache;
pub mod log;
pub mod store;
pub mod sync;

pub use ohmyhome_common as common;

pub use self::{
    authority::{Authority, CommitFailed},
    cache::SettingCache,
    store::{Store, StoreError},
    sync::{Commit, CommitOutcome, PendingCommit, SyncConfig, SyncController, SyncFailed},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    OutOfDomain(#[from] OutOfDomain),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0} cannot be toggled")]
    NotToggleable(Setting),
    #[error("settings store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}
