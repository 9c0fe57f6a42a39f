//! The remote service that confirms or rejects setting changes
//!
//! Commits are never retried here. A failed commit is final for that attempt,
//! since the service does not promise idempotent handling of repeats.

use core::future::Future;
use std::sync::Arc;

use ohmyhome_common::{Setting, SettingValue};

mod http;
mod mock;

pub use self::{
    http::{HttpAuthority, HttpConfig},
    mock::MockAuthority,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("commit failed: {reason}")]
pub struct CommitFailed {
    /// Status code or transport error text
    pub reason: String,
}

impl CommitFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

pub trait Authority: Send + Sync + 'static {
    fn commit(
        &self,
        setting: Setting,
        value: SettingValue,
    ) -> impl Future<Output = Result<(), CommitFailed>> + Send;
}

impl<A: Authority> Authority for Arc<A> {
    fn commit(
        &self,
        setting: Setting,
        value: SettingValue,
    ) -> impl Future<Output = Result<(), CommitFailed>> + Send {
        (**self).commit(setting, value)
    }
}
