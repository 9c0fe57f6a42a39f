use std::time::Duration;

use ohmyhome_common::{Setting, SettingValue, remote::RemoteRequest};

use super::{Authority, CommitFailed};

/// Stands in for the device-control service when there is none
///
/// Waits roughly as long as the real service takes, logs the request it would
/// have sent and then answers with a fixed outcome.
#[derive(Debug, Clone)]
pub struct MockAuthority {
    pub mode_delay: Duration,
    pub system_delay: Duration,
    /// `Some(reason)` makes every commit fail
    pub failure: Option<String>,
}

impl Default for MockAuthority {
    fn default() -> Self {
        Self {
            mode_delay: Duration::from_millis(300),
            system_delay: Duration::from_millis(500),
            failure: None,
        }
    }
}

impl MockAuthority {
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Default::default() }
    }

    pub fn instant() -> Self {
        Self { mode_delay: Duration::ZERO, system_delay: Duration::ZERO, failure: None }
    }

    fn delay(&self, setting: Setting) -> Duration {
        match setting {
            Setting::Mode => self.mode_delay,
            Setting::SystemOn => self.system_delay,
            _ => Duration::ZERO,
        }
    }
}

impl Authority for MockAuthority {
    async fn commit(&self, setting: Setting, value: SettingValue) -> Result<(), CommitFailed> {
        tokio::time::sleep(self.delay(setting)).await;

        match RemoteRequest::for_change(setting, &value) {
            Some(request) => {
                let body = serde_json::to_string(&request).unwrap_or_default();
                tracing::info!("MOCK: POST {} {body}", request.path());
            }
            None => tracing::info!("MOCK: {setting} = {value}"),
        }

        match &self.failure {
            Some(reason) => Err(CommitFailed::new(reason.clone())),
            None => Ok(()),
        }
    }
}
