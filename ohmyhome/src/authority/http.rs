use std::time::Duration;

use ohmyhome_common::{Setting, SettingValue, remote::RemoteRequest};

use super::{Authority, CommitFailed};

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the device-control service, without a trailing slash
    pub base_url: String,
    /// Upper bound for a whole request, `None` to wait forever
    pub timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_owned(),
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Commits changes to the device-control service over HTTP
///
/// Any 2xx answer confirms the change; otherwise the status code becomes the
/// failure reason.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    pub fn new(config: HttpConfig) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Authority for HttpAuthority {
    async fn commit(&self, setting: Setting, value: SettingValue) -> Result<(), CommitFailed> {
        let Some(request) = RemoteRequest::for_change(setting, &value) else {
            return Err(CommitFailed::new(format!("no remote route for {setting}")));
        };

        let url = format!("{}{}", self.base_url, request.path());

        tracing::debug!("POST {url}: {request:?}");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CommitFailed::new(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("{setting} = {value} confirmed ({status})");
            Ok(())
        } else {
            Err(CommitFailed::new(status.as_u16().to_string()))
        }
    }
}
