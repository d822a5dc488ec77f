use anyhow::{anyhow, Context};
use async_trait::async_trait;
use panel_core::{KeyIssuer, PanelError, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct KeyResponse {
    #[serde(rename = "ControlKey", default)]
    control_key: String,
}

/// 控制密钥服务客户端
///
/// 未配置地址时不发出请求，直接返回“没有密钥”。
#[derive(Clone)]
pub struct KeyServiceClient {
    endpoint: Option<Url>,
    timeout: Duration,
    client: Client,
}

impl KeyServiceClient {
    pub fn new(address: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = match address.map(str::trim).filter(|a| !a.is_empty()) {
            Some(address) => {
                let url = Url::parse(address)
                    .with_context(|| format!("invalid key service address {:?}", address))?;
                if url.cannot_be_a_base() {
                    return Err(anyhow!("key service address {:?} cannot be used as a base url", address));
                }
                Some(url)
            }
            None => None,
        };

        Ok(Self {
            endpoint,
            timeout,
            client: Client::new(),
        })
    }

    pub fn enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// `{base}/{room} {group}/getControlKey`
    fn key_url(&self, base: &Url, room: &str, group: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| PanelError::backend("key service address cannot be a base url"))?
            .pop_if_empty()
            .push(&format!("{} {}", room, group))
            .push("getControlKey");
        Ok(url)
    }
}

#[async_trait]
impl KeyIssuer for KeyServiceClient {
    async fn control_key(&self, room: &str, group: &str) -> Result<Option<String>> {
        let Some(base) = self.endpoint.as_ref() else {
            return Ok(None);
        };

        let url = self.key_url(base, room, group)?;
        debug!(room = %room, group = %group, "Requesting control key");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PanelError::backend(format!("unable to make request: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::backend(format!("key service returned {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PanelError::backend(format!("unable to read response: {}", e.without_url())))?;

        let key: KeyResponse = serde_json::from_slice(&body)
            .map_err(|e| PanelError::backend(format!("unable to parse response: {}", e)))?;

        Ok(Some(key.control_key).filter(|k| !k.is_empty()))
    }
}
