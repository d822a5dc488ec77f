use crate::options::CouchOptions;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use panel_core::{MappingSource, PanelError, Result, RoomConfigSource};
use panel_types::{MappingRecord, RoomDocument};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

/// CouchDB 错误响应体
#[derive(Debug, Default, Deserialize)]
struct CouchErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// CouchDB 文档客户端
///
/// 通过 HTTP 读取主机名映射和房间配置文档。
#[derive(Clone)]
pub struct CouchClient {
    client: Client,
    base_url: Url,
    options: CouchOptions,
}

impl CouchClient {
    /// 创建指向 `address` 的客户端
    pub fn new(address: &str, options: CouchOptions) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .context("unable to build http client")?;

        Self::with_client(client, address, options)
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_client(client: Client, address: &str, options: CouchOptions) -> anyhow::Result<Self> {
        let base_url = Url::parse(address).with_context(|| format!("invalid couchdb address {:?}", address))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("couchdb address {:?} cannot be used as a base url", address));
        }

        info!(
            mapping_db = %options.mapping_db,
            ui_config_db = %options.ui_config_db,
            "CouchDB client created"
        );

        Ok(Self {
            client,
            base_url,
            options,
        })
    }

    pub fn options(&self) -> &CouchOptions {
        &self.options
    }

    /// 检查 CouchDB 是否可用
    pub async fn ping(&self) -> Result<()> {
        let url = self.url_for(&["_up"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PanelError::backend(format!("unable to reach couchdb: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::backend(format!("couchdb is not up: {}", status)));
        }

        debug!("CouchDB is up");
        Ok(())
    }

    /// 获取并解码文档
    async fn get_document<T: DeserializeOwned>(&self, db: &str, id: &str) -> Result<T> {
        let url = self.url_for(&[db, id])?;
        debug!(db = %db, id = %id, "Fetching document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PanelError::backend(format!("unable to make request: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| PanelError::backend(format!("unable to read response: {}", e.without_url())))?;

        if status == StatusCode::NOT_FOUND {
            return Err(PanelError::not_found(describe(status, &body)));
        }

        if !status.is_success() {
            return Err(PanelError::backend(describe(status, &body)));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// 在 base url 后追加路径段，每段单独做百分号编码
    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PanelError::backend("couchdb address cannot be a base url"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn describe(status: StatusCode, body: &[u8]) -> String {
    let parsed: CouchErrorBody = serde_json::from_slice(body).unwrap_or_default();
    match (parsed.error.is_empty(), parsed.reason.is_empty()) {
        (true, true) => status.to_string(),
        (false, true) => format!("{}: {}", status, parsed.error),
        (true, false) => format!("{}: {}", status, parsed.reason),
        (false, false) => format!("{}: {} ({})", status, parsed.error, parsed.reason),
    }
}

#[async_trait]
impl MappingSource for CouchClient {
    async fn mapping(&self, hostname: &str) -> Result<MappingRecord> {
        self.get_document(&self.options.mapping_db, hostname).await
    }
}

#[async_trait]
impl RoomConfigSource for CouchClient {
    async fn room_document(&self, room: &str) -> Result<RoomDocument> {
        self.get_document(&self.options.ui_config_db, room).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_address() {
        assert!(CouchClient::new("bad host", CouchOptions::default()).is_err());
        assert!(CouchClient::new("mailto:couch@example.com", CouchOptions::default()).is_err());
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let client = CouchClient::new("http://couch.example:5984/", CouchOptions::default()).unwrap();
        let url = client.url_for(&["pc-mapping", "ROOM 1/PANEL"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://couch.example:5984/pc-mapping/ROOM%201%2FPANEL"
        );

        let client = CouchClient::new("https://couch.example/db-proxy", CouchOptions::default()).unwrap();
        let url = client.url_for(&["ui-configuration", "ITB-1101"]).unwrap();
        assert_eq!(url.as_str(), "https://couch.example/db-proxy/ui-configuration/ITB-1101");
    }

    #[test]
    fn test_describe_error_body() {
        let body = br#"{"error":"not_found","reason":"missing"}"#;
        assert_eq!(
            describe(StatusCode::NOT_FOUND, body),
            "404 Not Found: not_found (missing)"
        );
        assert_eq!(describe(StatusCode::BAD_GATEWAY, b"<html>"), "502 Bad Gateway");
    }
}
