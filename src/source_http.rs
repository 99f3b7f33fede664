use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::FetchError;
use crate::source::PnodeSource;
use crate::types::{Network, NetworkInfo, PNode, PNodeList, Summary};

/// Stats service over HTTP.
///
/// Endpoints (all `GET`, all take `?network=`):
/// - `/pnodes/stats/summary`
/// - `/pnodes?limit=N`
/// - `/pnodes/network/info`
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Network(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        log::debug!("[http] GET {url}");

        let res = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::warn!("[http] {url} -> {status}");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.text().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_ms)
        } else {
            FetchError::from(e)
        }
    }
}

#[async_trait]
impl PnodeSource for HttpSource {
    async fn fetch_summary(&self, network: Network) -> Result<Summary, FetchError> {
        self.get_json(format!(
            "{}/pnodes/stats/summary?network={network}",
            self.base_url
        ))
        .await
    }

    async fn fetch_pnodes(&self, network: Network, limit: usize) -> Result<Vec<PNode>, FetchError> {
        let list: PNodeList = self
            .get_json(format!(
                "{}/pnodes?network={network}&limit={limit}",
                self.base_url
            ))
            .await?;
        Ok(list.pnodes)
    }

    async fn fetch_network_info(&self, network: Network) -> Result<NetworkInfo, FetchError> {
        self.get_json(format!(
            "{}/pnodes/network/info?network={network}",
            self.base_url
        ))
        .await
    }
}
