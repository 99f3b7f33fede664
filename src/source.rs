use async_trait::async_trait;
use tokio::time::Duration;

use crate::error::FetchError;
use crate::types::{Fetched, Network, NetworkInfo, PNode, Summary};

/// Read side of the stats service, one call per endpoint.
///
/// All three calls are idempotent and parameterized by the network being
/// viewed. Implementations must not retry on their own; the sync
/// controller decides what a failure means.
#[async_trait]
pub trait PnodeSource: Send + Sync {
    async fn fetch_summary(&self, network: Network) -> Result<Summary, FetchError>;

    /// At most `limit` pnodes
    async fn fetch_pnodes(&self, network: Network, limit: usize) -> Result<Vec<PNode>, FetchError>;

    async fn fetch_network_info(&self, network: Network) -> Result<NetworkInfo, FetchError>;
}

/// Run one sync cycle against `source`, bounded by `timeout`.
///
/// Summary and pnode list are both required. Network info is best effort:
/// when it fails, epoch and slot read as zero.
pub async fn fetch_cycle(
    source: &dyn PnodeSource,
    network: Network,
    limit: usize,
    timeout: Duration,
) -> Result<Fetched, FetchError> {
    let work = async {
        let (summary, pnodes) = futures::try_join!(
            source.fetch_summary(network),
            source.fetch_pnodes(network, limit)
        )?;

        let info = match source.fetch_network_info(network).await {
            Ok(info) => info,
            Err(e) => {
                log::warn!("[source] network info for {network} unavailable: {e}");
                NetworkInfo::default()
            }
        };

        Ok::<_, FetchError>(Fetched {
            summary,
            pnodes,
            info,
        })
    };

    match tokio::time::timeout(timeout, work).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!(
                "[source] {network} sync cycle exceeded {}ms",
                timeout.as_millis()
            );
            Err(FetchError::Timeout(timeout.as_millis() as u64))
        }
    }
}
