//! HTTP source tests against a local mock of the stats service

use anyhow::Result;
use mockito::{Matcher, Server};
use tokio::time::Duration;

use pnodex::error::FetchError;
use pnodex::source::{fetch_cycle, PnodeSource};
use pnodex::types::Network;
use pnodex::HttpSource;

fn network_query(network: &str) -> Matcher {
    Matcher::UrlEncoded("network".into(), network.into())
}

#[tokio::test]
async fn test_full_cycle_parses_payloads() -> Result<()> {
    let mut server = Server::new_async().await;

    let summary = server
        .mock("GET", "/pnodes/stats/summary")
        .match_query(network_query("testnet"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"total_pnodes": 2, "active_pnodes": 1, "total_stake": 1500000,
                "avg_commission": 5.5, "avg_performance": 0.87}"#,
        )
        .create_async()
        .await;
    let list = server
        .mock("GET", "/pnodes")
        .match_query(Matcher::AllOf(vec![
            network_query("testnet"),
            Matcher::UrlEncoded("limit".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"pnodes": [
                {"pubkey": "A1", "ip": "10.0.0.1", "stake": 1000000, "commission": 5,
                 "performance_score": 0.95, "is_active": true, "data_center": "fra1",
                 "version": "1.2.0", "last_seen": "2025-01-01T12:00:00Z"},
                {"pubkey": "B2", "ip": null, "stake": "oops", "is_active": false}
            ]}"#,
        )
        .create_async()
        .await;
    let info = server
        .mock("GET", "/pnodes/network/info")
        .match_query(network_query("testnet"))
        .with_status(200)
        .with_body(r#"{"epoch": 612, "slot": 264000123}"#)
        .create_async()
        .await;

    let source = HttpSource::new(&server.url(), 5_000)?;
    let fetched = fetch_cycle(&source, Network::Testnet, 100, Duration::from_secs(5)).await?;

    summary.assert_async().await;
    list.assert_async().await;
    info.assert_async().await;

    assert_eq!(fetched.summary.total_pnodes, 2);
    assert_eq!(fetched.summary.avg_performance, 0.87);
    assert_eq!(fetched.pnodes.len(), 2);
    assert_eq!(fetched.pnodes[0].public_key, "A1");
    assert_eq!(fetched.pnodes[0].data_center.as_deref(), Some("fra1"));
    assert_eq!(fetched.pnodes[1].ip_address, "");
    assert_eq!(fetched.pnodes[1].stake, 0.0);
    assert_eq!(fetched.info.epoch, 612);
    assert_eq!(fetched.info.slot, 264_000_123);
    Ok(())
}

#[tokio::test]
async fn test_network_info_failure_is_tolerated() -> Result<()> {
    let mut server = Server::new_async().await;

    let _summary = server
        .mock("GET", "/pnodes/stats/summary")
        .match_query(network_query("mainnet"))
        .with_status(200)
        .with_body(r#"{"total_pnodes": 0}"#)
        .create_async()
        .await;
    let _list = server
        .mock("GET", "/pnodes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"pnodes": []}"#)
        .create_async()
        .await;
    let _info = server
        .mock("GET", "/pnodes/network/info")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let source = HttpSource::new(&server.url(), 5_000)?;
    let fetched = fetch_cycle(&source, Network::Mainnet, 100, Duration::from_secs(5)).await?;

    assert!(fetched.pnodes.is_empty());
    assert_eq!(fetched.info.epoch, 0);
    assert_eq!(fetched.info.slot, 0);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_reported() -> Result<()> {
    let mut server = Server::new_async().await;

    let _summary = server
        .mock("GET", "/pnodes/stats/summary")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let source = HttpSource::new(&server.url(), 5_000)?;
    let err = source.fetch_summary(Network::Testnet).await.unwrap_err();

    assert_eq!(
        err,
        FetchError::Status {
            status: 503,
            body: "maintenance".into()
        }
    );
    assert!(!err.is_network());
    Ok(())
}

#[tokio::test]
async fn test_bad_json_is_malformed() -> Result<()> {
    let mut server = Server::new_async().await;

    let _list = server
        .mock("GET", "/pnodes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let source = HttpSource::new(&format!("{}/", server.url()), 5_000)?;
    let err = source
        .fetch_pnodes(Network::Testnet, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Malformed(_)));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() -> Result<()> {
    // Nothing listens on port 9 (discard) in the test environment
    let source = HttpSource::new("http://127.0.0.1:9", 2_000)?;
    let err = source.fetch_summary(Network::Testnet).await.unwrap_err();

    assert!(err.is_network(), "got {err:?}");
    Ok(())
}

#[test]
fn test_base_url_trailing_slash_trimmed() -> Result<()> {
    let source = HttpSource::new("http://localhost:8000///", 1_000)?;
    assert_eq!(source.base_url(), "http://localhost:8000");
    Ok(())
}
