use anyhow::{anyhow, Result};
use clap::Parser;
use tokio::time::Duration;

use crate::driver::SyncSettings;
use crate::types::Network;

/// pnodex - pNode network dashboard
///
/// Polls the pNode stats service and shows a filterable, sortable table
/// with live notifications.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "pnodex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "pNode network dashboard", long_about = None)]
pub struct CliArgs {
    /// Base URL of the pNode stats service
    #[arg(long, env = "API_BASE")]
    pub api_base: Option<String>,

    /// Network to start on: testnet, mainnet or demo
    #[arg(short, long, env = "NETWORK")]
    pub network: Option<Network>,

    /// Auto-refresh interval in milliseconds (1000-600000)
    #[arg(long, env = "REFRESH_INTERVAL_MS")]
    pub refresh_interval_ms: Option<u64>,

    /// Timeout for one whole sync cycle in milliseconds (1000-60000)
    #[arg(long, env = "FETCH_TIMEOUT_MS")]
    pub fetch_timeout_ms: Option<u64>,

    /// How long notifications stay up in milliseconds (500-60000)
    #[arg(long, env = "NOTICE_MS")]
    pub notice_ms: Option<u64>,

    /// Maximum pnodes requested per refresh (1-500)
    #[arg(long, env = "PNODE_LIMIT")]
    pub pnode_limit: Option<usize>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Where the terminal UI writes its log
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<String>,

    /// Run one sync cycle, print the UI snapshot as JSON and exit
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub network: Network,
    pub refresh_interval_ms: u64,
    pub fetch_timeout_ms: u64,
    pub notice_ms: u64,
    pub pnode_limit: usize,
    pub render_fps: u32,
    pub log_file: String,
    pub json: bool,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Defaults
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

/// Resolve already-parsed args (clap has applied env fallbacks) against
/// defaults and validate ranges.
pub fn from_args(args: CliArgs) -> Result<Config> {
    let api_base = args
        .api_base
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    validate_url(&api_base, "API_BASE")?;

    let network = args.network.unwrap_or(Network::Testnet);

    let refresh_interval_ms = validate_in_range(
        args.refresh_interval_ms.unwrap_or(30_000),
        1_000,
        600_000,
        "REFRESH_INTERVAL_MS",
    )?;
    let fetch_timeout_ms = validate_in_range(
        args.fetch_timeout_ms.unwrap_or(10_000),
        1_000,
        60_000,
        "FETCH_TIMEOUT_MS",
    )?;
    let notice_ms = validate_in_range(args.notice_ms.unwrap_or(5_000), 500, 60_000, "NOTICE_MS")?;
    let pnode_limit = validate_in_range(args.pnode_limit.unwrap_or(100), 1, 500, "PNODE_LIMIT")?;
    let render_fps = validate_in_range(args.render_fps.unwrap_or(20), 1, 120, "RENDER_FPS")?;

    Ok(Config {
        api_base,
        network,
        refresh_interval_ms,
        fetch_timeout_ms,
        notice_ms,
        pnode_limit,
        render_fps,
        log_file: args.log_file.unwrap_or_else(|| "pnodex.log".to_string()),
        json: args.json,
    })
}

impl Config {
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            pnode_limit: self.pnode_limit,
        }
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    /// Log current configuration (useful for debugging)
    pub fn log_summary(&self) {
        log::info!("pnodex configuration:");
        log::info!("  API base: {}", self.api_base);
        log::info!("  Network: {}", self.network);
        log::info!("  Refresh interval: {}ms", self.refresh_interval_ms);
        log::info!("  Fetch timeout: {}ms", self.fetch_timeout_ms);
        log::info!("  Notice duration: {}ms", self.notice_ms);
        log::info!("  pNode limit: {}", self.pnode_limit);
        log::info!("  Render FPS: {}", self.render_fps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = from_args(CliArgs::default()).unwrap();
        assert_eq!(cfg.api_base, "http://localhost:8000");
        assert_eq!(cfg.network, Network::Testnet);
        assert_eq!(cfg.refresh_interval_ms, 30_000);
        assert_eq!(cfg.fetch_timeout_ms, 10_000);
        assert_eq!(cfg.notice_ms, 5_000);
        assert_eq!(cfg.pnode_limit, 100);
        assert!(!cfg.json);
        assert_eq!(cfg.sync_settings(), SyncSettings::default());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = from_args(CliArgs {
            pnode_limit: Some(501),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("PNODE_LIMIT"));

        assert!(from_args(CliArgs {
            refresh_interval_ms: Some(10),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_bad_url_rejected() {
        let err = from_args(CliArgs {
            api_base: Some("localhost:8000".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::try_parse_from([
            "pnodex",
            "--network",
            "mainnet",
            "--api-base",
            "https://stats.example.org/",
            "--json",
        ])
        .unwrap();
        let cfg = from_args(args).unwrap();
        assert_eq!(cfg.network, Network::Mainnet);
        assert!(cfg.json);
    }
}
