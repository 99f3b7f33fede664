use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Backing data source selected in the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
    Demo,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Testnet, Network::Mainnet, Network::Demo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Demo => "demo",
        }
    }

    /// Capitalized name used in notifications ("Testnet data loaded...")
    pub fn title(&self) -> &'static str {
        match self {
            Network::Testnet => "Testnet",
            Network::Mainnet => "Mainnet",
            Network::Demo => "Demo",
        }
    }

    /// Live networks fall back to demo on failure; demo has nowhere to go.
    pub fn is_live(&self) -> bool {
        !matches!(self, Network::Demo)
    }

    /// Next entry in selector order (testnet -> mainnet -> demo -> testnet)
    pub fn next(&self) -> Network {
        match self {
            Network::Testnet => Network::Mainnet,
            Network::Mainnet => Network::Demo,
            Network::Demo => Network::Testnet,
        }
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            Network::Testnet => "Connected to Xandeum Testnet",
            Network::Mainnet => "Connected to Xandeum Mainnet",
            Network::Demo => "Using Demo Data",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "testnet" | "test" => Ok(Network::Testnet),
            "mainnet" | "main" => Ok(Network::Mainnet),
            "demo" => Ok(Network::Demo),
            _ => Err(anyhow!(
                "Invalid network '{s}'. Valid options: testnet, mainnet, demo"
            )),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort options offered by the table header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Stake,
    Performance,
    Commission,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Stake => "stake",
            SortKey::Performance => "performance",
            SortKey::Commission => "commission",
        }
    }

    pub fn next(&self) -> SortKey {
        match self {
            SortKey::Stake => SortKey::Performance,
            SortKey::Performance => SortKey::Commission,
            SortKey::Commission => SortKey::Stake,
        }
    }
}

/// One pnode as reported by the stats service.
///
/// Wire names follow the service (`pubkey`, `ip`, `commission`, ...), with
/// camelCase aliases accepted. Numeric fields that are missing, null, or
/// non-numeric decode to `0` so a sloppy payload never poisons sorting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PNode {
    #[serde(rename = "pubkey", alias = "publicKey", default, deserialize_with = "lenient_string")]
    pub public_key: String,
    #[serde(rename = "ip", alias = "ipAddress", default, deserialize_with = "lenient_string")]
    pub ip_address: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stake: f64,
    #[serde(rename = "commission", alias = "commissionPercent", default, deserialize_with = "lenient_f64")]
    pub commission_percent: f64,
    #[serde(alias = "performanceScore", default, deserialize_with = "lenient_f64")]
    pub performance_score: f64,
    #[serde(alias = "isActive", default, deserialize_with = "lenient_bool")]
    pub is_active: bool,
    #[serde(
        alias = "dataCenter",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_center: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(
        alias = "lastSeen",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<String>,
}

/// Aggregate statistics computed server-side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(alias = "totalRecords", default, deserialize_with = "lenient_u64")]
    pub total_pnodes: u64,
    #[serde(alias = "activeRecords", default, deserialize_with = "lenient_u64")]
    pub active_pnodes: u64,
    #[serde(alias = "totalStake", default, deserialize_with = "lenient_f64")]
    pub total_stake: f64,
    #[serde(alias = "avgCommissionPercent", default, deserialize_with = "lenient_f64")]
    pub avg_commission: f64,
    #[serde(alias = "avgPerformance", default, deserialize_with = "lenient_f64")]
    pub avg_performance: f64,
    #[serde(default, deserialize_with = "lenient_opt_u64", skip_serializing_if = "Option::is_none")]
    pub inactive_pnodes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64", skip_serializing_if = "Option::is_none")]
    pub high_performers: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64", skip_serializing_if = "Option::is_none")]
    pub low_commission_nodes: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub epoch: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub slot: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_version: Option<String>,
}

/// Body of the pnode list endpoint. Older deployments call the list `records`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PNodeList {
    #[serde(alias = "records", default)]
    pub pnodes: Vec<PNode>,
}

/// Everything one successful sync cycle brings back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fetched {
    pub summary: Summary,
    pub pnodes: Vec<PNode>,
    pub info: NetworkInfo,
}

/// UI-owned controls that drive view derivation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub search: String,
    pub active_only: bool,
    pub sort: SortKey,
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            active_only: false,
            sort: SortKey::Stake,
            page: 1,
        }
    }
}

/// Everything the driver loop reacts to
#[derive(Debug)]
pub enum AppEvent {
    /// Auto-refresh interval elapsed
    Tick,
    Fetched {
        ticket: crate::sync::FetchTicket,
        result: Result<Fetched, crate::error::FetchError>,
    },
    NoticeExpired(crate::notify::NoticeId),
    Action(crate::ui_snapshot::UiAction),
    Quit,
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if n.is_finite() { n } else { 0.0 })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "active"),
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Scalars become their text form; null, arrays and objects become `None`
fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::Null => None,
        other => Some(lenient_u64(other).unwrap_or(0)),
    })
}
