//! UI snapshot and action types for renderers
//!
//! This module provides a clean boundary between the headless App core
//! and whatever draws it (the terminal UI, or a DOM frontend fed the
//! snapshot as JSON).

use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::notify::{NoticeId, NoticeKind};
use crate::sync::SyncState;
use crate::types::{Network, SortKey, ViewState};
use crate::util_text::{
    format_avg_commission, format_avg_performance, format_commission, format_total_stake,
    format_uptime_ratio, short_key,
};
use crate::view::{top_performers, FormattedRow};

/// Snapshot of App state for rendering (one-way data flow: Rust → UI)
#[derive(Debug, Clone, Serialize)]
pub struct UiSnapshot {
    pub network: Network,
    pub network_status: &'static str,
    /// A fetch is in flight
    pub syncing: bool,
    /// Local time of the last successful refresh ("14:05:09")
    pub last_updated: Option<String>,
    pub stats: Vec<StatCard>,
    pub epoch: u64,
    pub slot: u64,
    pub controls: ViewState,
    pub table: TablePane,
    pub top_performers: Vec<PerformerRow>,
    /// Transient message, if one is showing
    pub notice: Option<NoticeView>,
    /// Bumps every time the record set is replaced
    pub generation: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TablePane {
    pub rows: Vec<FormattedRow>,
    pub total_matching: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_label: String,
    pub count_label: String,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformerRow {
    pub rank: usize,
    pub short_key: String,
    pub ip: String,
    pub commission: String,
    pub score: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub message: String,
    /// Milliseconds until auto-clear
    pub remaining_ms: u64,
}

/// User actions from the UI (data flow: UI → Rust)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum UiAction {
    // ----- Sync -----
    /// Manual refresh button
    Refresh,
    /// Network selector changed
    SwitchNetwork { network: Network },

    // ----- Table controls -----
    SetSearch { text: String },
    SetActiveOnly { on: bool },
    SetSort { key: SortKey },
    NextPage,
    PrevPage,
    GoToPage { page: usize },

    // ----- Notices -----
    DismissNotice,

    Quit,
}

pub fn build(app: &App) -> UiSnapshot {
    let summary = app.summary();
    let stats = vec![
        StatCard {
            label: "Total pNodes",
            value: summary.total_pnodes.to_string(),
            detail: None,
        },
        StatCard {
            label: "Active pNodes",
            value: summary.active_pnodes.to_string(),
            detail: Some(format_uptime_ratio(summary.active_pnodes, summary.total_pnodes)),
        },
        StatCard {
            label: "Total Stake",
            value: format_total_stake(summary.total_stake),
            detail: None,
        },
        StatCard {
            label: "Avg Commission",
            value: format_avg_commission(summary.avg_commission),
            detail: None,
        },
        StatCard {
            label: "Avg Performance",
            value: format_avg_performance(summary.avg_performance),
            detail: None,
        },
    ];

    let page = app.view();
    let table = TablePane {
        rows: page.formatted(),
        total_matching: page.total_matching,
        total_pages: page.total_pages,
        page: page.page,
        page_label: page.page_label(),
        count_label: page.count_label(),
        has_prev: page.has_prev(),
        has_next: page.has_next(),
    };

    let top = top_performers(app.store().as_slice())
        .into_iter()
        .enumerate()
        .map(|(i, p)| PerformerRow {
            rank: i + 1,
            short_key: short_key(&p.public_key),
            ip: p.ip_address.clone(),
            commission: format_commission(p.commission_percent),
            score: format_avg_performance(p.performance_score),
        })
        .collect();

    UiSnapshot {
        network: app.network(),
        network_status: app.network().status_line(),
        syncing: matches!(app.sync_state(), SyncState::Fetching(_)),
        last_updated: app
            .sync()
            .last_updated()
            .map(|t| t.format("%H:%M:%S").to_string()),
        stats,
        epoch: app.network_info().epoch,
        slot: app.network_info().slot,
        controls: app.view_state().clone(),
        table,
        top_performers: top,
        notice: app.notifier().current().map(|n| NoticeView {
            id: n.id,
            kind: n.kind,
            message: n.message.clone(),
            remaining_ms: n.remaining().as_millis() as u64,
        }),
        generation: app.store().generation(),
    }
}
