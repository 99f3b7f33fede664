//! Pure view derivation: filter -> sort -> paginate -> format.
//!
//! Nothing in here touches the record store, the clock, or the terminal.
//! Same records and same [`ViewState`] always produce the same [`PageView`].

use serde::Serialize;
use std::cmp::Ordering;

use crate::filter::{compile_filter, is_empty, pnode_matches};
use crate::types::{PNode, SortKey, ViewState};
use crate::util_text::{
    finite_or_zero, format_commission, format_last_seen, format_performance, format_stake,
    performance_percent, short_key,
};

/// Rows per table page
pub const PAGE_SIZE: usize = 10;

/// How many entries the top performers list shows
pub const TOP_PERFORMERS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub rows: Vec<&'a PNode>,
    pub total_matching: usize,
    pub total_pages: usize,
    /// Page actually shown after clamping the requested one
    pub page: usize,
}

/// Filter, sort and cut one page out of `records`.
pub fn derive_view<'a>(records: &'a [PNode], view: &ViewState) -> PageView<'a> {
    let f = compile_filter(view);
    let mut matching: Vec<&PNode> = if is_empty(&f) {
        records.iter().collect()
    } else {
        records.iter().filter(|p| pnode_matches(p, &f)).collect()
    };
    sort_pnodes(&mut matching, view.sort);

    let total_matching = matching.len();
    let total_pages = total_pages(total_matching);
    let page = clamp_page(view.page, total_pages);
    let rows = matching
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    PageView {
        rows,
        total_matching,
        total_pages,
        page,
    }
}

/// Never less than one page, even with nothing to show
pub fn total_pages(total_matching: usize) -> usize {
    total_matching.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Stable sort; equal keys keep their input order.
pub fn sort_pnodes(rows: &mut [&PNode], key: SortKey) {
    match key {
        SortKey::Stake => rows.sort_by(|a, b| desc(a.stake, b.stake)),
        SortKey::Performance => rows.sort_by(|a, b| desc(a.performance_score, b.performance_score)),
        SortKey::Commission => {
            rows.sort_by(|a, b| asc(a.commission_percent, b.commission_percent))
        }
    }
}

fn asc(a: f64, b: f64) -> Ordering {
    finite_or_zero(a).total_cmp(&finite_or_zero(b))
}

fn desc(a: f64, b: f64) -> Ordering {
    asc(b, a)
}

/// Highest performance first, at most [`TOP_PERFORMERS`] entries
pub fn top_performers(records: &[PNode]) -> Vec<&PNode> {
    let mut all: Vec<&PNode> = records.iter().collect();
    sort_pnodes(&mut all, SortKey::Performance);
    all.truncate(TOP_PERFORMERS);
    all
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerfTier {
    High,
    Medium,
    Low,
}

impl PerfTier {
    pub fn from_percent(pct: u32) -> Self {
        if pct >= 90 {
            PerfTier::High
        } else if pct >= 70 {
            PerfTier::Medium
        } else {
            PerfTier::Low
        }
    }
}

/// One table row with every cell already rendered to text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRow {
    pub public_key: String,
    pub short_key: String,
    pub status: &'static str,
    pub is_active: bool,
    pub ip: String,
    pub data_center: String,
    pub stake: String,
    pub commission: String,
    pub performance: String,
    pub performance_pct: u32,
    pub tier: PerfTier,
    pub version: String,
    pub last_seen: String,
}

pub fn format_row(p: &PNode) -> FormattedRow {
    let pct = performance_percent(p.performance_score);
    FormattedRow {
        public_key: p.public_key.clone(),
        short_key: short_key(&p.public_key),
        status: if p.is_active { "Active" } else { "Inactive" },
        is_active: p.is_active,
        ip: if p.ip_address.is_empty() {
            "Unknown".to_string()
        } else {
            p.ip_address.clone()
        },
        data_center: p
            .data_center
            .clone()
            .filter(|dc| !dc.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        stake: format_stake(p.stake),
        commission: format_commission(p.commission_percent),
        performance: format_performance(p.performance_score),
        performance_pct: pct,
        tier: PerfTier::from_percent(pct),
        version: if p.version.is_empty() {
            "v1.0.0".to_string()
        } else {
            format!("v{}", p.version)
        },
        last_seen: format_last_seen(p.last_seen.as_deref()),
    }
}

impl PageView<'_> {
    pub fn formatted(&self) -> Vec<FormattedRow> {
        self.rows.iter().map(|p| format_row(p)).collect()
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }

    pub fn count_label(&self) -> String {
        format!(
            "Showing {} of {} pNodes",
            self.rows.len(),
            self.total_matching
        )
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: usize) -> PNode {
        PNode {
            public_key: format!("key{i:02}"),
            ip_address: format!("10.0.0.{i}"),
            stake: (100 - i) as f64,
            commission_percent: i as f64 % 4.0,
            performance_score: (i % 3) as f64 / 3.0,
            is_active: i % 2 == 0,
            version: "1.2.0".into(),
            ..Default::default()
        }
    }

    fn nodes(n: usize) -> Vec<PNode> {
        (1..=n).map(node).collect()
    }

    fn view(page: usize) -> ViewState {
        ViewState {
            page,
            ..Default::default()
        }
    }

    #[test]
    fn test_second_page_of_fifteen() {
        let records = nodes(15);
        let v = derive_view(&records, &view(2));
        assert_eq!(v.total_matching, 15);
        assert_eq!(v.total_pages, 2);
        assert_eq!(v.page, 2);
        let keys: Vec<&str> = v.rows.iter().map(|p| p.public_key.as_str()).collect();
        assert_eq!(keys, vec!["key11", "key12", "key13", "key14", "key15"]);
    }

    #[test]
    fn test_empty_records() {
        let v = derive_view(&[], &ViewState::default());
        assert!(v.rows.is_empty());
        assert_eq!(v.total_matching, 0);
        assert_eq!(v.total_pages, 1);
        assert_eq!(v.page, 1);
        assert_eq!(v.page_label(), "Page 1 of 1");
        assert!(!v.has_prev() && !v.has_next());
    }

    #[test]
    fn test_page_past_end_clamps() {
        let records = nodes(15);
        let v = derive_view(&records, &view(9));
        assert_eq!(v.page, 2);
        assert_eq!(v.rows.len(), 5);
        let v = derive_view(&records, &view(0));
        assert_eq!(v.page, 1);
    }

    #[test]
    fn test_sort_directions() {
        let records = vec![
            PNode { public_key: "a".into(), stake: 5.0, performance_score: 0.2, commission_percent: 3.0, ..Default::default() },
            PNode { public_key: "b".into(), stake: 9.0, performance_score: 0.9, commission_percent: 1.0, ..Default::default() },
            PNode { public_key: "c".into(), stake: 1.0, performance_score: 0.5, commission_percent: 2.0, ..Default::default() },
        ];
        let keys = |sort| {
            let v = derive_view(&records, &ViewState { sort, ..Default::default() });
            v.rows.iter().map(|p| p.public_key.clone()).collect::<Vec<_>>()
        };
        assert_eq!(keys(SortKey::Stake), ["b", "a", "c"]);
        assert_eq!(keys(SortKey::Performance), ["b", "c", "a"]);
        assert_eq!(keys(SortKey::Commission), ["b", "c", "a"]);
    }

    #[test]
    fn test_sort_is_stable_for_every_key() {
        // Lots of ties: 40 records over 4 distinct values per key
        let records: Vec<PNode> = (0..40)
            .map(|i| PNode {
                public_key: format!("k{i}"),
                stake: (i % 4) as f64,
                performance_score: (i % 4) as f64 / 4.0,
                commission_percent: (i % 4) as f64,
                ..Default::default()
            })
            .collect();
        let index = |p: &PNode| records.iter().position(|r| r.public_key == p.public_key).unwrap();

        for key in [SortKey::Stake, SortKey::Performance, SortKey::Commission] {
            let mut rows: Vec<&PNode> = records.iter().collect();
            sort_pnodes(&mut rows, key);
            for pair in rows.windows(2) {
                let same = match key {
                    SortKey::Stake => pair[0].stake == pair[1].stake,
                    SortKey::Performance => pair[0].performance_score == pair[1].performance_score,
                    SortKey::Commission => pair[0].commission_percent == pair[1].commission_percent,
                };
                if same {
                    assert!(index(pair[0]) < index(pair[1]), "{key:?} reordered ties");
                }
            }
        }
    }

    #[test]
    fn test_nan_sorts_as_zero() {
        let records = vec![
            PNode { public_key: "nan".into(), stake: f64::NAN, ..Default::default() },
            PNode { public_key: "one".into(), stake: 1.0, ..Default::default() },
            PNode { public_key: "zero".into(), stake: 0.0, ..Default::default() },
        ];
        let v = derive_view(&records, &ViewState::default());
        let keys: Vec<&str> = v.rows.iter().map(|p| p.public_key.as_str()).collect();
        assert_eq!(keys, ["one", "nan", "zero"]);
    }

    #[test]
    fn test_bounds_and_monotonic_active_filter() {
        for n in [0, 1, 9, 10, 11, 37] {
            let records = nodes(n);
            for page in 1..=5 {
                for search in ["", "key1", "10.0.0.3", "nothing"] {
                    let base = ViewState { search: search.into(), page, ..Default::default() };
                    let all = derive_view(&records, &base);
                    assert!(all.rows.len() <= PAGE_SIZE);
                    assert!(all.rows.len() <= all.total_matching);

                    let active = derive_view(&records, &ViewState { active_only: true, ..base.clone() });
                    assert!(active.total_matching <= all.total_matching);
                    assert!(active.rows.iter().all(|p| p.is_active));
                }
            }
        }
    }

    #[test]
    fn test_derive_view_is_idempotent() {
        let records = nodes(23);
        let v = ViewState { search: "key".into(), active_only: true, sort: SortKey::Commission, page: 2 };
        assert_eq!(derive_view(&records, &v), derive_view(&records, &v));
    }

    #[test]
    fn test_format_row_defaults() {
        let row = format_row(&PNode { public_key: "k".into(), ..Default::default() });
        assert_eq!(row.ip, "Unknown");
        assert_eq!(row.data_center, "Unknown");
        assert_eq!(row.version, "v1.0.0");
        assert_eq!(row.stake, "0");
        assert_eq!(row.status, "Inactive");
        assert_eq!(row.tier, PerfTier::Low);
        assert_eq!(row.last_seen, crate::util_text::JUST_NOW);
    }

    #[test]
    fn test_top_performers() {
        let records = nodes(12);
        let top = top_performers(&records);
        assert_eq!(top.len(), TOP_PERFORMERS);
        assert!(top.windows(2).all(|w| w[0].performance_score >= w[1].performance_score));
    }
}
