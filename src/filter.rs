use crate::types::{PNode, ViewState};

/// Search controls lowered once per derivation instead of once per row.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilter {
    pub needle: String,
    pub active_only: bool,
}

pub fn compile_filter(view: &ViewState) -> CompiledFilter {
    CompiledFilter {
        needle: view.search.to_lowercase(),
        active_only: view.active_only,
    }
}

pub fn is_empty(f: &CompiledFilter) -> bool {
    f.needle.is_empty() && !f.active_only
}

/// Search text hits public key, IP, or data center (absent data center
/// never matches); active-only is ANDed on top.
pub fn pnode_matches(p: &PNode, f: &CompiledFilter) -> bool {
    if f.active_only && !p.is_active {
        return false;
    }
    if f.needle.is_empty() {
        return true;
    }

    let hit = |hay: &str| hay.to_lowercase().contains(&f.needle);
    hit(&p.public_key) || hit(&p.ip_address) || p.data_center.as_deref().is_some_and(hit)
}
