//! pnodex - pNode network dashboard
//!
//! Headless core for watching a pNode network: an immutable record store,
//! a pure view pipeline (filter, sort, paginate), a sync controller that
//! falls back to demo data when a live network is unreachable, and a
//! single-slot notification queue.
//!
//! ## Architecture
//!
//! - [`app::App`] owns all state and is only mutated from one event loop
//! - [`driver::Driver`] runs that loop and the background timers
//! - [`source::PnodeSource`] is the seam to the stats service
//!   ([`source_http::HttpSource`] in production)
//! - [`ui_snapshot`] is the boundary to renderers: the terminal UI in
//!   [`ui`] or anything that consumes the snapshot as JSON
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin pnodex -- --network testnet
//! cargo run --bin pnodex -- --json
//! ```

pub mod config;
pub mod error;
pub mod types;
pub mod util_text;

pub mod filter;
pub mod store;
pub mod view;

pub mod notify;
pub mod sync;

pub mod app;
pub mod driver;
pub mod ui_snapshot;

pub mod source;
pub mod source_http;

#[cfg(feature = "native")]
pub mod ui;

pub use app::{App, InputMode};
pub use config::Config;
pub use driver::{Driver, SyncSettings};
pub use error::FetchError;
pub use source::PnodeSource;
pub use source_http::HttpSource;
pub use types::{AppEvent, Network, PNode, SortKey, Summary, ViewState};
