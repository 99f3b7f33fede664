//! Fetch cycle state machine.
//!
//! ```text
//!   Idle --begin--> Fetching --complete(Ok)--> Idle (Applied)
//!                       |
//!                       +--complete(Err) on testnet/mainnet --> Fetching(demo) (FellBack)
//!                       +--complete(Err) on demo -------------> Idle (Failed)
//!                       +--complete(_) after a network switch --> Fetching(new) (Superseded)
//! ```
//!
//! At most one fetch is in flight. `begin` while fetching is coalesced into
//! the running one. The controller never does I/O; the driver runs the
//! fetch for a [`FetchTicket`] and hands the result back to [`SyncController::complete`].

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::FetchError;
use crate::types::{Fetched, Network};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Startup,
    Timer,
    Manual,
    NetworkSwitch,
    Fallback,
    /// Re-issue after the selector moved while a fetch was out
    Resync,
}

impl Trigger {
    /// Triggers the user asked for get a "loading" notice
    pub fn is_user_initiated(&self) -> bool {
        matches!(self, Trigger::Startup | Trigger::Manual | Trigger::NetworkSwitch)
    }
}

/// Identifies one fetch. Results are matched back by `id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FetchTicket {
    pub id: u64,
    pub network: Network,
    pub trigger: Trigger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching(FetchTicket),
}

#[derive(Debug, PartialEq)]
pub enum SyncOutcome {
    /// Not the in-flight ticket (already completed or never issued)
    Ignored,
    Applied { network: Network, fetched: Fetched },
    /// Payload dropped because the selector changed mid-flight
    Superseded { next: FetchTicket },
    FellBack {
        from: Network,
        error: FetchError,
        next: FetchTicket,
    },
    /// Demo failed too; nothing left to try
    Failed { network: Network, error: FetchError },
}

#[derive(Debug)]
pub struct SyncController {
    network: Network,
    state: SyncState,
    next_ticket: u64,
    last_updated: Option<DateTime<Local>>,
    last_error: Option<FetchError>,
}

impl SyncController {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            state: SyncState::Idle,
            next_ticket: 1,
            last_updated: None,
            last_error: None,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.state, SyncState::Fetching(_))
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        match self.state {
            SyncState::Fetching(t) => Some(t),
            SyncState::Idle => None,
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Start a fetch against the current network, or `None` if one is
    /// already running.
    pub fn begin(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        if let SyncState::Fetching(running) = self.state {
            log::debug!(
                "[sync] {:?} trigger coalesced into in-flight fetch #{} ({})",
                trigger,
                running.id,
                running.network
            );
            return None;
        }
        Some(self.start(trigger))
    }

    /// Select `network` and fetch it. If a fetch is already out, the
    /// selector still moves and the running fetch gets superseded when it
    /// completes.
    pub fn switch_network(&mut self, network: Network) -> Option<FetchTicket> {
        if network != self.network {
            log::info!("[sync] network selector {} -> {}", self.network, network);
        }
        self.network = network;
        self.begin(Trigger::NetworkSwitch)
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Fetched, FetchError>,
        now: DateTime<Local>,
    ) -> SyncOutcome {
        match self.state {
            SyncState::Fetching(running) if running.id == ticket.id => {}
            _ => {
                log::debug!("[sync] ignoring completion of stale fetch #{}", ticket.id);
                return SyncOutcome::Ignored;
            }
        }
        self.state = SyncState::Idle;

        if ticket.network != self.network {
            log::info!(
                "[sync] discarding {} result of fetch #{}; selector is now {}",
                ticket.network,
                ticket.id,
                self.network
            );
            return SyncOutcome::Superseded {
                next: self.start(Trigger::Resync),
            };
        }

        match result {
            Ok(fetched) => {
                self.last_updated = Some(now);
                self.last_error = None;
                log::info!(
                    "[sync] fetch #{} ok: {} pnodes from {}",
                    ticket.id,
                    fetched.pnodes.len(),
                    ticket.network
                );
                SyncOutcome::Applied {
                    network: ticket.network,
                    fetched,
                }
            }
            Err(error) if ticket.network.is_live() => {
                log::warn!(
                    "[sync] fetch #{} from {} failed: {error}; falling back to demo",
                    ticket.id,
                    ticket.network
                );
                self.last_error = Some(error.clone());
                self.network = Network::Demo;
                SyncOutcome::FellBack {
                    from: ticket.network,
                    error,
                    next: self.start(Trigger::Fallback),
                }
            }
            Err(error) => {
                log::error!("[sync] fetch #{} from demo failed: {error}", ticket.id);
                self.last_error = Some(error.clone());
                SyncOutcome::Failed {
                    network: ticket.network,
                    error,
                }
            }
        }
    }

    fn start(&mut self, trigger: Trigger) -> FetchTicket {
        let ticket = FetchTicket {
            id: self.next_ticket,
            network: self.network,
            trigger,
        };
        self.next_ticket += 1;
        self.state = SyncState::Fetching(ticket);
        log::debug!(
            "[sync] fetch #{} -> {} ({:?})",
            ticket.id,
            ticket.network,
            trigger
        );
        ticket
    }
}
