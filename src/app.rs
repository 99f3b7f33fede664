use chrono::Local;

use crate::error::FetchError;
use crate::notify::{NoticeKind, Notifier};
use crate::store::RecordStore;
use crate::sync::{FetchTicket, SyncController, SyncOutcome, SyncState, Trigger};
use crate::types::{Fetched, Network, NetworkInfo, SortKey, Summary, ViewState};
use crate::ui_snapshot::UiAction;
use crate::view::{derive_view, PageView};

use tokio::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Process-scoped dashboard context.
///
/// Owns every piece of mutable state (record set, network selector,
/// controls, latest stats, notice slot). Build a fresh one per process or
/// per test; nothing lives in globals.
pub struct App {
    quit: bool,
    store: RecordStore,
    sync: SyncController,
    view: ViewState,
    summary: Summary,
    info: NetworkInfo,
    notifier: Notifier,
    input_mode: InputMode,
}

impl App {
    pub fn new(network: Network, notice_duration: Duration) -> Self {
        Self {
            quit: false,
            store: RecordStore::new(),
            sync: SyncController::new(network),
            view: ViewState::default(),
            summary: Summary::default(),
            info: NetworkInfo::default(),
            notifier: Notifier::new(notice_duration),
            input_mode: InputMode::Normal,
        }
    }

    // ----- getters -----
    pub fn quit_flag(&self) -> bool { self.quit }
    pub fn store(&self) -> &RecordStore { &self.store }
    pub fn network(&self) -> Network { self.sync.network() }
    pub fn sync_state(&self) -> SyncState { self.sync.state() }
    pub fn sync(&self) -> &SyncController { &self.sync }
    pub fn view_state(&self) -> &ViewState { &self.view }
    pub fn summary(&self) -> &Summary { &self.summary }
    pub fn network_info(&self) -> &NetworkInfo { &self.info }
    pub fn notifier(&self) -> &Notifier { &self.notifier }
    pub fn input_mode(&self) -> InputMode { self.input_mode }

    /// Current page of the table
    pub fn view(&self) -> PageView<'_> {
        derive_view(self.store.as_slice(), &self.view)
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    // ----- sync -----

    /// Ask for a refresh. `None` means a fetch is already out and this
    /// trigger was folded into it.
    pub fn request_refresh(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        let ticket = self.sync.begin(trigger)?;
        if trigger.is_user_initiated() {
            self.notifier.post(
                NoticeKind::Info,
                format!("Loading {} data...", ticket.network),
            );
        }
        Some(ticket)
    }

    /// Select a network and fetch it. Records stay as they are until that
    /// fetch lands.
    pub fn switch_network(&mut self, network: Network) -> Option<FetchTicket> {
        self.notifier
            .post(NoticeKind::Info, format!("Switching to {network}..."));
        self.view.page = 1;
        self.sync.switch_network(network)
    }

    /// Feed a finished fetch back in. Returns the follow-up fetch to run,
    /// if the outcome calls for one (fallback or resync).
    pub fn on_fetch_complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Fetched, FetchError>,
    ) -> Option<FetchTicket> {
        match self.sync.complete(ticket, result, Local::now()) {
            SyncOutcome::Ignored => None,
            SyncOutcome::Applied { network, fetched } => {
                let Fetched { summary, pnodes, info } = fetched;
                self.store.replace(pnodes);
                self.summary = summary;
                self.info = info;
                let page = self.view().page;
                self.view.page = page;
                self.notifier.post(
                    NoticeKind::Success,
                    format!("{} data loaded successfully!", network.title()),
                );
                None
            }
            SyncOutcome::Superseded { next } => Some(next),
            SyncOutcome::FellBack { from, error, next } => {
                self.view.page = 1;
                self.notifier.post(
                    NoticeKind::Warning,
                    format!("Failed to load {from} data ({error}). Falling back to demo data..."),
                );
                Some(next)
            }
            SyncOutcome::Failed { network, .. } => {
                self.notifier.post(
                    NoticeKind::Error,
                    format!("Failed to load {network} data. Check if backend is running."),
                );
                None
            }
        }
    }

    // ----- notices -----
    pub fn dismiss_notice(&mut self) -> Option<crate::notify::NoticeId> {
        self.notifier.dismiss()
    }

    pub fn expire_notice(&mut self, id: crate::notify::NoticeId) -> bool {
        self.notifier.expire(id)
    }

    // ----- view controls -----
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.view.search = text.into();
        self.view.page = 1;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.view.search.push(c);
        self.view.page = 1;
    }

    pub fn pop_search_char(&mut self) {
        self.view.search.pop();
        self.view.page = 1;
    }

    pub fn set_active_only(&mut self, on: bool) {
        self.view.active_only = on;
        self.view.page = 1;
    }

    pub fn toggle_active_only(&mut self) {
        self.set_active_only(!self.view.active_only);
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.view.sort = key;
        self.view.page = 1;
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.view.sort.next());
    }

    pub fn set_page(&mut self, page: usize) {
        self.view.page = page;
        let clamped = self.view().page;
        self.view.page = clamped;
    }

    pub fn next_page(&mut self) {
        self.set_page(self.view.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.view.page.saturating_sub(1));
    }

    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn leave_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Apply one UI control. Returns a fetch to run when the action was a
    /// refresh or network switch that was not coalesced.
    pub fn apply_action(&mut self, action: UiAction) -> Option<FetchTicket> {
        match action {
            UiAction::Refresh => return self.request_refresh(Trigger::Manual),
            UiAction::SwitchNetwork { network } => return self.switch_network(network),
            UiAction::SetSearch { text } => self.set_search(text),
            UiAction::SetActiveOnly { on } => self.set_active_only(on),
            UiAction::SetSort { key } => self.set_sort(key),
            UiAction::NextPage => self.next_page(),
            UiAction::PrevPage => self.prev_page(),
            UiAction::GoToPage { page } => self.set_page(page),
            UiAction::DismissNotice => {
                self.dismiss_notice();
            }
            UiAction::Quit => self.request_quit(),
        }
        None
    }
}
