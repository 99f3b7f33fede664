//! Event loop glue between the [`App`] core and the outside world.
//!
//! Background tasks (refresh ticker, the single in-flight fetch, the
//! notice auto-clear timer) never touch the `App`; they only send
//! [`AppEvent`]s. Everything that mutates state runs in [`Driver::handle`],
//! one event at a time.

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::app::App;
use crate::notify::NoticeId;
use crate::source::{fetch_cycle, PnodeSource};
use crate::sync::{FetchTicket, Trigger};
use crate::types::AppEvent;
use crate::ui_snapshot::UiAction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncSettings {
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub pnode_limit: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            pnode_limit: 100,
        }
    }
}

pub struct Driver {
    app: App,
    source: Arc<dyn PnodeSource>,
    settings: SyncSettings,
    tx: UnboundedSender<AppEvent>,
    ticker: Option<JoinHandle<()>>,
    fetch_task: Option<JoinHandle<()>>,
    notice_timer: Option<(NoticeId, JoinHandle<()>)>,
    fetches_issued: u64,
}

impl Driver {
    pub fn new(
        app: App,
        source: Arc<dyn PnodeSource>,
        settings: SyncSettings,
    ) -> (Self, UnboundedReceiver<AppEvent>) {
        let (tx, rx) = unbounded_channel();
        let driver = Self {
            app,
            source,
            settings,
            tx,
            ticker: None,
            fetch_task: None,
            notice_timer: None,
            fetches_issued: 0,
        };
        (driver, rx)
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Direct access for controls that never fetch (search typing etc.)
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Fetch tasks spawned since start
    pub fn fetches_issued(&self) -> u64 {
        self.fetches_issued
    }

    /// Kick off the first refresh and the periodic ticker
    pub fn start(&mut self) {
        self.start_ticker();
        let ticket = self.app.request_refresh(Trigger::Startup);
        self.after(ticket);
    }

    pub fn start_ticker(&mut self) {
        if let Some(old) = self.ticker.take() {
            old.abort();
        }
        let tx = self.tx.clone();
        let period = self.settings.refresh_interval;
        log::info!("[driver] auto-refresh every {}ms", period.as_millis());

        self.ticker = Some(tokio::spawn(async move {
            let mut iv = interval_at(Instant::now() + period, period);
            iv.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                iv.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn handle(&mut self, ev: AppEvent) {
        let next = match ev {
            AppEvent::Tick => self.app.request_refresh(Trigger::Timer),
            AppEvent::Fetched { ticket, result } => {
                if self.app.sync().in_flight().map(|t| t.id) == Some(ticket.id) {
                    self.fetch_task = None;
                }
                self.app.on_fetch_complete(ticket, result)
            }
            AppEvent::NoticeExpired(id) => {
                if self.notice_timer.as_ref().is_some_and(|(t, _)| *t == id) {
                    self.notice_timer = None;
                }
                self.app.expire_notice(id);
                None
            }
            AppEvent::Action(action) => self.app.apply_action(action),
            AppEvent::Quit => {
                self.app.request_quit();
                None
            }
        };
        self.after(next);
    }

    /// Shorthand for `handle(AppEvent::Action(..))`
    pub fn act(&mut self, action: UiAction) {
        self.handle(AppEvent::Action(action));
    }

    /// Process events until quit (or every sender is gone)
    pub async fn run(&mut self, rx: &mut UnboundedReceiver<AppEvent>) {
        while !self.app.quit_flag() {
            match rx.recv().await {
                Some(ev) => self.handle(ev),
                None => break,
            }
        }
    }

    /// Process events until no fetch is in flight. Fallback and resync
    /// fetches keep it going, so this returns after the whole chain.
    pub async fn settle(&mut self, rx: &mut UnboundedReceiver<AppEvent>) {
        while self.app.sync().is_fetching() {
            match rx.recv().await {
                Some(ev) => self.handle(ev),
                None => break,
            }
        }
    }

    /// Stop every scheduled task. Nothing fires after this returns.
    pub fn shutdown(&mut self) {
        if let Some(t) = self.ticker.take() {
            t.abort();
        }
        if let Some(t) = self.fetch_task.take() {
            t.abort();
        }
        if let Some((_, t)) = self.notice_timer.take() {
            t.abort();
        }
        log::debug!("[driver] scheduled tasks cancelled");
    }

    fn after(&mut self, next: Option<FetchTicket>) {
        if let Some(ticket) = next {
            self.spawn_fetch(ticket);
        }
        self.sync_notice_timer();
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let SyncSettings {
            fetch_timeout,
            pnode_limit,
            ..
        } = self.settings;

        self.fetches_issued += 1;
        self.fetch_task = Some(tokio::spawn(async move {
            let result = fetch_cycle(source.as_ref(), ticket.network, pnode_limit, fetch_timeout).await;
            let _ = tx.send(AppEvent::Fetched { ticket, result });
        }));
    }

    /// Keep exactly one auto-clear timer, armed for the notice on screen
    fn sync_notice_timer(&mut self) {
        let showing = self.app.notifier().current_id();
        let armed = self.notice_timer.as_ref().map(|(id, _)| *id);
        if showing == armed {
            return;
        }

        if let Some((_, handle)) = self.notice_timer.take() {
            handle.abort();
        }
        if let Some(id) = showing {
            let tx = self.tx.clone();
            let after = self.app.notifier().display_for();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(after).await;
                let _ = tx.send(AppEvent::NoticeExpired(id));
            });
            self.notice_timer = Some((id, handle));
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
