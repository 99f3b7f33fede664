//! Single-slot notification surface.
//!
//! Posting replaces whatever is showing. Auto-clear is scheduled by the
//! driver against a [`NoticeId`]; [`Notifier::expire`] only clears when that
//! id is still the one on screen, so a late timer cannot wipe a newer notice.

use serde::Serialize;
use std::collections::VecDeque;
use tokio::time::{Duration, Instant};

/// How long a notice stays up unless dismissed
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_secs(5);

const MAX_LOG_ENTRIES: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NoticeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Notice {
    /// Time left before auto-clear, zero once it is due
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

#[derive(Debug)]
pub struct Notifier {
    current: Option<Notice>,
    next_id: u64,
    display_for: Duration,
    recent: VecDeque<(NoticeKind, String)>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_DURATION)
    }
}

impl Notifier {
    pub fn new(display_for: Duration) -> Self {
        Self {
            current: None,
            next_id: 1,
            display_for,
            recent: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    pub fn display_for(&self) -> Duration {
        self.display_for
    }

    /// Show `message`, discarding the current notice
    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>) -> NoticeId {
        let message = message.into();
        match kind {
            NoticeKind::Error => log::error!("[notice] {message}"),
            NoticeKind::Warning => log::warn!("[notice] {message}"),
            NoticeKind::Info | NoticeKind::Success => log::info!("[notice] {message}"),
        }

        let id = NoticeId(self.next_id);
        self.next_id += 1;

        self.recent.push_back((kind, message.clone()));
        if self.recent.len() > MAX_LOG_ENTRIES {
            self.recent.pop_front();
        }

        self.current = Some(Notice {
            id,
            kind,
            message,
            expires_at: Instant::now() + self.display_for,
        });
        id
    }

    /// Explicit close. Returns the id that was showing so the caller can
    /// cancel its auto-clear.
    pub fn dismiss(&mut self) -> Option<NoticeId> {
        self.current.take().map(|n| n.id)
    }

    /// Auto-clear callback; no-op unless `id` is still displayed
    pub fn expire(&mut self, id: NoticeId) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> Option<NoticeId> {
        self.current.as_ref().map(|n| n.id)
    }

    /// Oldest first, bounded
    pub fn recent(&self) -> impl Iterator<Item = &(NoticeKind, String)> {
        self.recent.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_replaces_current() {
        let mut n = Notifier::default();
        let first = n.post(NoticeKind::Info, "Loading testnet data...");
        let second = n.post(NoticeKind::Success, "Testnet data loaded successfully!");
        assert_ne!(first, second);
        let cur = n.current().unwrap();
        assert_eq!(cur.id, second);
        assert_eq!(cur.kind, NoticeKind::Success);
    }

    #[test]
    fn test_stale_expire_is_ignored() {
        let mut n = Notifier::default();
        let old = n.post(NoticeKind::Info, "one");
        let new = n.post(NoticeKind::Warning, "two");
        assert!(!n.expire(old));
        assert_eq!(n.current_id(), Some(new));
        assert!(n.expire(new));
        assert!(n.current().is_none());
    }

    #[test]
    fn test_dismiss_then_late_timer() {
        let mut n = Notifier::default();
        let id = n.post(NoticeKind::Error, "boom");
        assert_eq!(n.dismiss(), Some(id));
        let next = n.post(NoticeKind::Info, "after");
        // Timer for the dismissed notice fires late
        assert!(!n.expire(id));
        assert_eq!(n.current_id(), Some(next));
    }

    #[test]
    fn test_recent_log_is_bounded() {
        let mut n = Notifier::default();
        for i in 0..(MAX_LOG_ENTRIES + 7) {
            n.post(NoticeKind::Info, format!("msg {i}"));
        }
        assert_eq!(n.recent().count(), MAX_LOG_ENTRIES);
        assert_eq!(n.recent().next().unwrap().1, "msg 7");
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down() {
        let mut n = Notifier::new(Duration::from_secs(5));
        n.post(NoticeKind::Success, "done");
        assert_eq!(n.current().unwrap().remaining(), Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(n.current().unwrap().remaining(), Duration::from_secs(3));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(n.current().unwrap().remaining(), Duration::ZERO);
    }
}
