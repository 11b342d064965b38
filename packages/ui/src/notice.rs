//! Transient notifications ("toasts").
//!
//! Pages report outcomes the user should see (failed sign-in, saved profile,
//! network trouble) through [`notify`]. Notices are shown newest first by
//! [`NoticePanel`](crate::NoticePanel), can be dismissed, and expire on
//! their own after [`NOTICE_TTL`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use dioxus::prelude::*;

use crate::timer::sleep;

/// How long a notice stays up unless dismissed.
pub const NOTICE_TTL: Duration = Duration::from_secs(6);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub timestamp: String,
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Notices {
    entries: Vec<Notice>,
    next_id: u64,
}

impl Notices {
    /// Add a notice and return its id.
    pub fn push(&mut self, level: NoticeLevel, title: &str, message: &str) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Notice {
            id,
            timestamp: current_time(),
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    /// Notices, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn use_notices() -> Signal<Notices> {
    use_context::<Signal<Notices>>()
}

/// Show a notice and schedule its expiry. Must be called from within the
/// Dioxus runtime (event handlers, effects, spawned tasks).
pub fn notify(notices: &mut Signal<Notices>, level: NoticeLevel, title: &str, message: &str) {
    let id = notices.write().push(level, title, message);
    let mut notices = *notices;
    spawn(async move {
        sleep(NOTICE_TTL).await;
        notices.write().dismiss(id);
    });
}

fn current_time() -> String {
    clock_label(&Local::now())
}

/// Wall-clock `HH:MM` shown next to a notice.
fn clock_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_dismiss() {
        let mut notices = Notices::default();
        let first = notices.push(NoticeLevel::Info, "One", "first");
        let second = notices.push(NoticeLevel::Error, "Two", "second");

        let titles: Vec<_> = notices.newest_first().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["Two", "One"]);

        notices.dismiss(second);
        let ids: Vec<_> = notices.newest_first().map(|n| n.id).collect();
        assert_eq!(ids, [first]);

        notices.dismiss(first);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut notices = Notices::default();
        let a = notices.push(NoticeLevel::Success, "Saved", "");
        notices.dismiss(a);
        let b = notices.push(NoticeLevel::Success, "Saved", "");
        assert_ne!(a, b);
    }

    #[test]
    fn test_clock_label_uses_the_given_offset() {
        let offset = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2024, 5, 1, 7, 5, 0).unwrap();
        assert_eq!(clock_label(&at), "07:05");
    }

    #[test]
    fn test_pushed_notice_carries_local_clock() {
        let mut notices = Notices::default();
        notices.push(NoticeLevel::Info, "Hello", "");
        let stamp = &notices.newest_first().next().unwrap().timestamp;
        assert_eq!(stamp.len(), 5);
        assert_eq!(stamp.as_bytes()[2], b':');
    }
}
