#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure pagination system that turns mount and cursor events into page loads.
//!
//! The world decides whether a page may be fetched; this system only reacts to
//! its verdicts. Every `PageLoadStarted` event yields exactly one
//! [`PageRequest`] for the fetch adapter to execute.

use pokedex_core::{Command, Event, PageCursor, PageRequest};
use tracing::debug;

/// Pagination system bridging world events and the fetch adapter.
#[derive(Debug, Default)]
pub struct Pagination {
    requests_issued: u64,
}

impl Pagination {
    /// Creates a new pagination system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { requests_issued: 0 }
    }

    /// Consumes world events, emitting page load commands and fetch requests.
    ///
    /// Commands pushed to `out` must be applied to the world; requests pushed
    /// to `requests` must be handed to the fetch adapter.
    pub fn handle(
        &mut self,
        events: &[Event],
        out: &mut Vec<Command>,
        requests: &mut Vec<PageRequest>,
    ) {
        for event in events {
            match event {
                Event::Mounted { .. } => out.push(Command::BeginPageLoad {
                    page: PageCursor::FIRST,
                }),
                Event::CursorAdvanceRequested { page } => {
                    out.push(Command::BeginPageLoad { page: *page });
                }
                Event::PageLoadStarted { request } => {
                    self.requests_issued = self.requests_issued.saturating_add(1);
                    debug!(
                        page = request.page.get(),
                        session = request.session.get(),
                        "issuing page request"
                    );
                    requests.push(*request);
                }
                _ => {}
            }
        }
    }

    /// Number of page requests handed to the fetch adapter so far.
    #[must_use]
    pub const fn requests_issued(&self) -> u64 {
        self.requests_issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::ViewSession;

    #[test]
    fn mount_begins_first_page() {
        let mut pagination = Pagination::new();
        let mut commands = Vec::new();
        let mut requests = Vec::new();

        pagination.handle(
            &[Event::Mounted {
                session: ViewSession::new(1),
            }],
            &mut commands,
            &mut requests,
        );

        assert_eq!(
            commands,
            vec![Command::BeginPageLoad {
                page: PageCursor::FIRST
            }]
        );
        assert!(requests.is_empty());
    }

    #[test]
    fn started_load_yields_exactly_one_request() {
        let mut pagination = Pagination::new();
        let mut commands = Vec::new();
        let mut requests = Vec::new();
        let request = PageRequest::new(ViewSession::new(3), PageCursor::new(2));

        pagination.handle(
            &[Event::PageLoadStarted { request }],
            &mut commands,
            &mut requests,
        );

        assert!(commands.is_empty());
        assert_eq!(requests, vec![request]);
        assert_eq!(pagination.requests_issued(), 1);
    }
}
