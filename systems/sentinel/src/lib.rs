#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scroll sentinel system that advances the page cursor when the last card shows up.
//!
//! The sentinel models a single visibility observer attached to the last card
//! of the rendered (filtered) sequence. The observer is torn down and
//! recreated whenever the card it should watch, the incremental loading flag,
//! or the more-data flag changes. While an incremental load is in progress no
//! new observer is created, but one that is already armed keeps watching and
//! may still fire. Whether more data exists is checked when the observer
//! fires, using the value captured when it was armed.
//!
//! A replacement observer on the same card inherits the last intersection
//! report, so a failed load followed by an unchanged viewport does not fire
//! again; the card has to leave and re-enter the viewport first.

use pokedex_core::{Command, Event, SentinelTarget};

/// Per-frame inputs distilled from world queries and the derived grid view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SentinelInput {
    /// Last card of the currently rendered sequence, if any card is rendered.
    pub target: Option<SentinelTarget>,
    /// Whether a page after the first is being fetched.
    pub loading_more: bool,
    /// Whether further pages may exist.
    pub has_more: bool,
}

impl SentinelInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(target: Option<SentinelTarget>, loading_more: bool, has_more: bool) -> Self {
        Self {
            target,
            loading_more,
            has_more,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Observer {
    target: SentinelTarget,
    has_more: bool,
    intersecting: Option<bool>,
}

/// Sentinel system that translates card visibility into cursor advances.
#[derive(Debug, Default)]
pub struct Sentinel {
    observer: Option<Observer>,
    dependencies: Option<SentinelInput>,
    observers_armed: u64,
    observers_disconnected: u64,
}

impl Sentinel {
    /// Creates a new sentinel without an armed observer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observer: None,
            dependencies: None,
            observers_armed: 0,
            observers_disconnected: 0,
        }
    }

    /// Consumes world events and frame inputs to emit cursor advance commands.
    ///
    /// The `visibility` closure reports whether the provided card currently
    /// intersects the viewport, or `None` when the adapter did not measure it.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: SentinelInput,
        mut visibility: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(SentinelTarget) -> Option<bool>,
    {
        for event in events {
            if matches!(event, Event::Unmounted { .. }) {
                self.disconnect();
                self.dependencies = None;
            }
        }

        if self.dependencies != Some(input) {
            self.dependencies = Some(input);
            if !input.loading_more {
                self.rearm(input);
            }
        }

        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let Some(intersecting) = visibility(observer.target) else {
            return;
        };

        let entered = intersecting && observer.intersecting != Some(true);
        observer.intersecting = Some(intersecting);
        if entered && observer.has_more {
            out.push(Command::AdvanceCursor);
        }
    }

    /// Disconnects the armed observer, if any.
    pub fn disconnect(&mut self) {
        if self.observer.take().is_some() {
            self.observers_disconnected = self.observers_disconnected.saturating_add(1);
        }
    }

    /// Card the armed observer is watching.
    #[must_use]
    pub fn observed_target(&self) -> Option<SentinelTarget> {
        self.observer.map(|observer| observer.target)
    }

    /// Reports whether an observer is armed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.observer.is_some()
    }

    /// Number of observers armed since creation.
    #[must_use]
    pub const fn observers_armed(&self) -> u64 {
        self.observers_armed
    }

    /// Number of observers disconnected since creation.
    #[must_use]
    pub const fn observers_disconnected(&self) -> u64 {
        self.observers_disconnected
    }

    fn rearm(&mut self, input: SentinelInput) {
        let inherited = self
            .observer
            .filter(|observer| Some(observer.target) == input.target)
            .and_then(|observer| observer.intersecting);
        self.disconnect();
        if let Some(target) = input.target {
            self.observer = Some(Observer {
                target,
                has_more: input.has_more,
                intersecting: inherited,
            });
            self.observers_armed = self.observers_armed.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::PokemonId;

    fn target(index: usize) -> SentinelTarget {
        SentinelTarget::new(index, PokemonId::new(index as u32 + 1))
    }

    #[test]
    fn no_observer_without_a_rendered_card() {
        let mut sentinel = Sentinel::new();
        let mut commands = Vec::new();

        sentinel.handle(
            &[],
            SentinelInput::new(None, false, true),
            |_| Some(true),
            &mut commands,
        );

        assert!(!sentinel.is_armed());
        assert!(commands.is_empty());
    }

    #[test]
    fn first_visible_report_fires_once() {
        let mut sentinel = Sentinel::new();
        let mut commands = Vec::new();
        let input = SentinelInput::new(Some(target(49)), false, true);

        sentinel.handle(&[], input, |_| Some(true), &mut commands);
        sentinel.handle(&[], input, |_| Some(true), &mut commands);

        assert_eq!(commands, vec![Command::AdvanceCursor]);
    }

    #[test]
    fn re_entering_the_viewport_fires_again() {
        let mut sentinel = Sentinel::new();
        let mut commands = Vec::new();
        let input = SentinelInput::new(Some(target(49)), false, true);

        for visible in [false, true, false, true] {
            sentinel.handle(&[], input, |_| Some(visible), &mut commands);
        }

        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn unmeasured_frames_do_not_fire() {
        let mut sentinel = Sentinel::new();
        let mut commands = Vec::new();
        let input = SentinelInput::new(Some(target(3)), false, true);

        sentinel.handle(&[], input, |_| None, &mut commands);

        assert!(sentinel.is_armed());
        assert!(commands.is_empty());
    }

    #[test]
    fn failed_load_with_an_unchanged_viewport_does_not_fire_again() {
        let mut sentinel = Sentinel::new();
        let mut commands = Vec::new();
        let idle = SentinelInput::new(Some(target(49)), false, true);
        let loading = SentinelInput::new(Some(target(49)), true, true);

        sentinel.handle(&[], idle, |_| Some(true), &mut commands);
        sentinel.handle(&[], loading, |_| Some(true), &mut commands);
        sentinel.handle(&[], idle, |_| Some(true), &mut commands);
        sentinel.handle(&[], idle, |_| Some(true), &mut commands);
        assert_eq!(commands.len(), 1);
        assert_eq!(sentinel.observers_armed(), 2);

        sentinel.handle(&[], idle, |_| Some(false), &mut commands);
        sentinel.handle(&[], idle, |_| Some(true), &mut commands);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn new_last_card_starts_without_a_report() {
        let mut sentinel = Sentinel::new();
        let mut commands = Vec::new();

        sentinel.handle(
            &[],
            SentinelInput::new(Some(target(49)), false, true),
            |_| Some(true),
            &mut commands,
        );
        sentinel.handle(
            &[],
            SentinelInput::new(Some(target(99)), false, true),
            |_| Some(true),
            &mut commands,
        );

        assert_eq!(commands.len(), 2);
    }
}
