#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative catalog view state for the Pokédex viewer.
//!
//! The world owns the loaded collection, the pagination cursor and loading
//! state, the search term, and the current selection. It is mutated only
//! through [`apply`] and read only through the [`query`] module.

use std::collections::HashSet;

use pokedex_core::{
    AdvanceRejection, Command, Event, FetchFailure, PageCursor, PageRequest, Pokemon, PokemonId,
    ViewSession, PAGE_SIZE,
};
use tracing::{debug, error, info, warn};

/// Pagination bookkeeping for the mounted view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationState {
    cursor: PageCursor,
    pages_loaded: u32,
    has_more: bool,
    in_flight: Option<PageRequest>,
}

impl PaginationState {
    fn new() -> Self {
        Self {
            cursor: PageCursor::FIRST,
            pages_loaded: 0,
            has_more: true,
            in_flight: None,
        }
    }

    /// Last page merged into the collection, or the first page before any load.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Number of pages merged since the view mounted.
    #[must_use]
    pub const fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    /// Whether further pages may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Request currently outstanding, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    /// Whether the first page is being fetched.
    #[must_use]
    pub fn is_initial_loading(&self) -> bool {
        self.in_flight.is_some_and(|request| request.is_initial())
    }

    /// Whether a page after the first is being fetched.
    #[must_use]
    pub fn is_loading_more(&self) -> bool {
        self.in_flight.is_some_and(|request| !request.is_initial())
    }

    /// Page the next fetch should address.
    #[must_use]
    pub const fn next_page(&self) -> PageCursor {
        if self.pages_loaded == 0 {
            PageCursor::FIRST
        } else {
            self.cursor.next()
        }
    }
}

/// Represents the authoritative catalog view state.
#[derive(Debug)]
pub struct World {
    session: ViewSession,
    mounted: bool,
    pokemon: Vec<Pokemon>,
    pagination: PaginationState,
    search_term: String,
    selected: Option<usize>,
}

impl World {
    /// Creates an unmounted world with an empty search term.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: ViewSession::default(),
            mounted: false,
            pokemon: Vec::new(),
            pagination: PaginationState::new(),
            search_term: String::new(),
            selected: None,
        }
    }

    fn reset_view(&mut self) {
        self.pokemon.clear();
        self.pagination = PaginationState::new();
        self.selected = None;
    }

    fn is_current(&self, request: PageRequest) -> bool {
        self.mounted
            && request.session == self.session
            && self.pagination.in_flight == Some(request)
    }

    fn begin_page_load(&mut self, page: PageCursor, out_events: &mut Vec<Event>) {
        if !self.mounted {
            debug!(page = page.get(), "ignoring page load while unmounted");
            return;
        }
        if let Some(in_flight) = self.pagination.in_flight {
            debug!(
                page = page.get(),
                in_flight = in_flight.page.get(),
                "ignoring page load while another request is outstanding"
            );
            return;
        }
        let allowed = page.is_first()
            || (self.pagination.has_more && page == self.pagination.next_page());
        if !allowed {
            debug!(
                page = page.get(),
                expected = self.pagination.next_page().get(),
                "ignoring out-of-sequence page load"
            );
            return;
        }

        let request = PageRequest::new(self.session, page);
        self.pagination.in_flight = Some(request);
        out_events.push(Event::PageLoadStarted { request });
    }

    fn complete_page_load(
        &mut self,
        request: PageRequest,
        pokemon: Vec<Pokemon>,
        out_events: &mut Vec<Event>,
    ) {
        if !self.is_current(request) {
            debug!(
                page = request.page.get(),
                session = request.session.get(),
                "discarding stale page response"
            );
            out_events.push(Event::StaleResponseDiscarded { request });
            return;
        }

        let count = pokemon.len();
        if request.is_initial() {
            self.pokemon = pokemon;
            if self.selected.take().is_some() {
                out_events.push(Event::SelectionCleared);
            }
        } else {
            let known: HashSet<PokemonId> = self.pokemon.iter().map(|entry| entry.id).collect();
            let duplicates = pokemon.iter().filter(|entry| known.contains(&entry.id)).count();
            if duplicates > 0 {
                warn!(
                    page = request.page.get(),
                    duplicates, "page repeats identifiers that are already loaded"
                );
            }
            self.pokemon.extend(pokemon);
        }

        self.pagination.cursor = request.page;
        self.pagination.pages_loaded = self.pagination.pages_loaded.saturating_add(1);
        self.pagination.has_more = count >= PAGE_SIZE;
        self.pagination.in_flight = None;

        info!(
            page = request.page.get(),
            count,
            total = self.pokemon.len(),
            has_more = self.pagination.has_more,
            "page loaded"
        );
        out_events.push(Event::PageLoaded {
            request,
            count,
            total: self.pokemon.len(),
            has_more: self.pagination.has_more,
        });
    }

    fn fail_page_load(
        &mut self,
        request: PageRequest,
        failure: FetchFailure,
        out_events: &mut Vec<Event>,
    ) {
        if !self.is_current(request) {
            debug!(
                page = request.page.get(),
                session = request.session.get(),
                "discarding stale page failure"
            );
            out_events.push(Event::StaleResponseDiscarded { request });
            return;
        }

        error!(page = request.page.get(), %failure, "page fetch failed");
        self.pagination.in_flight = None;
        out_events.push(Event::PageLoadFailed { request, failure });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Mount => {
            world.session = world.session.next();
            world.mounted = true;
            world.reset_view();
            out_events.push(Event::Mounted {
                session: world.session,
            });
        }
        Command::Unmount => {
            if !world.mounted {
                return;
            }
            world.mounted = false;
            world.reset_view();
            out_events.push(Event::Unmounted {
                session: world.session,
            });
        }
        Command::AdvanceCursor => {
            let rejection = if !world.mounted {
                Some(AdvanceRejection::NotMounted)
            } else if world.pagination.in_flight.is_some() {
                Some(AdvanceRejection::LoadInFlight)
            } else if !world.pagination.has_more {
                Some(AdvanceRejection::Exhausted)
            } else {
                None
            };

            match rejection {
                Some(reason) => out_events.push(Event::CursorAdvanceRejected { reason }),
                None => out_events.push(Event::CursorAdvanceRequested {
                    page: world.pagination.next_page(),
                }),
            }
        }
        Command::BeginPageLoad { page } => world.begin_page_load(page, out_events),
        Command::CompletePageLoad { request, pokemon } => {
            world.complete_page_load(request, pokemon, out_events);
        }
        Command::FailPageLoad { request, failure } => {
            world.fail_page_load(request, failure, out_events);
        }
        Command::SetSearchTerm { term } => {
            if world.search_term != term {
                world.search_term = term.clone();
                out_events.push(Event::SearchTermChanged { term });
            }
        }
        Command::Select { index } => {
            if index >= world.pokemon.len() || world.selected == Some(index) {
                return;
            }
            world.selected = Some(index);
            out_events.push(Event::SelectionChanged { index });
        }
        Command::Dismiss => {
            if world.selected.take().is_some() {
                out_events.push(Event::SelectionCleared);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{PaginationState, World};
    use pokedex_core::{Pokemon, ViewSession};

    /// Reports whether the catalog view is mounted.
    #[must_use]
    pub fn is_mounted(world: &World) -> bool {
        world.mounted
    }

    /// Session of the current (or most recent) mount.
    #[must_use]
    pub fn session(world: &World) -> ViewSession {
        world.session
    }

    /// Loaded collection in arrival order.
    #[must_use]
    pub fn pokemon(world: &World) -> &[Pokemon] {
        &world.pokemon
    }

    /// Pagination bookkeeping.
    #[must_use]
    pub fn pagination(world: &World) -> &PaginationState {
        &world.pagination
    }

    /// Current search term, exactly as typed.
    #[must_use]
    pub fn search_term(world: &World) -> &str {
        &world.search_term
    }

    /// Index of the selected record, if any.
    #[must_use]
    pub fn selected_index(world: &World) -> Option<usize> {
        world.selected
    }

    /// The selected record, if any.
    #[must_use]
    pub fn selected(world: &World) -> Option<&Pokemon> {
        world.selected.and_then(|index| world.pokemon.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::{FetchFailureKind, Stats};

    fn record(id: u32) -> Pokemon {
        Pokemon {
            id: PokemonId::new(id),
            pokedex_id: id,
            name: format!("Pokemon {id}"),
            image: String::new(),
            sprite: String::new(),
            stats: Stats::default(),
            generation: 1,
            evolutions: Vec::new(),
            types: Vec::new(),
        }
    }

    fn mounted_world() -> (World, PageRequest) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::Mount, &mut events);
        apply(
            &mut world,
            Command::BeginPageLoad {
                page: PageCursor::FIRST,
            },
            &mut events,
        );
        let request = query::pagination(&world)
            .in_flight()
            .expect("first page in flight");
        (world, request)
    }

    #[test]
    fn new_world_is_unmounted_and_idle() {
        let world = World::new();
        let pagination = query::pagination(&world);

        assert!(!query::is_mounted(&world));
        assert_eq!(pagination.cursor(), PageCursor::FIRST);
        assert!(pagination.has_more());
        assert!(!pagination.is_initial_loading());
        assert!(!pagination.is_loading_more());
    }

    #[test]
    fn first_page_marks_initial_loading_only() {
        let (world, request) = mounted_world();
        let pagination = query::pagination(&world);

        assert!(request.is_initial());
        assert!(pagination.is_initial_loading());
        assert!(!pagination.is_loading_more());
    }

    #[test]
    fn begin_page_load_is_ignored_while_unmounted() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::BeginPageLoad {
                page: PageCursor::FIRST,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::pagination(&world).in_flight().is_none());
    }

    #[test]
    fn second_begin_is_ignored_while_request_outstanding() {
        let (mut world, request) = mounted_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::BeginPageLoad {
                page: PageCursor::FIRST,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::pagination(&world).in_flight(), Some(request));
    }

    #[test]
    fn out_of_sequence_page_is_ignored() {
        let (mut world, request) = mounted_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CompletePageLoad {
                request,
                pokemon: (1..=50).map(record).collect(),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::BeginPageLoad {
                page: PageCursor::new(5),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn failure_clears_flag_and_keeps_state() {
        let (mut world, request) = mounted_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FailPageLoad {
                request,
                failure: FetchFailure::new(FetchFailureKind::Transport, "connection refused"),
            },
            &mut events,
        );

        let pagination = query::pagination(&world);
        assert!(query::pokemon(&world).is_empty());
        assert_eq!(pagination.cursor(), PageCursor::FIRST);
        assert_eq!(pagination.next_page(), PageCursor::FIRST);
        assert!(!pagination.is_initial_loading());
        assert!(matches!(events.as_slice(), [Event::PageLoadFailed { .. }]));
    }

    #[test]
    fn unmount_discards_late_response() {
        let (mut world, request) = mounted_world();
        let mut events = Vec::new();

        apply(&mut world, Command::Unmount, &mut events);
        apply(
            &mut world,
            Command::CompletePageLoad {
                request,
                pokemon: vec![record(1)],
            },
            &mut events,
        );

        assert!(query::pokemon(&world).is_empty());
        assert_eq!(
            events.last(),
            Some(&Event::StaleResponseDiscarded { request })
        );
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let (mut world, _) = mounted_world();
        let mut events = Vec::new();

        apply(&mut world, Command::Select { index: 3 }, &mut events);

        assert!(events.is_empty());
        assert!(query::selected(&world).is_none());
    }

    #[test]
    fn identical_search_term_emits_nothing() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetSearchTerm {
                term: "fire".to_owned(),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetSearchTerm {
                term: "fire".to_owned(),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::SearchTermChanged {
                term: "fire".to_owned()
            }]
        );
        assert_eq!(query::search_term(&world), "fire");
    }
}
